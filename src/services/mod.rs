// Business operations. Handlers stay thin: they extract input, call one of
// these with the caller's account and render the outcome.
pub mod accounts;
pub mod feedback;
pub mod lifecycle;
pub mod listing;
pub mod maintenance;
pub mod validation;
