// handlers/mod.rs - Handlers grouped by who may call them
//
// Public (anyone) → Protected (logged in, some routes role-guarded) → Elevated (admin)
pub mod elevated;
pub mod protected;
pub mod public;
