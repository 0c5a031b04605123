// handlers/public/mod.rs - Public handlers (no login required)
//
// Callers may still be identified; nothing here depends on it.
pub mod auth;
pub mod tutors;

pub use auth::{login, login_form, logout, register};
pub use tutors::{health, thank_you, tutor_directory};
