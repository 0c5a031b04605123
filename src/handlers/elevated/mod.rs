// handlers/elevated/mod.rs - Admin-only handlers, mounted behind the admin guard
pub mod tutors;

pub use tutors::{tutor_admin_create, tutor_admin_list, tutor_admin_show, tutor_admin_update};
