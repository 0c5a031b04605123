// handlers/protected/mod.rs - Handlers for logged-in callers
//
// Anonymous callers are redirected to /login?next=<path>. Dashboards and
// request decisions additionally sit behind a per-role guard.
pub mod dashboards;
pub mod feedback;
pub mod requests;

pub use dashboards::{handle_request_action, student_dashboard, tutor_dashboard};
pub use feedback::{feedback_form, feedback_submit};
pub use requests::{request_form, request_submit};
