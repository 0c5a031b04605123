pub mod auth;
pub mod extract;
pub mod guard;
pub mod response;

pub use auth::{identify_caller, Caller, CurrentAccount, LoggedIn};
pub use extract::{JsonForm, PathParam};
pub use guard::require_role;
pub use response::{ApiResponse, ApiResult};
