use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::access::{Access, RoleGuard};
use crate::middleware::auth::CurrentAccount;

/// Route-group guard, layered with `from_fn_with_state(RoleGuard::tutor(), require_role)`.
///
/// Must run after `identify_caller`. Denials are answered per the guard's
/// policy and the handler never runs.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Response {
    let caller = request.extensions().get::<CurrentAccount>().map(|c| &c.0);

    match guard.check(caller) {
        Access::Allow => next.run(request).await,
        Access::Deny(denial) => {
            let path = request.uri().path().to_string();
            tracing::debug!("{} guard denied {}: {:?}", guard.role, path, denial);
            denial.respond(&path)
        }
    }
}
