use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;

use crate::access::{require_login, Access};
use crate::auth::verify_token;
use crate::database::models::Account;
use crate::error::AppError;
use crate::state::AppState;

/// The identified caller, freshly loaded from the store for this request.
#[derive(Clone, Debug)]
pub struct CurrentAccount(pub Account);

/// Identify the caller from an `Authorization: Bearer` token.
///
/// The token only names the account; role and existence are re-read from the
/// store on every request. A missing, malformed or expired token, or one for
/// an account that no longer exists, leaves the request anonymous. Guards
/// decide what anonymous callers may reach.
pub async fn identify_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()).map(str::to_owned) {
        match verify_token(&token, &state.config.security) {
            Ok(claims) => match state.store().find_account(claims.sub).await {
                Ok(Some(account)) => {
                    tracing::debug!("Caller identified as '{}' ({})", account.username, account.role);
                    request.extensions_mut().insert(CurrentAccount(account));
                }
                Ok(None) => tracing::debug!("Token names unknown account {}", claims.sub),
                Err(e) => return AppError::from(e).into_response(),
            },
            Err(e) => tracing::debug!("Ignoring bearer token: {}", e),
        }
    }

    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extractor for handlers that serve anonymous and identified callers alike.
pub struct Caller(pub Option<Account>);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(
            parts
                .extensions
                .get::<CurrentAccount>()
                .map(|current| current.0.clone()),
        ))
    }
}

/// Extractor for routes that need a logged-in caller of any role. Anonymous
/// callers are redirected to the login route with `next` pointing back here.
pub struct LoggedIn(pub Account);

#[async_trait]
impl<S> FromRequestParts<S> for LoggedIn
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Caller(caller) = match Caller::from_request_parts(parts, state).await {
            Ok(caller) => caller,
            Err(never) => match never {},
        };
        match (require_login(caller.as_ref()), caller) {
            (Access::Allow, Some(account)) => Ok(LoggedIn(account)),
            (Access::Deny(denial), _) => Err(denial.respond(parts.uri.path())),
            (Access::Allow, None) => Err(AppError::Unauthenticated.into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Ym9iOnB3"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}
