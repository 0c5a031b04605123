// handlers/public/auth.rs - signup, login and logout

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::access::TUTORS_ROUTE;
use crate::auth::issue_token;
use crate::database::models::{Account, AccountSummary};
use crate::error::LOGIN_ROUTE;
use crate::middleware::{ApiResponse, ApiResult, JsonForm};
use crate::services::accounts::{self, RegisterForm};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

/// Only same-site paths are honoured as post-login targets. Browsers read
/// `/\host` like `//host`, so a backslash second character is refused too.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|path| {
        path.starts_with('/')
            && !matches!(path.chars().nth(1), Some('/') | Some('\\'))
            && !path.chars().any(char::is_control)
    })
}

fn post_login_route(account: &Account, next: Option<&str>) -> String {
    safe_next(next)
        .unwrap_or_else(|| account.role.landing_route())
        .to_string()
}

/// GET /login - describe the login form
pub async fn login_form(Query(query): Query<NextQuery>) -> ApiResult {
    Ok(ApiResponse::success(json!({
        "form": {
            "username": "",
            "password": "",
        },
        "next": safe_next(query.next.as_deref()),
    })))
}

/// POST /login
///
/// Input: `{"username": "...", "password": "...", "next": "/request/3"}`;
/// `next` may also come from the query string. Answers with a bearer token,
/// its lifetime in seconds and where the client should go next.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    JsonForm(form): JsonForm<LoginForm>,
) -> ApiResult {
    let account = accounts::authenticate(state.store(), &form.username, &form.password).await?;
    let (token, expires_in) = issue_token(&account, &state.config.security)?;
    let next = form.next.as_deref().or(query.next.as_deref());

    Ok(ApiResponse::success(json!({
        "token": token,
        "expires_in": expires_in,
        "account": AccountSummary::from(&account),
        "redirect": post_login_route(&account, next),
    })))
}

/// GET|POST /logout - tokens are stateless; the client drops its copy
pub async fn logout() -> Response {
    Redirect::to(TUTORS_ROUTE).into_response()
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<RegisterForm>,
) -> ApiResult {
    let registered = accounts::register(state.store(), form).await?;

    Ok(ApiResponse::created(json!({
        "account": AccountSummary::from(&registered.account),
        "tutor": registered.tutor,
        "redirect": LOGIN_ROUTE,
    })))
}
