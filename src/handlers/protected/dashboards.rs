// handlers/protected/dashboards.rs - per-role request lists and the tutor's decisions
//
// Mounted behind `require_role`; `LoggedIn` only hands over the account.

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use crate::database::models::Decision;
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, JsonForm, LoggedIn, PathParam};
use crate::services::{lifecycle, listing};
use crate::state::AppState;

pub const TUTOR_DASHBOARD_ROUTE: &str = "/tutor_dashboard";

/// GET /tutor_dashboard - requests addressed to the caller's tutor profile
pub async fn tutor_dashboard(State(state): State<AppState>, LoggedIn(account): LoggedIn) -> ApiResult {
    let tutor = state.store().find_tutor_by_account(account.id).await?;
    let requests = listing::list_requests_for_tutor(state.store(), &account).await?;

    Ok(ApiResponse::success(json!({
        "tutor": tutor,
        "requests": requests,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DecisionForm {
    pub action: Option<String>,
}

impl DecisionForm {
    fn decision(&self) -> Result<Decision, AppError> {
        match self.action.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref() {
            Some("accept") => Ok(Decision::Accept),
            Some("reject") => Ok(Decision::Reject),
            _ => Err(AppError::invalid_field("action", "Choose 'accept' or 'reject'")),
        }
    }
}

/// POST /handle_request_action/:request_id - `{"action": "accept" | "reject"}`
pub async fn handle_request_action(
    State(state): State<AppState>,
    LoggedIn(account): LoggedIn,
    PathParam(request_id): PathParam<i64>,
    JsonForm(form): JsonForm<DecisionForm>,
) -> ApiResult {
    let decision = form.decision()?;
    let request = lifecycle::decide_request(state.store(), request_id, &account, decision).await?;

    Ok(ApiResponse::success(json!({
        "request": request,
        "redirect": TUTOR_DASHBOARD_ROUTE,
    })))
}

/// GET /student_dashboard
pub async fn student_dashboard(State(state): State<AppState>, LoggedIn(account): LoggedIn) -> ApiResult {
    let requests = listing::list_requests_for_student(state.store(), &account).await?;
    Ok(ApiResponse::success(json!({ "requests": requests })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(action: &str) -> DecisionForm {
        DecisionForm {
            action: Some(action.to_string()),
        }
    }

    #[test]
    fn decisions_parse_from_the_button_value() {
        assert_eq!(form("Accept").decision().unwrap(), Decision::Accept);
        assert_eq!(form(" reject ").decision().unwrap(), Decision::Reject);
        assert!(matches!(
            form("maybe").decision(),
            Err(AppError::ValidationFailed { .. })
        ));
        assert!(DecisionForm::default().decision().is_err());
    }
}
