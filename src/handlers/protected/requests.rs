// handlers/protected/requests.rs - GET|POST /request/:tutor_id

use axum::extract::State;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, JsonForm, LoggedIn, PathParam};
use crate::services::lifecycle::{self, RequestForm};
use crate::state::AppState;

pub const THANK_YOU_ROUTE: &str = "/thankyou";

/// GET /request/:tutor_id - empty request form with the tutor filled in
pub async fn request_form(
    State(state): State<AppState>,
    LoggedIn(_account): LoggedIn,
    PathParam(tutor_id): PathParam<i64>,
) -> ApiResult {
    let tutor = state
        .store()
        .find_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;

    Ok(ApiResponse::success(json!({
        "tutor": tutor,
        "form": {
            "tutor_id": tutor.id,
            "message": "",
            "contact_email": "",
            "preferred_date": null,
        },
    })))
}

/// POST /request/:tutor_id
///
/// Input: `{"message": "...", "contact_email": "...", "preferred_date": "2024-05-01T16:00:00Z"}`.
/// The new request is pending and named after the caller.
pub async fn request_submit(
    State(state): State<AppState>,
    LoggedIn(account): LoggedIn,
    PathParam(tutor_id): PathParam<i64>,
    JsonForm(form): JsonForm<RequestForm>,
) -> ApiResult {
    let request = lifecycle::create_request(state.store(), tutor_id, &account, form).await?;

    Ok(ApiResponse::created(json!({
        "request": request,
        "redirect": THANK_YOU_ROUTE,
    })))
}
