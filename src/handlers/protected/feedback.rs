// handlers/protected/feedback.rs - GET|POST /feedback/:tutor_id

use axum::extract::State;
use serde_json::json;

use crate::access::TUTORS_ROUTE;
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, JsonForm, LoggedIn, PathParam};
use crate::services::feedback::{self, FeedbackForm};
use crate::state::AppState;

pub async fn feedback_form(
    State(state): State<AppState>,
    LoggedIn(account): LoggedIn,
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
            "student_name": account.username,
            "rating": null,
            "comment": "",
        },
    })))
}

/// POST /feedback/:tutor_id - `{"rating": 1..=5, "comment": "..."}`
pub async fn feedback_submit(
    State(state): State<AppState>,
    LoggedIn(account): LoggedIn,
    PathParam(tutor_id): PathParam<i64>,
    JsonForm(form): JsonForm<FeedbackForm>,
) -> ApiResult {
    let feedback = feedback::create_feedback(state.store(), tutor_id, &account, form).await?;

    Ok(ApiResponse::created(json!({
        "feedback": feedback,
        "redirect": TUTORS_ROUTE,
    })))
}
