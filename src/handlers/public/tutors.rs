// handlers/public/tutors.rs - tutor directory and static pages

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::listing;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    /// Subject filter, matched case-insensitively anywhere in the subject
    #[serde(default)]
    pub q: Option<String>,
}

/// GET / - every tutor, or those whose subject contains `?q=`, each with its feedback
pub async fn tutor_directory(
    State(state): State<AppState>,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult {
    let filter = query.q.as_deref().unwrap_or_default();
    let tutors = listing::list_tutors(state.store(), Some(filter)).await?;
    let tutors = listing::attach_feedback(state.store(), tutors).await?;

    Ok(ApiResponse::success(json!({
        "query": filter,
        "tutors": tutors,
    })))
}

/// GET /thankyou
pub async fn thank_you() -> ApiResult {
    Ok(ApiResponse::success(json!({
        "message": "Thank you! Your request has been sent to the tutor.",
    })))
}

/// GET /health - 200 while the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json::<Value>(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                    }
                })),
            )
                .into_response()
        }
    }
}
