// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::RequestStatus;

/// Route unauthenticated callers are sent to.
pub const LOGIN_ROUTE: &str = "/login";

/// Per-field validation messages, keyed by form field name
pub type FieldErrors = BTreeMap<String, String>;

/// Failure of a single operation. Every variant is recoverable and scoped to
/// the request that produced it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Role or ownership check failed (403)
    #[error("{0}")]
    Forbidden(String),

    /// Malformed or out-of-range form input (422)
    #[error("{message}")]
    ValidationFailed {
        message: String,
        field_errors: FieldErrors,
    },

    /// No active session: always answered with a redirect to the login route
    #[error("Authentication required")]
    Unauthenticated,

    /// Login attempt with unknown username or wrong password (401)
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Unique constraint clash, e.g. a taken username (409)
    #[error("{0}")]
    Conflict(String),

    /// Attempt to leave a terminal request status (409)
    #[error("Request is already {from}; cannot mark it {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn validation(field_errors: FieldErrors) -> Self {
        AppError::ValidationFailed {
            message: "Submitted form is invalid".to_string(),
            field_errors,
        }
    }

    /// Validation failure on one field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), message.into());
        Self::validation(field_errors)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated => StatusCode::SEE_OTHER,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::ValidationFailed { .. } => "VALIDATION_FAILED",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.to_string(),
            "code": self.error_code(),
        });
        if let AppError::ValidationFailed { field_errors, .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => AppError::not_found(format!("{} not found", what)),
            DatabaseError::Conflict(msg) => AppError::Conflict(msg),
            DatabaseError::ConfigMissing(what) => {
                tracing::error!("Storage misconfigured: missing {}", what);
                AppError::internal("Storage is not configured")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                AppError::internal("Database error occurred")
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        tracing::error!("Authentication subsystem error: {}", err);
        AppError::internal("Authentication error occurred")
    }
}

/// Field named by a serde path such as `rating: invalid type: ...`; whole-body
/// failures are filed under `body`.
fn rejected_field(detail: &str) -> (String, String) {
    const DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";
    let detail = detail.strip_prefix(DATA_PREFIX).unwrap_or(detail);
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            (path.to_string(), message.to_string())
        }
        _ => ("body".to_string(), detail.to_string()),
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let (field, message) = match &rejection {
            JsonRejection::JsonDataError(_) => rejected_field(&rejection.body_text()),
            _ => ("body".to_string(), rejection.body_text()),
        };
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::invalid_field(&field, message)
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_field("path", rejection.body_text())
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unauthenticated = self {
            return Redirect::to(LOGIN_ROUTE).into_response();
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
