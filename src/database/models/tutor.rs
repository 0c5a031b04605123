use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tutor {
    pub id: i64,
    pub account_id: Option<i64>,
    pub name: String,
    pub subject: String,
    pub description: Option<String>,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
    pub has_pending_request: bool,
}

/// Editable tutor fields, shared by admin creation, admin updates and tutor signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorFields {
    pub name: String,
    pub subject: String,
    pub description: Option<String>,
    pub contact_email: String,
}

#[derive(Debug, Clone)]
pub struct NewTutor {
    pub account_id: Option<i64>,
    pub fields: TutorFields,
}
