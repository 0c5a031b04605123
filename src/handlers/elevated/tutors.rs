// handlers/elevated/tutors.rs - tutor maintenance under /adminaccess

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use crate::access::TUTORS_ROUTE;
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, JsonForm, LoggedIn, PathParam};
use crate::services::listing;
use crate::services::maintenance::{self, MaintenanceOutcome, TutorAction, TutorForm};
use crate::state::AppState;

pub const ADMIN_ROUTE: &str = "/adminaccess";

/// GET /adminaccess - every tutor, plus a blank form for adding one
pub async fn tutor_admin_list(State(state): State<AppState>) -> ApiResult {
    let tutors = listing::list_tutors_for_admin(state.store()).await?;
    Ok(ApiResponse::success(json!({
        "tutors": tutors,
        "form": TutorForm::default(),
    })))
}

/// POST /adminaccess - create a tutor that no account is linked to
pub async fn tutor_admin_create(
    State(state): State<AppState>,
    LoggedIn(admin): LoggedIn,
    JsonForm(form): JsonForm<TutorForm>,
) -> ApiResult {
    let tutor = maintenance::create_tutor(state.store(), &admin, form).await?;
    Ok(ApiResponse::created(json!({
        "tutor": tutor,
        "redirect": ADMIN_ROUTE,
    })))
}

/// GET /adminaccess/:tutor_id - edit form pre-filled from the tutor
pub async fn tutor_admin_show(State(state): State<AppState>, PathParam(tutor_id): PathParam<i64>) -> ApiResult {
    let tutor = state
        .store()
        .find_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;
    let tutors = listing::list_tutors_for_admin(state.store()).await?;

    Ok(ApiResponse::success(json!({
        "form": TutorForm::from(&tutor),
        "tutor": tutor,
        "tutors": tutors,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct MaintenanceForm {
    #[serde(default)]
    pub action: String,
    #[serde(flatten)]
    pub fields: TutorForm,
}

/// POST /adminaccess/:tutor_id
///
/// `{"action": "Update", "name": ..., "subject": ..., "description": ..., "contact_email": ...}`
/// or `{"action": "Delete"}`. Any other action changes nothing and hands the
/// form back.
pub async fn tutor_admin_update(
    State(state): State<AppState>,
    LoggedIn(admin): LoggedIn,
    PathParam(tutor_id): PathParam<i64>,
    JsonForm(form): JsonForm<MaintenanceForm>,
) -> ApiResult {
    let action = TutorAction::parse(&form.action);
    let outcome =
        maintenance::update_or_delete_tutor(state.store(), &admin, tutor_id, &action, form.fields).await?;
    let message = outcome.message();

    let data = match &outcome {
        MaintenanceOutcome::Unchanged { tutor } => json!({
            "outcome": outcome,
            "message": message,
            "form": TutorForm::from(tutor),
            "tutors": listing::list_tutors_for_admin(state.store()).await?,
        }),
        _ => json!({
            "outcome": outcome,
            "message": message,
            "redirect": TUTORS_ROUTE,
        }),
    };
    Ok(ApiResponse::success(data))
}
