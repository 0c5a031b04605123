use serde::{Deserialize, Serialize};

use crate::access::is_admin;
use crate::database::models::{Account, NewTutor, Tutor, TutorFields};
use crate::database::Store;
use crate::error::AppError;
use crate::services::validation::{optional_text, FormValidator, MAX_NAME_LEN};

/// Tutor fields as submitted by the admin form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TutorForm {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

impl TutorForm {
    pub fn validate(self) -> Result<TutorFields, AppError> {
        let mut validator = FormValidator::new();
        let name = validator.required_text("name", self.name.as_deref(), MAX_NAME_LEN);
        let subject = validator.required_text("subject", self.subject.as_deref(), MAX_NAME_LEN);
        let contact_email = validator.email("contact_email", self.contact_email.as_deref());
        validator.finish()?;

        Ok(TutorFields {
            name,
            subject,
            description: optional_text(self.description),
            contact_email,
        })
    }
}

impl From<&Tutor> for TutorForm {
    fn from(tutor: &Tutor) -> Self {
        Self {
            name: Some(tutor.name.clone()),
            subject: Some(tutor.subject.clone()),
            description: tutor.description.clone(),
            contact_email: Some(tutor.contact_email.clone()),
        }
    }
}

/// The admin form's submit button. Anything unrecognised leaves the tutor alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorAction {
    Update,
    Delete,
    Other(String),
}

impl TutorAction {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "update" => TutorAction::Update,
            "delete" => TutorAction::Delete,
            _ => TutorAction::Other(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MaintenanceOutcome {
    Updated { tutor: Tutor },
    Deleted { tutor_id: i64 },
    Unchanged { tutor: Tutor },
}

impl MaintenanceOutcome {
    /// Confirmation line for the admin.
    pub fn message(&self) -> String {
        match self {
            MaintenanceOutcome::Updated { tutor } => format!("Tutor {} updated", tutor.name),
            MaintenanceOutcome::Deleted { tutor_id } => format!("Tutor {} deleted", tutor_id),
            MaintenanceOutcome::Unchanged { .. } => "No changes made".to_string(),
        }
    }
}

fn ensure_admin(actor: &Account) -> Result<(), AppError> {
    if is_admin(actor) {
        Ok(())
    } else {
        tracing::warn!("Non-admin account '{}' attempted tutor maintenance", actor.username);
        Err(AppError::forbidden("Only administrators can manage tutors"))
    }
}

/// Admin-created tutor, not linked to any account.
pub async fn create_tutor(store: &dyn Store, actor: &Account, form: TutorForm) -> Result<Tutor, AppError> {
    ensure_admin(actor)?;
    let fields = form.validate()?;
    let tutor = store
        .insert_tutor(NewTutor {
            account_id: None,
            fields,
        })
        .await?;
    tracing::info!("Tutor {} ({}) created by '{}'", tutor.id, tutor.name, actor.username);
    Ok(tutor)
}

/// Apply the admin's chosen action to tutor `tutor_id`.
pub async fn update_or_delete_tutor(
    store: &dyn Store,
    actor: &Account,
    tutor_id: i64,
    action: &TutorAction,
    form: TutorForm,
) -> Result<MaintenanceOutcome, AppError> {
    ensure_admin(actor)?;

    let tutor = store
        .find_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;

    match action {
        TutorAction::Update => {
            let fields = form.validate()?;
            let updated = store
                .update_tutor(tutor.id, fields)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;
            tracing::info!("Tutor {} updated by '{}'", updated.id, actor.username);
            Ok(MaintenanceOutcome::Updated { tutor: updated })
        }
        TutorAction::Delete => {
            if !store.delete_tutor(tutor.id).await? {
                return Err(AppError::not_found(format!("Tutor {} not found", tutor_id)));
            }
            tracing::info!(
                "Tutor {} ({}) deleted with its requests and feedback by '{}'",
                tutor.id,
                tutor.name,
                actor.username
            );
            Ok(MaintenanceOutcome::Deleted { tutor_id: tutor.id })
        }
        TutorAction::Other(value) => {
            tracing::debug!("Ignoring tutor action '{}'", value);
            Ok(MaintenanceOutcome::Unchanged { tutor })
        }
    }
}
