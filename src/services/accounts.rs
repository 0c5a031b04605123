use serde::{Deserialize, Serialize};

use crate::auth::{hash_password, verify_password};
use crate::database::models::{Account, NewAccount, Role, Tutor, TutorFields};
use crate::database::Store;
use crate::error::AppError;
use crate::services::validation::{
    is_valid_username, optional_text, FormValidator, MAX_NAME_LEN, MIN_PASSWORD_LEN,
};

/// Self-signup. Tutors also describe the profile students will browse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub account: Account,
    pub tutor: Option<Tutor>,
}

fn check_credentials(validator: &mut FormValidator, username: &str, password: &str) {
    if !is_valid_username(username) {
        validator.reject(
            "username",
            "Use 1-150 letters, digits and @/./+/-/_ characters",
        );
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        validator.reject(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

pub async fn register(store: &dyn Store, form: RegisterForm) -> Result<Registered, AppError> {
    let mut validator = FormValidator::new();
    let username = form.username.as_deref().map(str::trim).unwrap_or_default().to_string();
    let password = form.password.clone().unwrap_or_default();
    check_credentials(&mut validator, &username, &password);

    let role = match form.role.as_deref().map(str::parse::<Role>) {
        Some(Ok(Role::Admin)) => {
            validator.reject("role", "Administrator accounts cannot be self-registered");
            None
        }
        Some(Ok(role)) => Some(role),
        Some(Err(_)) | None => {
            validator.reject("role", "Choose 'student' or 'tutor'");
            None
        }
    };

    let profile = if role == Some(Role::Tutor) {
        let name = match optional_text(form.name) {
            Some(name) => validator.required_text("name", Some(name.as_str()), MAX_NAME_LEN),
            None => username.clone(),
        };
        let subject = validator.required_text("subject", form.subject.as_deref(), MAX_NAME_LEN);
        let contact_email = validator.email("contact_email", form.contact_email.as_deref());
        Some(TutorFields {
            name,
            subject,
            description: optional_text(form.description),
            contact_email,
        })
    } else {
        None
    };

    validator.finish()?;
    let role = role.ok_or_else(|| AppError::invalid_field("role", "Choose 'student' or 'tutor'"))?;

    let password_hash = hash_password(&password)?;
    let (account, tutor) = store
        .create_account(
            NewAccount {
                username,
                password_hash,
                role,
            },
            profile,
        )
        .await?;

    tracing::info!("Registered {} account '{}'", account.role, account.username);
    Ok(Registered { account, tutor })
}

/// Resolve a username/password pair to its account.
pub async fn authenticate(store: &dyn Store, username: &str, password: &str) -> Result<Account, AppError> {
    let account = match store.find_account_by_username(username.trim()).await? {
        Some(account) => account,
        None => {
            tracing::warn!("Login failed: unknown username '{}'", username);
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(password, &account.password_hash) {
        tracing::warn!("Login failed: wrong password for '{}'", account.username);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("Account '{}' logged in", account.username);
    Ok(account)
}

/// Create the admin account `username` unless it already exists. An existing
/// account with another role is a conflict.
pub async fn ensure_admin(store: &dyn Store, username: &str, password: &str) -> Result<Account, AppError> {
    if let Some(existing) = store.find_account_by_username(username).await? {
        if existing.role != Role::Admin {
            return Err(AppError::Conflict(format!(
                "Account '{}' exists with role {}",
                username, existing.role
            )));
        }
        tracing::debug!("Admin '{}' already present", username);
        return Ok(existing);
    }

    let mut validator = FormValidator::new();
    check_credentials(&mut validator, username, password);
    validator.finish()?;

    let (account, _) = store
        .create_account(
            NewAccount {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                role: Role::Admin,
            },
            None,
        )
        .await?;
    tracing::info!("Created admin account '{}'", account.username);
    Ok(account)
}
