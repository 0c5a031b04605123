use crate::error::{AppError, FieldErrors};

/// Longest name, subject or student name the schema stores.
pub const MAX_NAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Collects every field error of a form before failing, so a client can
/// show all of them at once.
#[derive(Debug, Default)]
pub struct FormValidator {
    errors: FieldErrors,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Trimmed, non-empty text of at most `max_len` characters.
    pub fn required_text(&mut self, field: &str, value: Option<&str>, max_len: usize) -> String {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.reject(field, "This field is required");
        } else if value.chars().count() > max_len {
            self.reject(
                field,
                format!("Ensure this value has at most {} characters", max_len),
            );
        }
        value.to_string()
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> String {
        let value = self.required_text(field, value, MAX_EMAIL_LEN);
        if !value.is_empty() && !is_plausible_email(&value) {
            self.reject(field, "Enter a valid email address");
        }
        value
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors))
        }
    }
}

/// Blank optional text becomes `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `local@domain.tld` with no whitespace; deliverability is not checked.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Letters, digits and `@.+-_`, 1 to 150 characters.
pub fn is_valid_username(value: &str) -> bool {
    !value.is_empty()
        && value.chars().count() <= MAX_NAME_LEN
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}
