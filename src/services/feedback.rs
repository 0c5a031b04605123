use serde::{Deserialize, Serialize};

use crate::database::models::{Account, Feedback, NewFeedback};
use crate::database::Store;
use crate::error::AppError;
use crate::services::validation::{optional_text, FormValidator, RATING_RANGE};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

/// Record `student`'s rating of tutor `tutor_id`. Ratings outside 1..=5 are rejected.
pub async fn create_feedback(
    store: &dyn Store,
    tutor_id: i64,
    student: &Account,
    form: FeedbackForm,
) -> Result<Feedback, AppError> {
    let tutor = store
        .find_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;

    let mut validator = FormValidator::new();
    let rating = match form.rating {
        Some(rating) if RATING_RANGE.contains(&rating) => rating as i32,
        Some(_) => {
            validator.reject("rating", "Rating must be between 1 and 5");
            0
        }
        None => {
            validator.reject("rating", "This field is required");
            0
        }
    };
    validator.finish()?;

    let feedback = store
        .insert_feedback(NewFeedback {
            tutor_id: tutor.id,
            student_name: student.username.clone(),
            rating,
            comment: optional_text(form.comment),
        })
        .await?;

    tracing::info!(
        "Feedback {} ({} stars) left by '{}' for tutor {}",
        feedback.id,
        feedback.rating,
        student.username,
        tutor.id
    );
    Ok(feedback)
}
