use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::{Account, Feedback, StudentRequest, Tutor};
use crate::database::Store;
use crate::error::AppError;

/// A directory entry: the tutor with the feedback left about them.
#[derive(Debug, Clone, Serialize)]
pub struct TutorListing {
    #[serde(flatten)]
    pub tutor: Tutor,
    pub feedback: Vec<Feedback>,
    pub feedback_count: usize,
    pub average_rating: Option<f64>,
}

impl TutorListing {
    fn new(tutor: Tutor, feedback: Vec<Feedback>) -> Self {
        let average_rating = if feedback.is_empty() {
            None
        } else {
            let total: i64 = feedback.iter().map(|f| i64::from(f.rating)).sum();
            Some(total as f64 / feedback.len() as f64)
        };
        Self {
            tutor,
            feedback_count: feedback.len(),
            feedback,
            average_rating,
        }
    }
}

/// Tutors whose subject contains `subject` case-insensitively. A missing or
/// empty filter returns every tutor. Insertion order.
pub async fn list_tutors(store: &dyn Store, subject: Option<&str>) -> Result<Vec<Tutor>, AppError> {
    let subject = subject.filter(|s| !s.is_empty());
    let tutors = store.list_tutors(subject).await?;
    tracing::debug!("Listed {} tutors (filter: {:?})", tutors.len(), subject);
    Ok(tutors)
}

/// Pair each tutor with its feedback using one grouped fetch.
pub async fn attach_feedback(store: &dyn Store, tutors: Vec<Tutor>) -> Result<Vec<TutorListing>, AppError> {
    let ids: Vec<i64> = tutors.iter().map(|t| t.id).collect();
    let mut grouped: HashMap<i64, Vec<Feedback>> = HashMap::new();
    for feedback in store.list_feedback_for_tutors(&ids).await? {
        grouped.entry(feedback.tutor_id).or_default().push(feedback);
    }

    Ok(tutors
        .into_iter()
        .map(|tutor| {
            let feedback = grouped.remove(&tutor.id).unwrap_or_default();
            TutorListing::new(tutor, feedback)
        })
        .collect())
}

pub async fn list_tutors_for_admin(store: &dyn Store) -> Result<Vec<Tutor>, AppError> {
    Ok(store.list_tutors(None).await?)
}

/// Requests addressed to the tutor profile linked to `account`. An account
/// without a tutor profile simply has no requests.
pub async fn list_requests_for_tutor(store: &dyn Store, account: &Account) -> Result<Vec<StudentRequest>, AppError> {
    match store.find_tutor_by_account(account.id).await? {
        Some(tutor) => Ok(store.list_requests_for_tutor(tutor.id).await?),
        None => {
            tracing::debug!("Account '{}' has no tutor profile", account.username);
            Ok(vec![])
        }
    }
}

pub async fn list_requests_for_student(store: &dyn Store, account: &Account) -> Result<Vec<StudentRequest>, AppError> {
    Ok(store.list_requests_for_student(account.id).await?)
}
