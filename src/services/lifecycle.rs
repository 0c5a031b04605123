use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Account, Decision, NewRequest, StudentRequest};
use crate::database::Store;
use crate::error::AppError;
use crate::services::validation::{optional_text, FormValidator};

/// Fields a student submits when requesting a tutor. The tutor comes from the route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestForm {
    pub message: Option<String>,
    pub contact_email: Option<String>,
    pub preferred_date: Option<DateTime<Utc>>,
}

/// Create a pending request from `student` to tutor `tutor_id`.
pub async fn create_request(
    store: &dyn Store,
    tutor_id: i64,
    student: &Account,
    form: RequestForm,
) -> Result<StudentRequest, AppError> {
    let tutor = store
        .find_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Tutor {} not found", tutor_id)))?;

    let mut validator = FormValidator::new();
    let contact_email = validator.email("contact_email", form.contact_email.as_deref());
    validator.finish()?;

    let request = store
        .insert_request(NewRequest {
            tutor_id: tutor.id,
            student_account_id: student.id,
            student_name: student.username.clone(),
            message: optional_text(form.message),
            contact_email,
            preferred_date: form.preferred_date,
        })
        .await?;

    tracing::info!(
        "Request {} created by '{}' for tutor {} ({})",
        request.id,
        student.username,
        tutor.id,
        tutor.name
    );
    Ok(request)
}

/// Accept or reject a request on behalf of the tutor who owns it.
///
/// Only the account linked to the request's tutor may decide, and only a
/// pending request can change. Re-sending the decision a request already
/// carries succeeds without writing; asking for the opposite one fails with
/// `InvalidTransition`.
pub async fn decide_request(
    store: &dyn Store,
    request_id: i64,
    actor: &Account,
    decision: Decision,
) -> Result<StudentRequest, AppError> {
    let request = store
        .find_request(request_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Request {} not found", request_id)))?;

    let owns_tutor = store
        .find_tutor_by_account(actor.id)
        .await?
        .is_some_and(|tutor| tutor.id == request.tutor_id);
    if !owns_tutor {
        tracing::warn!(
            "Account '{}' tried to {:?} request {} of another tutor",
            actor.username,
            decision,
            request_id
        );
        return Err(AppError::forbidden("You can only answer requests sent to you"));
    }

    let target = decision.target_status();
    if request.status == target {
        return Ok(request);
    }
    if !request.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition {
            from: request.status,
            to: target,
        });
    }

    match store.resolve_request(request_id, target).await? {
        Some(updated) => {
            tracing::info!(
                "Request {} marked {} by '{}'",
                updated.id,
                updated.status,
                actor.username
            );
            Ok(updated)
        }
        // Decided or removed between our read and the write.
        None => match store.find_request(request_id).await? {
            Some(current) if current.status == target => Ok(current),
            Some(current) => Err(AppError::InvalidTransition {
                from: current.status,
                to: target,
            }),
            None => Err(AppError::not_found(format!("Request {} not found", request_id))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{RequestStatus, Role};
    use crate::testing;

    fn form(email: &str) -> RequestForm {
        RequestForm {
            message: Some("help".to_string()),
            contact_email: Some(email.to_string()),
            preferred_date: None,
        }
    }

    #[tokio::test]
    async fn new_requests_are_pending_and_named_after_the_student() {
        let store = testing::store();
        let (_, ada) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let bob = testing::account(&store, "bob", Role::Student).await;

        let request = create_request(&store, ada.id, &bob, form("bob@example.com")).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.student_name, "bob");
        assert_eq!(request.message.as_deref(), Some("help"));
        assert_eq!(request.student_account_id, Some(bob.id));
        assert!(store.find_tutor(ada.id).await.unwrap().unwrap().has_pending_request);
    }

    #[tokio::test]
    async fn unknown_tutor_is_not_found() {
        let store = testing::store();
        let bob = testing::account(&store, "bob", Role::Student).await;
        let err = create_request(&store, 404, &bob, form("bob@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn contact_email_is_validated() {
        let store = testing::store();
        let ada = testing::unlinked_tutor(&store, "Ada", "Math").await;
        let bob = testing::account(&store, "bob", Role::Student).await;

        let err = create_request(&store, ada.id, &bob, form("not-an-email")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed { .. }));
        assert!(store.list_requests_for_tutor(ada.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owning_tutor_accepts() {
        let store = testing::store();
        let (ada_account, ada) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let bob = testing::account(&store, "bob", Role::Student).await;
        let request = create_request(&store, ada.id, &bob, form("bob@example.com")).await.unwrap();

        let decided = decide_request(&store, request.id, &ada_account, Decision::Accept).await.unwrap();
        assert_eq!(decided.status, RequestStatus::Accepted);
        assert!(!store.find_tutor(ada.id).await.unwrap().unwrap().has_pending_request);
    }

    #[tokio::test]
    async fn other_tutor_cannot_decide() {
        let store = testing::store();
        let (_, ada) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let (grace_account, _) = testing::tutor_account(&store, "grace", "Grace", "Computing").await;
        let bob = testing::account(&store, "bob", Role::Student).await;
        let request = create_request(&store, ada.id, &bob, form("bob@example.com")).await.unwrap();

        let err = decide_request(&store, request.id, &grace_account, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let stored = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn students_and_unlinked_tutors_cannot_decide() {
        let store = testing::store();
        let (_, ada) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let bob = testing::account(&store, "bob", Role::Student).await;
        let drifter = testing::account(&store, "drifter", Role::Tutor).await;
        let request = create_request(&store, ada.id, &bob, form("bob@example.com")).await.unwrap();

        for actor in [&bob, &drifter] {
            let err = decide_request(&store, request.id, actor, Decision::Reject).await.unwrap_err();
            assert!(matches!(err, AppError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn decided_requests_are_terminal() {
        let store = testing::store();
        let (ada_account, ada) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let bob = testing::account(&store, "bob", Role::Student).await;
        let request = create_request(&store, ada.id, &bob, form("bob@example.com")).await.unwrap();

        decide_request(&store, request.id, &ada_account, Decision::Reject).await.unwrap();

        let again = decide_request(&store, request.id, &ada_account, Decision::Reject).await.unwrap();
        assert_eq!(again.status, RequestStatus::Rejected);

        let err = decide_request(&store, request.id, &ada_account, Decision::Accept)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: RequestStatus::Rejected,
                to: RequestStatus::Accepted
            }
        ));
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let store = testing::store();
        let (ada_account, _) = testing::tutor_account(&store, "ada", "Ada", "Math").await;
        let err = decide_request(&store, 999, &ada_account, Decision::Accept).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
