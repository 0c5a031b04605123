use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, Feedback, NewAccount, NewFeedback, NewRequest, NewTutor, RequestStatus,
    StudentRequest, Tutor, TutorFields,
};

/// Persistence handle passed into every operation.
///
/// Each method is one unit of work: implementations that span several
/// statements run them inside a single transaction.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert an account, and the tutor profile linked to it when given.
    /// Fails with `DatabaseError::Conflict` when the username is taken.
    async fn create_account(
        &self,
        account: NewAccount,
        tutor: Option<TutorFields>,
    ) -> Result<(Account, Option<Tutor>), DatabaseError>;

    async fn find_account(&self, id: i64) -> Result<Option<Account>, DatabaseError>;

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError>;

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, DatabaseError>;

    async fn find_tutor(&self, id: i64) -> Result<Option<Tutor>, DatabaseError>;

    async fn find_tutor_by_account(&self, account_id: i64) -> Result<Option<Tutor>, DatabaseError>;

    /// Tutors in insertion order, optionally restricted to subjects containing
    /// `subject` (case-insensitive).
    async fn list_tutors(&self, subject: Option<&str>) -> Result<Vec<Tutor>, DatabaseError>;

    /// Returns `None` when the tutor does not exist.
    async fn update_tutor(&self, id: i64, fields: TutorFields) -> Result<Option<Tutor>, DatabaseError>;

    /// Removes the tutor with its requests and feedback. Returns whether a tutor was removed.
    async fn delete_tutor(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Insert a pending request and raise the tutor's pending flag.
    async fn insert_request(&self, request: NewRequest) -> Result<StudentRequest, DatabaseError>;

    async fn find_request(&self, id: i64) -> Result<Option<StudentRequest>, DatabaseError>;

    async fn list_requests_for_tutor(&self, tutor_id: i64) -> Result<Vec<StudentRequest>, DatabaseError>;

    async fn list_requests_for_student(&self, account_id: i64) -> Result<Vec<StudentRequest>, DatabaseError>;

    /// Move a request out of `Pending` into `status` and recompute the
    /// tutor's pending flag. Returns `None` when the request is missing or
    /// no longer pending, leaving everything untouched.
    async fn resolve_request(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<Option<StudentRequest>, DatabaseError>;

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, DatabaseError>;

    /// Feedback for all of `tutor_ids` in one fetch, oldest first.
    async fn list_feedback_for_tutors(&self, tutor_ids: &[i64]) -> Result<Vec<Feedback>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
