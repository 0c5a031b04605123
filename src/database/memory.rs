use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Account, Feedback, NewAccount, NewFeedback, NewRequest, NewTutor, RequestStatus,
    StudentRequest, Tutor, TutorFields,
};
use crate::database::store::Store;

#[derive(Default)]
struct Tables {
    next_id: i64,
    accounts: Vec<Account>,
    tutors: Vec<Tutor>,
    requests: Vec<StudentRequest>,
    feedback: Vec<Feedback>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn build_tutor(&mut self, account_id: Option<i64>, fields: TutorFields) -> Tutor {
        Tutor {
            id: self.allocate_id(),
            account_id,
            name: fields.name,
            subject: fields.subject,
            description: fields.description,
            contact_email: fields.contact_email,
            created_at: Utc::now(),
            has_pending_request: false,
        }
    }

    fn refresh_pending_flag(&mut self, tutor_id: i64) {
        let pending = self
            .requests
            .iter()
            .any(|r| r.tutor_id == tutor_id && r.status == RequestStatus::Pending);
        if let Some(tutor) = self.tutors.iter_mut().find(|t| t.id == tutor_id) {
            tutor.has_pending_request = pending;
        }
    }
}

/// Process-local store. Every operation holds one lock for its whole
/// duration, which gives each call the same all-or-nothing behaviour as a
/// database transaction.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-applied write
        // behind, so a poisoned guard is still consistent.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(
        &self,
        account: NewAccount,
        tutor: Option<TutorFields>,
    ) -> Result<(Account, Option<Tutor>), DatabaseError> {
        let mut tables = self.lock();
        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(DatabaseError::Conflict(format!(
                "account '{}' already exists",
                account.username
            )));
        }

        let created = Account {
            id: tables.allocate_id(),
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now(),
        };
        tables.accounts.push(created.clone());

        let profile = tutor.map(|fields| {
            let tutor = tables.build_tutor(Some(created.id), fields);
            tables.tutors.push(tutor.clone());
            tutor
        });

        Ok((created, profile))
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, DatabaseError> {
        Ok(self.lock().accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, DatabaseError> {
        let mut tables = self.lock();
        if let Some(account_id) = tutor.account_id {
            if tables.tutors.iter().any(|t| t.account_id == Some(account_id)) {
                return Err(DatabaseError::Conflict(
                    "tutor profile for this account already exists".to_string(),
                ));
            }
        }
        let created = tables.build_tutor(tutor.account_id, tutor.fields);
        tables.tutors.push(created.clone());
        Ok(created)
    }

    async fn find_tutor(&self, id: i64) -> Result<Option<Tutor>, DatabaseError> {
        Ok(self.lock().tutors.iter().find(|t| t.id == id).cloned())
    }

    async fn find_tutor_by_account(&self, account_id: i64) -> Result<Option<Tutor>, DatabaseError> {
        Ok(self
            .lock()
            .tutors
            .iter()
            .find(|t| t.account_id == Some(account_id))
            .cloned())
    }

    async fn list_tutors(&self, subject: Option<&str>) -> Result<Vec<Tutor>, DatabaseError> {
        let needle = subject.map(str::to_lowercase);
        Ok(self
            .lock()
            .tutors
            .iter()
            .filter(|t| match &needle {
                Some(needle) => t.subject.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update_tutor(&self, id: i64, fields: TutorFields) -> Result<Option<Tutor>, DatabaseError> {
        let mut tables = self.lock();
        Ok(tables.tutors.iter_mut().find(|t| t.id == id).map(|tutor| {
            tutor.name = fields.name;
            tutor.subject = fields.subject;
            tutor.description = fields.description;
            tutor.contact_email = fields.contact_email;
            tutor.clone()
        }))
    }

    async fn delete_tutor(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.lock();
        let before = tables.tutors.len();
        tables.tutors.retain(|t| t.id != id);
        if tables.tutors.len() == before {
            return Ok(false);
        }
        tables.requests.retain(|r| r.tutor_id != id);
        tables.feedback.retain(|f| f.tutor_id != id);
        Ok(true)
    }

    async fn insert_request(&self, request: NewRequest) -> Result<StudentRequest, DatabaseError> {
        let mut tables = self.lock();
        if !tables.tutors.iter().any(|t| t.id == request.tutor_id) {
            return Err(DatabaseError::NotFound(format!("tutor {}", request.tutor_id)));
        }

        let created = StudentRequest {
            id: tables.allocate_id(),
            tutor_id: request.tutor_id,
            student_account_id: Some(request.student_account_id),
            student_name: request.student_name,
            message: request.message,
            contact_email: request.contact_email,
            preferred_date: request.preferred_date,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        tables.requests.push(created.clone());
        tables.refresh_pending_flag(created.tutor_id);
        Ok(created)
    }

    async fn find_request(&self, id: i64) -> Result<Option<StudentRequest>, DatabaseError> {
        Ok(self.lock().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_requests_for_tutor(&self, tutor_id: i64) -> Result<Vec<StudentRequest>, DatabaseError> {
        Ok(self
            .lock()
            .requests
            .iter()
            .filter(|r| r.tutor_id == tutor_id)
            .cloned()
            .collect())
    }

    async fn list_requests_for_student(&self, account_id: i64) -> Result<Vec<StudentRequest>, DatabaseError> {
        Ok(self
            .lock()
            .requests
            .iter()
            .filter(|r| r.student_account_id == Some(account_id))
            .cloned()
            .collect())
    }

    async fn resolve_request(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<Option<StudentRequest>, DatabaseError> {
        let mut tables = self.lock();
        let updated = match tables
            .requests
            .iter_mut()
            .find(|r| r.id == id && r.status == RequestStatus::Pending)
        {
            Some(request) => {
                request.status = status;
                request.clone()
            }
            None => return Ok(None),
        };
        tables.refresh_pending_flag(updated.tutor_id);
        Ok(Some(updated))
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, DatabaseError> {
        let mut tables = self.lock();
        if !tables.tutors.iter().any(|t| t.id == feedback.tutor_id) {
            return Err(DatabaseError::NotFound(format!("tutor {}", feedback.tutor_id)));
        }
        let created = Feedback {
            id: tables.allocate_id(),
            tutor_id: feedback.tutor_id,
            student_name: feedback.student_name,
            rating: feedback.rating,
            comment: feedback.comment,
            created_at: Utc::now(),
        };
        tables.feedback.push(created.clone());
        Ok(created)
    }

    async fn list_feedback_for_tutors(&self, tutor_ids: &[i64]) -> Result<Vec<Feedback>, DatabaseError> {
        Ok(self
            .lock()
            .feedback
            .iter()
            .filter(|f| tutor_ids.contains(&f.tutor_id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;

    fn fields(name: &str, subject: &str) -> TutorFields {
        TutorFields {
            name: name.to_string(),
            subject: subject.to_string(),
            description: None,
            contact_email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        let account = NewAccount {
            username: "bob".to_string(),
            password_hash: "x".to_string(),
            role: Role::Student,
        };
        store.create_account(account.clone(), None).await.unwrap();
        let err = store.create_account(account, None).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn resolve_only_moves_pending_requests() {
        let store = MemoryStore::new();
        let tutor = store
            .insert_tutor(NewTutor { account_id: None, fields: fields("Ada", "Math") })
            .await
            .unwrap();
        let request = store
            .insert_request(NewRequest {
                tutor_id: tutor.id,
                student_account_id: 99,
                student_name: "bob".to_string(),
                message: None,
                contact_email: "bob@example.com".to_string(),
                preferred_date: None,
            })
            .await
            .unwrap();
        assert!(store.find_tutor(tutor.id).await.unwrap().unwrap().has_pending_request);

        let accepted = store
            .resolve_request(request.id, RequestStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted.status, RequestStatus::Accepted);
        assert!(!store.find_tutor(tutor.id).await.unwrap().unwrap().has_pending_request);

        let again = store
            .resolve_request(request.id, RequestStatus::Rejected)
            .await
            .unwrap();
        assert!(again.is_none());
        let stored = store.find_request(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Accepted);
    }

    #[tokio::test]
    async fn requests_need_a_live_tutor() {
        let store = MemoryStore::new();
        let err = store
            .insert_request(NewRequest {
                tutor_id: 42,
                student_account_id: 1,
                student_name: "bob".to_string(),
                message: None,
                contact_email: "bob@example.com".to_string(),
                preferred_date: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }
}
