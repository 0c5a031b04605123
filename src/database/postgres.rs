use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    Account, Feedback, NewAccount, NewFeedback, NewRequest, NewTutor, RequestStatus,
    StudentRequest, Tutor, TutorFields,
};
use crate::database::store::Store;

const TUTOR_COLUMNS: &str =
    "id, account_id, name, subject, description, contact_email, created_at, has_pending_request";
const REQUEST_COLUMNS: &str = "id, tutor_id, student_account_id, student_name, message, \
     contact_email, preferred_date, status, created_at";
const FEEDBACK_COLUMNS: &str = "id, tutor_id, student_name, rating, comment, created_at";
const ACCOUNT_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally.
fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl Store for PgStore {
    async fn create_account(
        &self,
        account: NewAccount,
        tutor: Option<TutorFields>,
    ) -> Result<(Account, Option<Tutor>), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (username, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, &format!("account '{}'", account.username)))?;

        let profile = match tutor {
            Some(fields) => Some(
                sqlx::query_as::<_, Tutor>(&format!(
                    "INSERT INTO tutors (account_id, name, subject, description, contact_email) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    TUTOR_COLUMNS
                ))
                .bind(created.id)
                .bind(&fields.name)
                .bind(&fields.subject)
                .bind(&fields.description)
                .bind(&fields.contact_email)
                .fetch_one(&mut *tx)
                .await?,
            ),
            None => None,
        };

        tx.commit().await?;
        Ok((created, profile))
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>, DatabaseError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE username = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn insert_tutor(&self, tutor: NewTutor) -> Result<Tutor, DatabaseError> {
        let fields = tutor.fields;
        let created = sqlx::query_as::<_, Tutor>(&format!(
            "INSERT INTO tutors (account_id, name, subject, description, contact_email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TUTOR_COLUMNS
        ))
        .bind(tutor.account_id)
        .bind(&fields.name)
        .bind(&fields.subject)
        .bind(&fields.description)
        .bind(&fields.contact_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "tutor profile for this account"))?;
        Ok(created)
    }

    async fn find_tutor(&self, id: i64) -> Result<Option<Tutor>, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!(
            "SELECT {} FROM tutors WHERE id = $1",
            TUTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tutor)
    }

    async fn find_tutor_by_account(&self, account_id: i64) -> Result<Option<Tutor>, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!(
            "SELECT {} FROM tutors WHERE account_id = $1",
            TUTOR_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tutor)
    }

    async fn list_tutors(&self, subject: Option<&str>) -> Result<Vec<Tutor>, DatabaseError> {
        let tutors = match subject {
            Some(fragment) => {
                sqlx::query_as::<_, Tutor>(&format!(
                    "SELECT {} FROM tutors WHERE subject ILIKE $1 ESCAPE '\\' ORDER BY id",
                    TUTOR_COLUMNS
                ))
                .bind(like_pattern(fragment))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Tutor>(&format!(
                    "SELECT {} FROM tutors ORDER BY id",
                    TUTOR_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(tutors)
    }

    async fn update_tutor(&self, id: i64, fields: TutorFields) -> Result<Option<Tutor>, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!(
            "UPDATE tutors SET name = $2, subject = $3, description = $4, contact_email = $5 \
             WHERE id = $1 RETURNING {}",
            TUTOR_COLUMNS
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.subject)
        .bind(&fields.description)
        .bind(&fields.contact_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tutor)
    }

    async fn delete_tutor(&self, id: i64) -> Result<bool, DatabaseError> {
        // Dependents go first so the delete holds even without FK cascades.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM feedback WHERE tutor_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM student_requests WHERE tutor_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM tutors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(removed > 0)
    }

    async fn insert_request(&self, request: NewRequest) -> Result<StudentRequest, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, StudentRequest>(&format!(
            "INSERT INTO student_requests \
             (tutor_id, student_account_id, student_name, message, contact_email, preferred_date, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(request.tutor_id)
        .bind(request.student_account_id)
        .bind(&request.student_name)
        .bind(&request.message)
        .bind(&request.contact_email)
        .bind(request.preferred_date)
        .bind(RequestStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, &format!("tutor {}", request.tutor_id)))?;

        sqlx::query("UPDATE tutors SET has_pending_request = true WHERE id = $1")
            .bind(request.tutor_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_request(&self, id: i64) -> Result<Option<StudentRequest>, DatabaseError> {
        let request = sqlx::query_as::<_, StudentRequest>(&format!(
            "SELECT {} FROM student_requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_requests_for_tutor(&self, tutor_id: i64) -> Result<Vec<StudentRequest>, DatabaseError> {
        let requests = sqlx::query_as::<_, StudentRequest>(&format!(
            "SELECT {} FROM student_requests WHERE tutor_id = $1 ORDER BY id",
            REQUEST_COLUMNS
        ))
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn list_requests_for_student(&self, account_id: i64) -> Result<Vec<StudentRequest>, DatabaseError> {
        let requests = sqlx::query_as::<_, StudentRequest>(&format!(
            "SELECT {} FROM student_requests WHERE student_account_id = $1 ORDER BY id",
            REQUEST_COLUMNS
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn resolve_request(
        &self,
        id: i64,
        status: RequestStatus,
    ) -> Result<Option<StudentRequest>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // The status guard makes the transition a compare-and-set on 'pending'.
        let updated = sqlx::query_as::<_, StudentRequest>(&format!(
            "UPDATE student_requests SET status = $2 WHERE id = $1 AND status = $3 RETURNING {}",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(RequestStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE tutors SET has_pending_request = EXISTS (\
                SELECT 1 FROM student_requests WHERE tutor_id = $1 AND status = $2\
             ) WHERE id = $1",
        )
        .bind(updated.tutor_id)
        .bind(RequestStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, DatabaseError> {
        let created = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO feedback (tutor_id, student_name, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            FEEDBACK_COLUMNS
        ))
        .bind(feedback.tutor_id)
        .bind(&feedback.student_name)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, &format!("tutor {}", feedback.tutor_id)))?;
        Ok(created)
    }

    async fn list_feedback_for_tutors(&self, tutor_ids: &[i64]) -> Result<Vec<Feedback>, DatabaseError> {
        if tutor_ids.is_empty() {
            return Ok(vec![]);
        }
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {} FROM feedback WHERE tutor_id = ANY($1) ORDER BY id",
            FEEDBACK_COLUMNS
        ))
        .bind(tutor_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(feedback)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
