use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map unique-constraint violations to `Conflict` and dangling references
    /// to `NotFound`; keep everything else.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("{} already exists", what))
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DatabaseError::NotFound(what.to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

/// Tables backing the store. Idempotent; safe to run on every start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('student', 'tutor', 'admin')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tutors (
        id BIGSERIAL PRIMARY KEY,
        account_id BIGINT UNIQUE REFERENCES accounts(id) ON DELETE CASCADE,
        name VARCHAR(150) NOT NULL,
        subject VARCHAR(150) NOT NULL,
        description TEXT,
        contact_email VARCHAR(254) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        has_pending_request BOOLEAN NOT NULL DEFAULT false
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS student_requests (
        id BIGSERIAL PRIMARY KEY,
        tutor_id BIGINT NOT NULL REFERENCES tutors(id) ON DELETE CASCADE,
        student_account_id BIGINT REFERENCES accounts(id) ON DELETE SET NULL,
        student_name VARCHAR(150) NOT NULL,
        message TEXT,
        contact_email VARCHAR(254) NOT NULL,
        preferred_date TIMESTAMPTZ,
        status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'rejected')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feedback (
        id BIGSERIAL PRIMARY KEY,
        tutor_id BIGINT NOT NULL REFERENCES tutors(id) ON DELETE CASCADE,
        student_name VARCHAR(150) NOT NULL,
        rating INTEGER NOT NULL,
        comment TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS student_requests_tutor_idx ON student_requests (tutor_id)",
    "CREATE INDEX IF NOT EXISTS student_requests_student_idx ON student_requests (student_account_id)",
    "CREATE INDEX IF NOT EXISTS feedback_tutor_idx ON feedback (tutor_id)",
];

/// Builds and prepares the Postgres pool from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect using `config.url`, applying pool limits and timeouts.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Create the tables when they are missing.
    pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Database schema ready ({} statements)", SCHEMA.len());
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
