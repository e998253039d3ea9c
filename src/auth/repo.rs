use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{StoreError, User};

/// Credential store contract: create once, look up by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `EmailTaken` when the email is already registered.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    /// Fails with `NotFound` when no record has this exact email.
    async fn find_by_email(&self, email: &str) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::EmailTaken
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
pub use memory::MemoryUserStore;
