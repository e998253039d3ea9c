use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // assigned by the store, never reused
    pub email: String,              // unique, case preserved
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string, never exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("email already exists")]
    EmailTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
