use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Board;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Board {board} already has an active game on {date}")]
    DuplicateBoard { date: NaiveDate, board: Board },

    #[error("No active player named '{name}'")]
    PlayerNotFound { name: String },

    #[error("Invalid board '{0}'")]
    InvalidBoard(String),

    #[error("Invalid player name '{0}', expected 'Last, First'")]
    InvalidPlayerName(String),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }
}
