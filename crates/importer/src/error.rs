use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
