use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    BadRequest(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound)
            | Self::Storage(StorageError::PlayerNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_))
            | Self::Storage(StorageError::DuplicateBoard { .. }) => StatusCode::CONFLICT,
            Self::Storage(StorageError::InvalidBoard(_))
            | Self::Storage(StorageError::InvalidPlayerName(_))
            | Self::Storage(StorageError::InvalidSubmission(_)) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(
                e @ (StorageError::ConstraintViolation(_)
                | StorageError::DuplicateBoard { .. }
                | StorageError::PlayerNotFound { .. }
                | StorageError::InvalidBoard(_)
                | StorageError::InvalidPlayerName(_)
                | StorageError::InvalidSubmission(_)),
            ) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::BadRequest(msg) => {
                json!({
                    "error": msg
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_codes() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 7).unwrap();
        let board = "G-1".parse().unwrap();

        let cases = [
            (WebError::Storage(StorageError::NotFound), StatusCode::NOT_FOUND),
            (
                WebError::Storage(StorageError::PlayerNotFound {
                    name: "Tal, Mikhail".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                WebError::Storage(StorageError::DuplicateBoard { date, board }),
                StatusCode::CONFLICT,
            ),
            (
                WebError::Storage(StorageError::InvalidSubmission("x".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                WebError::Storage(StorageError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (WebError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
