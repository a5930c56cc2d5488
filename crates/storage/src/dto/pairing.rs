use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PairingRequest {
    /// Players already seated on this date are left out.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub separate_classes: bool,
    /// Number the pairings onto boards of this letter.
    #[validate(custom(function = "validate_board_letter"))]
    #[schema(example = "G")]
    pub board_letter: Option<String>,
}

impl PairingRequest {
    pub fn board_letter(&self) -> Option<char> {
        self.board_letter
            .as_deref()
            .and_then(|letter| letter.trim().chars().next())
            .map(|c| c.to_ascii_uppercase())
    }
}

fn validate_board_letter(letter: &str) -> Result<(), ValidationError> {
    let mut chars = letter.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(()),
        _ => Err(ValidationError::new("board_letter")
            .with_message("Board letter must be a single letter".into())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PairingEntry {
    pub white_id: Uuid,
    pub white: String,
    pub black_id: Uuid,
    pub black: String,
    #[schema(example = "G-1")]
    pub board: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PairingResponse {
    pub pairings: Vec<PairingEntry>,
    pub unpaired: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_letter() {
        let request = PairingRequest {
            board_letter: Some(" g ".to_string()),
            ..PairingRequest::default()
        };
        assert_eq!(request.board_letter(), Some('G'));
        assert!(request.validate().is_ok());

        let request = PairingRequest {
            board_letter: Some("GH".to_string()),
            ..PairingRequest::default()
        };
        assert!(request.validate().is_err());

        assert_eq!(PairingRequest::default().board_letter(), None);
    }
}
