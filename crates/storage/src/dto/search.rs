use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::lesson_class::LessonClassResponse;
use super::player::PlayerResponse;
use super::round::RoundGameResponse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// A board such as `G-3`, `G3` or `3G` when the query reads as one,
    /// names otherwise.
    #[default]
    Auto,
    Board,
    Name,
    /// Players whose class is taught by someone with this first name.
    Teacher,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default, rename = "type")]
    #[param(inline)]
    pub kind: SearchKind,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), String> {
        let q = self.q.trim();
        if q.is_empty() {
            return Err("q must not be empty".to_string());
        }
        if q.chars().count() > 100 {
            return Err("q must be at most 100 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchResults {
    pub players: Vec<PlayerResponse>,
    pub classes: Vec<LessonClassResponse>,
    pub games: Vec<RoundGameResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_auto() {
        let query: SearchQuery = serde_json::from_str(r#"{"q": "G3"}"#).unwrap();
        assert_eq!(query.kind, SearchKind::Auto);
        assert!(query.validate().is_ok());

        let query: SearchQuery = serde_json::from_str(r#"{"q": "  ", "type": "name"}"#).unwrap();
        assert_eq!(query.kind, SearchKind::Name);
        assert!(query.validate().is_err());
    }
}
