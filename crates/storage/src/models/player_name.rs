use std::fmt;
use std::str::FromStr;

use crate::error::StorageError;

/// A player's name as written on round sheets: `"Last, First"`.
///
/// Lookups against the roster compare both parts exactly after trimming, so
/// this type is the only way submitted text reaches a name query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName {
    last: String,
    first: String,
}

impl PlayerName {
    pub fn new(last: impl Into<String>, first: impl Into<String>) -> Self {
        Self {
            last: last.into().trim().to_string(),
            first: first.into().trim().to_string(),
        }
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    /// Parses an optional name cell. Blank cells and the `NULL`/`None`
    /// placeholders some sheets carry mean "no player".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, StorageError> {
        match raw.map(str::trim) {
            None | Some("") | Some("NULL") | Some("None") => Ok(None),
            Some(text) => text.parse().map(Some),
        }
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last, self.first)
    }
}

impl FromStr for PlayerName {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (last, first) = s
            .split_once(',')
            .ok_or_else(|| StorageError::InvalidPlayerName(s.to_string()))?;

        let name = PlayerName::new(last, first);
        if name.last.is_empty() || name.first.is_empty() || name.first.contains(',') {
            return Err(StorageError::InvalidPlayerName(s.to_string()));
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_first() {
        let name: PlayerName = "Carlsen, Magnus".parse().unwrap();
        assert_eq!(name.last(), "Carlsen");
        assert_eq!(name.first(), "Magnus");
        assert_eq!(name.to_string(), "Carlsen, Magnus");
    }

    #[test]
    fn test_parse_trims_parts() {
        let name: PlayerName = "  Polgar ,Judit ".parse().unwrap();
        assert_eq!(name, PlayerName::new("Polgar", "Judit"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("Magnus Carlsen".parse::<PlayerName>().is_err());
        assert!(", Magnus".parse::<PlayerName>().is_err());
        assert!("Carlsen, ".parse::<PlayerName>().is_err());
        assert!("A, B, C".parse::<PlayerName>().is_err());
    }

    #[test]
    fn test_parse_optional_blank_cells() {
        assert_eq!(PlayerName::parse_optional(None).unwrap(), None);
        assert_eq!(PlayerName::parse_optional(Some("  ")).unwrap(), None);
        assert_eq!(PlayerName::parse_optional(Some("NULL")).unwrap(), None);
        assert_eq!(
            PlayerName::parse_optional(Some("Tal, Mikhail")).unwrap(),
            Some(PlayerName::new("Tal", "Mikhail"))
        );
    }
}
