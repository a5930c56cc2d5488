use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StorageError;

/// A physical seat identified by a letter and a number, written `G-3`.
///
/// The letter is always stored upper-case and the number starts at 1.
/// Parsing accepts `G-3`, `G3` and `3G` so boards typed into a search box
/// resolve the same way as boards coming from a round sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Board {
    letter: char,
    number: u16,
}

impl Board {
    pub fn new(letter: char, number: u16) -> Result<Self, StorageError> {
        if !letter.is_ascii_alphabetic() || number == 0 {
            return Err(StorageError::InvalidBoard(format!("{}-{}", letter, number)));
        }

        Ok(Self {
            letter: letter.to_ascii_uppercase(),
            number,
        })
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn number(&self) -> u16 {
        self.number
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.letter, self.number)
    }
}

impl FromStr for Board {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StorageError::InvalidBoard(s.to_string());
        let raw = s.trim();

        let first = raw.chars().next().ok_or_else(invalid)?;
        let last = raw.chars().last().ok_or_else(invalid)?;

        // `G-3` and `G3` put the letter first; only `3G` puts it last, and
        // that form takes no dash.
        let (letter, digits) = if first.is_ascii_alphabetic() {
            let rest = &raw[first.len_utf8()..];
            (first, rest.strip_prefix('-').unwrap_or(rest))
        } else if last.is_ascii_alphabetic() {
            (last, &raw[..raw.len() - last.len_utf8()])
        } else {
            return Err(invalid());
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let number = digits.parse::<u16>().map_err(|_| invalid())?;
        Board::new(letter, number).map_err(|_| invalid())
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
