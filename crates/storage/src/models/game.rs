use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::board::Board;
use super::version::{Actor, VersionInfo, Versioned};
use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum GameResult {
    White,
    Black,
    Draw,
    #[default]
    Unknown,
}

impl GameResult {
    /// Single-letter code used in the `games.result` column.
    pub fn code(&self) -> &'static str {
        match self {
            Self::White => "W",
            Self::Black => "B",
            Self::Draw => "D",
            Self::Unknown => "U",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Score for the given side: 1 for a win, 0.5 for a draw, 0 for a loss.
    /// `None` when the game has no decided result.
    pub fn score_for(&self, color: Color) -> Option<f64> {
        match (self, color) {
            (Self::Unknown, _) => None,
            (Self::Draw, _) => Some(0.5),
            (Self::White, Color::White) | (Self::Black, Color::Black) => Some(1.0),
            (Self::White, Color::Black) | (Self::Black, Color::White) => Some(0.0),
        }
    }

    /// Parses an optional result cell; blanks and `NULL`/`None` are Unknown.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, StorageError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Unknown),
            Some(text) if text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("none") => {
                Ok(Self::Unknown)
            }
            Some(text) => text.parse(),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::White => "White",
            Self::Black => "Black",
            Self::Draw => "Draw",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl FromStr for GameResult {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "W" | "WHITE" | "1-0" => Ok(Self::White),
            "B" | "BLACK" | "0-1" => Ok(Self::Black),
            "D" | "DRAW" | "1/2-1/2" => Ok(Self::Draw),
            "U" | "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(StorageError::InvalidSubmission(format!("unknown result '{}'", s))),
        }
    }
}

/// One version of the game played on a board on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub game_id: Uuid,
    pub date_of_match: NaiveDate,
    pub week_number: Option<i32>,
    #[schema(value_type = String, example = "G-3")]
    pub board: Board,
    pub white: Option<Uuid>,
    pub black: Option<Uuid>,
    pub result: GameResult,
    #[serde(flatten)]
    pub version: VersionInfo,
}

impl Game {
    pub fn color_of(&self, player_id: Uuid) -> Option<Color> {
        if self.white == Some(player_id) {
            Some(Color::White)
        } else if self.black == Some(player_id) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Whether both players sit at this board, in either color.
    pub fn is_between(&self, a: Uuid, b: Uuid) -> bool {
        (self.white == Some(a) && self.black == Some(b))
            || (self.white == Some(b) && self.black == Some(a))
    }

    /// Same seating and result, ignoring identity and version columns.
    pub fn matches(&self, other: &NewGame) -> bool {
        self.white == other.white && self.black == other.black && self.result == other.result
    }
}

impl Versioned for Game {
    fn entity_id(&self) -> Uuid {
        self.game_id
    }

    fn version(&self) -> &VersionInfo {
        &self.version
    }

    fn version_mut(&mut self) -> &mut VersionInfo {
        &mut self.version
    }
}

/// Field values for a game about to be written, either as a brand new game
/// or as the next version of an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub date_of_match: NaiveDate,
    pub week_number: Option<i32>,
    pub board: Board,
    pub white: Option<Uuid>,
    pub black: Option<Uuid>,
    pub result: GameResult,
}

impl NewGame {
    pub fn into_game(self, game_id: Uuid, actor: &Actor, now: DateTime<Utc>) -> Game {
        Game {
            game_id,
            date_of_match: self.date_of_match,
            week_number: self.week_number,
            board: self.board,
            white: self.white,
            black: self.black,
            result: self.result,
            version: VersionInfo::open(actor, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_scores() {
        assert_eq!(GameResult::White.score_for(Color::White), Some(1.0));
        assert_eq!(GameResult::White.score_for(Color::Black), Some(0.0));
        assert_eq!(GameResult::Black.score_for(Color::Black), Some(1.0));
        assert_eq!(GameResult::Draw.score_for(Color::White), Some(0.5));
        assert_eq!(GameResult::Draw.score_for(Color::Black), Some(0.5));
        assert_eq!(GameResult::Unknown.score_for(Color::White), None);
    }

    #[test]
    fn test_result_parsing() {
        assert_eq!("W".parse::<GameResult>().unwrap(), GameResult::White);
        assert_eq!("black".parse::<GameResult>().unwrap(), GameResult::Black);
        assert_eq!("Draw".parse::<GameResult>().unwrap(), GameResult::Draw);
        assert!("X".parse::<GameResult>().is_err());

        assert_eq!(GameResult::parse_optional(None).unwrap(), GameResult::Unknown);
        assert_eq!(GameResult::parse_optional(Some("NULL")).unwrap(), GameResult::Unknown);
        assert_eq!(GameResult::parse_optional(Some("none")).unwrap(), GameResult::Unknown);
        assert_eq!(GameResult::parse_optional(Some("D")).unwrap(), GameResult::Draw);
    }

    #[test]
    fn test_color_lookup() {
        let (white, black) = (Uuid::new_v4(), Uuid::new_v4());
        let game = NewGame {
            date_of_match: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            week_number: None,
            board: Board::new('G', 1).unwrap(),
            white: Some(white),
            black: Some(black),
            result: GameResult::Unknown,
        }
        .into_game(Uuid::new_v4(), &Actor::new("director"), Utc::now());

        assert_eq!(game.color_of(white), Some(Color::White));
        assert_eq!(game.color_of(black), Some(Color::Black));
        assert_eq!(game.color_of(Uuid::new_v4()), None);
        assert!(game.is_between(black, white));
        assert_eq!(Color::White.opposite(), Color::Black);
    }
}
