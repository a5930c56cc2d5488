use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::pairing::PairingRequest;
use crate::models::Game;

/// One board as reported by the director after a round.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BoardSubmission {
    #[schema(example = "G-3")]
    pub board: String,
    /// `"Last, First"`; blank, `NULL` or `None` leaves the seat empty
    #[schema(example = "Carlsen, Magnus")]
    pub white: Option<String>,
    #[schema(example = "Nakamura, Hikaru")]
    pub black: Option<String>,
    /// `W`, `B`, `D` or `U`; blank means unknown
    #[schema(example = "W")]
    pub result: Option<String>,
}

/// Everything played on one date.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RoundSubmission {
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 53, message = "Week number must be between 1 and 53"))]
    pub week_number: Option<i32>,
    pub boards: Vec<BoardSubmission>,
    #[serde(default)]
    pub separate_classes: bool,
}

impl RoundSubmission {
    /// Request for pairing the next round with the same class setting.
    pub fn pairing_request(&self) -> PairingRequest {
        PairingRequest {
            date: None,
            separate_classes: self.separate_classes,
            board_letter: None,
        }
    }
}

/// Name and new rating of a player rated during settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatingChange {
    pub player_id: Uuid,
    pub name: String,
    pub previous_rating: i32,
    pub new_rating: i32,
}

/// A board left out of settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoardError {
    pub date: NaiveDate,
    #[schema(example = "G-3")]
    pub board: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettlementReport {
    pub date: NaiveDate,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub deactivated: Vec<String>,
    pub ratings: Vec<RatingChange>,
    pub errors: Vec<BoardError>,
    /// Boards whose already decided result was changed. The game is updated
    /// but nobody is re-rated.
    pub unrated_corrections: Vec<String>,
}

impl SettlementReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            created: Vec::new(),
            updated: Vec::new(),
            deactivated: Vec::new(),
            ratings: Vec::new(),
            errors: Vec::new(),
            unrated_corrections: Vec::new(),
        }
    }

    pub fn has_game_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deactivated.is_empty())
    }
}

/// Game as shown in a round listing, with player names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoundGameResponse {
    pub game_id: Uuid,
    pub date_of_match: NaiveDate,
    #[schema(example = "G-3")]
    pub board: String,
    pub week_number: Option<i32>,
    pub white_id: Option<Uuid>,
    pub white: Option<String>,
    pub black_id: Option<Uuid>,
    pub black: Option<String>,
    #[schema(example = "W")]
    pub result: String,
    pub modified_by: String,
}

impl RoundGameResponse {
    pub fn from_game(game: &Game, name_of: impl Fn(Uuid) -> Option<String>) -> Self {
        Self {
            game_id: game.game_id,
            date_of_match: game.date_of_match,
            board: game.board.to_string(),
            week_number: game.week_number,
            white_id: game.white,
            white: game.white.and_then(&name_of),
            black_id: game.black,
            black: game.black.and_then(&name_of),
            result: game.result.code().to_string(),
            modified_by: game.version.modified_by.clone(),
        }
    }
}

/// One version of a board's game, as listed in its history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameVersionResponse {
    pub version_id: Uuid,
    #[serde(flatten)]
    pub game: RoundGameResponse,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
}

impl GameVersionResponse {
    pub fn from_game(game: &Game, name_of: impl Fn(Uuid) -> Option<String>) -> Self {
        Self {
            version_id: game.version.version_id,
            game: RoundGameResponse::from_game(game, name_of),
            is_active: game.version.is_active,
            created_at: game.version.created_at,
            end_at: game.version.end_at,
            closed_by: game.version.closed_by.clone(),
        }
    }
}
