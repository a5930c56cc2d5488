//! Persistence contract shared by the in-memory and PostgreSQL stores.
//!
//! Every mutation takes an explicit [`Actor`] and follows the versioning
//! rule: rows are closed and replaced, never edited. The two bulk
//! operations, [`ClubStore::apply_round`] and [`ClubStore::apply_ratings`],
//! are all-or-nothing.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Actor, Board, Game, LessonClass, LessonClassChanges, NewGame, NewLessonClass, NewPlayer, Player,
    PlayerChanges, PlayerName,
};

pub mod memory;
pub mod versioned;

pub use memory::MemoryStore;
pub use versioned::VersionedTable;

/// Game transitions for one date, applied in a single transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundChanges {
    pub created: Vec<NewGame>,
    pub updated: Vec<GameReplacement>,
    /// Version ids of games closed with no replacement.
    pub deactivated: Vec<Uuid>,
}

impl RoundChanges {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.deactivated.is_empty()
    }
}

/// Replaces the version `previous` of a game with `next`, keeping its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReplacement {
    pub previous: Uuid,
    pub next: NewGame,
}

/// New rating for a player after a game against `opponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingUpdate {
    pub player_id: Uuid,
    pub new_rating: i32,
    pub opponent: Uuid,
}

#[async_trait]
pub trait ClubStore: Send + Sync {
    /// Active player versions in seed order: rating, grade, last name and
    /// first name, all descending, with missing grades last.
    async fn active_players(&self) -> Result<Vec<Player>>;

    async fn find_player(&self, player_id: Uuid) -> Result<Player>;

    /// First active player whose names match exactly.
    async fn find_player_by_name(&self, name: &PlayerName) -> Result<Option<Player>>;

    /// Every version of a player, oldest first.
    async fn player_history(&self, player_id: Uuid) -> Result<Vec<Player>>;

    /// Fails with `ConstraintViolation` when the lesson class is unknown.
    async fn create_player(&self, player: NewPlayer, actor: &Actor) -> Result<Player>;

    /// Same lesson class check as [`ClubStore::create_player`] when the
    /// changes move the player into a class.
    async fn update_player(
        &self,
        player_id: Uuid,
        changes: PlayerChanges,
        actor: &Actor,
    ) -> Result<Player>;

    async fn deactivate_player(&self, player_id: Uuid, actor: &Actor) -> Result<()>;

    async fn lesson_classes(&self) -> Result<Vec<LessonClass>>;

    async fn create_lesson_class(&self, class: NewLessonClass, actor: &Actor)
    -> Result<LessonClass>;

    async fn update_lesson_class(
        &self,
        class_id: Uuid,
        changes: LessonClassChanges,
        actor: &Actor,
    ) -> Result<LessonClass>;

    async fn deactivate_lesson_class(&self, class_id: Uuid, actor: &Actor) -> Result<()>;

    async fn active_games_on(&self, date: NaiveDate) -> Result<Vec<Game>>;

    async fn active_game_at(&self, date: NaiveDate, board: Board) -> Result<Option<Game>>;

    /// Active games where both players sat across from each other, newest
    /// first by date and then by creation time.
    async fn games_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Game>>;

    /// Every version of the game on one board and date, oldest first.
    async fn board_history(&self, date: NaiveDate, board: Board) -> Result<Vec<Game>>;

    /// Active games played on one board across all dates, newest first.
    async fn games_on_board(&self, board: Board) -> Result<Vec<Game>>;

    /// Active games with any of these players in either seat, newest first.
    async fn games_of_players(&self, player_ids: &[Uuid]) -> Result<Vec<Game>>;

    /// The subset of `game_ids` whose result has already been rated.
    async fn rated_games(&self, game_ids: &[Uuid]) -> Result<HashSet<Uuid>>;

    /// Creates a single game, failing with `DuplicateBoard` when the board is
    /// already taken that day.
    async fn create_game(&self, game: NewGame, actor: &Actor) -> Result<Game>;

    async fn apply_round(&self, changes: &RoundChanges, actor: &Actor) -> Result<()>;

    /// Applies the updates in order; a player listed twice builds on the
    /// version written by the first update. `rated` games are recorded as
    /// rated in the same transaction, and one that already is fails the
    /// whole call with `ConstraintViolation`.
    async fn apply_ratings(
        &self,
        updates: &[RatingUpdate],
        rated: &[Uuid],
        actor: &Actor,
    ) -> Result<()>;
}

/// Newest first by date of match, then by creation time.
pub fn newest_first(a: &Game, b: &Game) -> std::cmp::Ordering {
    b.date_of_match
        .cmp(&a.date_of_match)
        .then_with(|| b.version.created_at.cmp(&a.version.created_at))
}

/// Seed order used by every store for [`ClubStore::active_players`].
pub fn seed_order(a: &Player, b: &Player) -> std::cmp::Ordering {
    b.rating
        .cmp(&a.rating)
        .then_with(|| b.grade.cmp(&a.grade))
        .then_with(|| b.last_name.cmp(&a.last_name))
        .then_with(|| b.first_name.cmp(&a.first_name))
}
