use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::versioned::VersionedTable;
use super::{ClubStore, RatingUpdate, RoundChanges, newest_first, seed_order};
use crate::error::{Result, StorageError};
use crate::models::{
    Actor, Board, Game, LessonClass, LessonClassChanges, NewGame, NewLessonClass, NewPlayer, Player,
    PlayerChanges, PlayerName, Versioned,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    players: VersionedTable<Player>,
    classes: VersionedTable<LessonClass>,
    games: VersionedTable<Game>,
    rated: HashSet<Uuid>,
}

impl Tables {
    fn ensure_class(&self, class_id: Uuid) -> Result<()> {
        if self.classes.current(class_id).is_none() {
            return Err(StorageError::ConstraintViolation(format!(
                "unknown lesson class {}",
                class_id
            )));
        }
        Ok(())
    }

    fn create_game(&mut self, game: NewGame, actor: &Actor) -> Result<Game> {
        let occupied = self
            .games
            .active()
            .any(|g| g.date_of_match == game.date_of_match && g.board == game.board);
        if occupied {
            return Err(StorageError::DuplicateBoard {
                date: game.date_of_match,
                board: game.board,
            });
        }

        self.games.insert(game.into_game(Uuid::new_v4(), actor, Utc::now()))
    }

    fn update_player(
        &mut self,
        player_id: Uuid,
        changes: &PlayerChanges,
        actor: &Actor,
    ) -> Result<Player> {
        let current = self
            .players
            .current(player_id)
            .ok_or(StorageError::NotFound)?
            .clone();
        if let Some(Some(class_id)) = changes.lesson_class_id {
            self.ensure_class(class_id)?;
        }

        let now = Utc::now();
        let next = current.next_version(changes, actor, now);
        self.players.supersede(player_id, next, actor, now)
    }
}

/// Club store kept entirely in memory.
///
/// Bulk operations run against a copy of the tables that replaces the live
/// one only when every step succeeded, which gives them the same
/// all-or-nothing behaviour as a database transaction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    async fn active_players(&self) -> Result<Vec<Player>> {
        let tables = self.tables.read().await;
        let mut players: Vec<Player> = tables.players.active().cloned().collect();
        players.sort_by(seed_order);
        Ok(players)
    }

    async fn find_player(&self, player_id: Uuid) -> Result<Player> {
        let tables = self.tables.read().await;
        tables
            .players
            .current(player_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_player_by_name(&self, name: &PlayerName) -> Result<Option<Player>> {
        let tables = self.tables.read().await;
        Ok(tables
            .players
            .active()
            .find(|p| p.last_name == name.last() && p.first_name == name.first())
            .cloned())
    }

    async fn player_history(&self, player_id: Uuid) -> Result<Vec<Player>> {
        let tables = self.tables.read().await;
        let history = tables.players.history(player_id);
        if history.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(history)
    }

    async fn create_player(&self, player: NewPlayer, actor: &Actor) -> Result<Player> {
        let mut tables = self.tables.write().await;
        if let Some(class_id) = player.lesson_class_id {
            tables.ensure_class(class_id)?;
        }
        tables.players.insert(player.into_player(actor, Utc::now()))
    }

    async fn update_player(
        &self,
        player_id: Uuid,
        changes: PlayerChanges,
        actor: &Actor,
    ) -> Result<Player> {
        let mut tables = self.tables.write().await;
        tables.update_player(player_id, &changes, actor)
    }

    async fn deactivate_player(&self, player_id: Uuid, actor: &Actor) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.players.close(player_id, actor, Utc::now())?;
        Ok(())
    }

    async fn lesson_classes(&self) -> Result<Vec<LessonClass>> {
        let tables = self.tables.read().await;
        let mut classes: Vec<LessonClass> = tables.classes.active().cloned().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn create_lesson_class(
        &self,
        class: NewLessonClass,
        actor: &Actor,
    ) -> Result<LessonClass> {
        let mut tables = self.tables.write().await;
        tables.classes.insert(class.into_class(actor, Utc::now()))
    }

    async fn update_lesson_class(
        &self,
        class_id: Uuid,
        changes: LessonClassChanges,
        actor: &Actor,
    ) -> Result<LessonClass> {
        let mut tables = self.tables.write().await;
        let current = tables
            .classes
            .current(class_id)
            .ok_or(StorageError::NotFound)?
            .clone();
        let now = Utc::now();
        let next = current.next_version(&changes, actor, now);
        tables.classes.supersede(class_id, next, actor, now)
    }

    async fn deactivate_lesson_class(&self, class_id: Uuid, actor: &Actor) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.classes.close(class_id, actor, Utc::now())?;
        Ok(())
    }

    async fn active_games_on(&self, date: NaiveDate) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let mut games: Vec<Game> = tables
            .games
            .active()
            .filter(|g| g.date_of_match == date)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.board);
        Ok(games)
    }

    async fn active_game_at(&self, date: NaiveDate, board: Board) -> Result<Option<Game>> {
        let tables = self.tables.read().await;
        Ok(tables
            .games
            .active()
            .find(|g| g.date_of_match == date && g.board == board)
            .cloned())
    }

    async fn games_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let mut games: Vec<Game> = tables
            .games
            .active()
            .filter(|g| g.is_between(a, b))
            .cloned()
            .collect();
        games.sort_by(newest_first);
        Ok(games)
    }

    async fn board_history(&self, date: NaiveDate, board: Board) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let mut games: Vec<Game> = tables
            .games
            .all()
            .filter(|g| g.date_of_match == date && g.board == board)
            .cloned()
            .collect();
        games.sort_by_key(|g| g.version.created_at);
        Ok(games)
    }

    async fn games_on_board(&self, board: Board) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let mut games: Vec<Game> = tables
            .games
            .active()
            .filter(|g| g.board == board)
            .cloned()
            .collect();
        games.sort_by(newest_first);
        Ok(games)
    }

    async fn games_of_players(&self, player_ids: &[Uuid]) -> Result<Vec<Game>> {
        let tables = self.tables.read().await;
        let seated = |seat: Option<Uuid>| seat.is_some_and(|id| player_ids.contains(&id));
        let mut games: Vec<Game> = tables
            .games
            .active()
            .filter(|g| seated(g.white) || seated(g.black))
            .cloned()
            .collect();
        games.sort_by(newest_first);
        Ok(games)
    }

    async fn rated_games(&self, game_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let tables = self.tables.read().await;
        Ok(game_ids
            .iter()
            .filter(|id| tables.rated.contains(id))
            .copied()
            .collect())
    }

    async fn create_game(&self, game: NewGame, actor: &Actor) -> Result<Game> {
        let mut tables = self.tables.write().await;
        tables.create_game(game, actor)
    }

    async fn apply_round(&self, changes: &RoundChanges, actor: &Actor) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let now = Utc::now();

        for version_id in &changes.deactivated {
            staged.games.close_version(*version_id, actor, now)?;
        }

        for replacement in &changes.updated {
            let previous = staged.games.close_version(replacement.previous, actor, now)?;
            let next = replacement
                .next
                .clone()
                .into_game(previous.entity_id(), actor, now);
            staged.games.insert(next)?;
        }

        for game in &changes.created {
            staged.create_game(game.clone(), actor)?;
        }

        *tables = staged;
        Ok(())
    }

    async fn apply_ratings(
        &self,
        updates: &[RatingUpdate],
        rated: &[Uuid],
        actor: &Actor,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();

        for game_id in rated {
            if !staged.rated.insert(*game_id) {
                return Err(StorageError::ConstraintViolation(format!(
                    "game {} was already rated",
                    game_id
                )));
            }
        }

        for update in updates {
            let current = staged
                .players
                .current(update.player_id)
                .ok_or(StorageError::NotFound)?
                .clone();
            let changes = PlayerChanges::after_game(&current, update.new_rating, update.opponent);
            staged.update_player(update.player_id, &changes, actor)?;
        }

        *tables = staged;
        Ok(())
    }
}
