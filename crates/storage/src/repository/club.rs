use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::game::{self, GameRepository};
use super::lesson_class::{self, LessonClassRepository};
use super::player::{self, PlayerRepository};
use super::versioning::{self, VersionedTable};
use crate::error::{Result, StorageError};
use crate::models::{
    Actor, Board, Game, LessonClass, LessonClassChanges, NewGame, NewLessonClass, NewPlayer, Player,
    PlayerChanges, PlayerName,
};
use crate::store::{ClubStore, RatingUpdate, RoundChanges};

/// Club store backed by PostgreSQL. Every write runs in its own
/// transaction; the partial unique indexes reject a second active version
/// of an entity and a second active game on a board.
#[derive(Debug, Clone)]
pub struct PgClubStore {
    pool: PgPool,
}

impl PgClubStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turns a unique violation from a concurrent writer into a conflict.
fn stale_version(e: StorageError) -> StorageError {
    if e.is_unique_violation() {
        StorageError::ConstraintViolation("record was changed concurrently".to_string())
    } else {
        e
    }
}

impl PgClubStore {
    async fn ensure_class(&self, class_id: Uuid) -> Result<()> {
        if !LessonClassRepository::new(&self.pool).exists(class_id).await? {
            return Err(StorageError::ConstraintViolation(format!(
                "unknown lesson class {}",
                class_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ClubStore for PgClubStore {
    async fn active_players(&self) -> Result<Vec<Player>> {
        PlayerRepository::new(&self.pool).list_active().await
    }

    async fn find_player(&self, player_id: Uuid) -> Result<Player> {
        PlayerRepository::new(&self.pool).find_active(player_id).await
    }

    async fn find_player_by_name(&self, name: &PlayerName) -> Result<Option<Player>> {
        PlayerRepository::new(&self.pool)
            .find_active_by_name(name)
            .await
    }

    async fn player_history(&self, player_id: Uuid) -> Result<Vec<Player>> {
        PlayerRepository::new(&self.pool).history(player_id).await
    }

    async fn create_player(&self, player: NewPlayer, actor: &Actor) -> Result<Player> {
        if let Some(class_id) = player.lesson_class_id {
            self.ensure_class(class_id).await?;
        }

        let player = player.into_player(actor, Utc::now());
        let mut tx = self.pool.begin().await?;
        player::insert(&mut tx, &player).await?;
        tx.commit().await?;

        debug!("Created player {} ({})", player.display_name(), player.player_id);
        Ok(player)
    }

    async fn update_player(
        &self,
        player_id: Uuid,
        changes: PlayerChanges,
        actor: &Actor,
    ) -> Result<Player> {
        if let Some(Some(class_id)) = changes.lesson_class_id {
            self.ensure_class(class_id).await?;
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let current = player::lock_active(&mut tx, player_id).await?;
        let next = current.next_version(&changes, actor, now);
        versioning::close_version(
            &mut tx,
            VersionedTable::Players,
            current.version.version_id,
            actor,
            now,
        )
        .await?;
        player::insert(&mut tx, &next).await.map_err(stale_version)?;

        tx.commit().await?;
        Ok(next)
    }

    async fn deactivate_player(&self, player_id: Uuid, actor: &Actor) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        versioning::close_entity(&mut tx, VersionedTable::Players, player_id, actor, Utc::now())
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn lesson_classes(&self) -> Result<Vec<LessonClass>> {
        LessonClassRepository::new(&self.pool).list_active().await
    }

    async fn create_lesson_class(
        &self,
        class: NewLessonClass,
        actor: &Actor,
    ) -> Result<LessonClass> {
        let class = class.into_class(actor, Utc::now());
        let mut tx = self.pool.begin().await?;
        lesson_class::insert(&mut tx, &class).await?;
        tx.commit().await?;
        Ok(class)
    }

    async fn update_lesson_class(
        &self,
        class_id: Uuid,
        changes: LessonClassChanges,
        actor: &Actor,
    ) -> Result<LessonClass> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let current = lesson_class::lock_active(&mut tx, class_id).await?;
        let next = current.next_version(&changes, actor, now);
        versioning::close_version(
            &mut tx,
            VersionedTable::LessonClasses,
            current.version.version_id,
            actor,
            now,
        )
        .await?;
        lesson_class::insert(&mut tx, &next).await.map_err(stale_version)?;

        tx.commit().await?;
        Ok(next)
    }

    async fn deactivate_lesson_class(&self, class_id: Uuid, actor: &Actor) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        versioning::close_entity(
            &mut tx,
            VersionedTable::LessonClasses,
            class_id,
            actor,
            Utc::now(),
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn active_games_on(&self, date: NaiveDate) -> Result<Vec<Game>> {
        GameRepository::new(&self.pool).active_on(date).await
    }

    async fn active_game_at(&self, date: NaiveDate, board: Board) -> Result<Option<Game>> {
        GameRepository::new(&self.pool).active_at(date, board).await
    }

    async fn games_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Game>> {
        GameRepository::new(&self.pool).between(a, b).await
    }

    async fn board_history(&self, date: NaiveDate, board: Board) -> Result<Vec<Game>> {
        GameRepository::new(&self.pool).board_history(date, board).await
    }

    async fn games_on_board(&self, board: Board) -> Result<Vec<Game>> {
        GameRepository::new(&self.pool).active_on_board(board).await
    }

    async fn games_of_players(&self, player_ids: &[Uuid]) -> Result<Vec<Game>> {
        if player_ids.is_empty() {
            return Ok(Vec::new());
        }
        GameRepository::new(&self.pool).active_with_players(player_ids).await
    }

    async fn rated_games(&self, game_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if game_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rated = GameRepository::new(&self.pool).rated(game_ids).await?;
        Ok(rated.into_iter().collect())
    }

    async fn create_game(&self, game: NewGame, actor: &Actor) -> Result<Game> {
        let game = game.into_game(Uuid::new_v4(), actor, Utc::now());
        let mut tx = self.pool.begin().await?;
        game::insert(&mut tx, &game).await?;
        tx.commit().await?;
        Ok(game)
    }

    async fn apply_round(&self, changes: &RoundChanges, actor: &Actor) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for version_id in &changes.deactivated {
            versioning::close_version(&mut tx, VersionedTable::Games, *version_id, actor, now)
                .await?;
        }

        for replacement in &changes.updated {
            let game_id = versioning::close_version(
                &mut tx,
                VersionedTable::Games,
                replacement.previous,
                actor,
                now,
            )
            .await?;
            let next = replacement.next.clone().into_game(game_id, actor, now);
            game::insert(&mut tx, &next).await?;
        }

        for created in &changes.created {
            let game = created.clone().into_game(Uuid::new_v4(), actor, now);
            game::insert(&mut tx, &game).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply_ratings(
        &self,
        updates: &[RatingUpdate],
        rated: &[Uuid],
        actor: &Actor,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for game_id in rated {
            game::mark_rated(&mut tx, *game_id, actor).await?;
        }

        for update in updates {
            let now = Utc::now();
            let current = player::lock_active(&mut tx, update.player_id).await?;
            let changes = PlayerChanges::after_game(&current, update.new_rating, update.opponent);
            let next = current.next_version(&changes, actor, now);
            versioning::close_version(
                &mut tx,
                VersionedTable::Players,
                current.version.version_id,
                actor,
                now,
            )
            .await?;
            player::insert(&mut tx, &next).await.map_err(stale_version)?;
        }

        tx.commit().await?;
        Ok(())
    }
}
