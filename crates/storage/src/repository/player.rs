use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Player, PlayerName, VersionInfo};
use crate::store::seed_order;

const PLAYER_COLUMNS: &str = "version_id, player_id, first_name, last_name, rating, \
     beginning_rating, grade, lesson_class_id, active_member, is_volunteer, \
     parent_or_guardian, email, phone, additional_info, \
     opponent_one, opponent_two, opponent_three, \
     modified_by, is_active, created_at, end_at, closed_by";

#[derive(FromRow)]
struct PlayerRow {
    version_id: Uuid,
    player_id: Uuid,
    first_name: String,
    last_name: String,
    rating: i32,
    beginning_rating: Option<i32>,
    grade: Option<i32>,
    lesson_class_id: Option<Uuid>,
    active_member: bool,
    is_volunteer: bool,
    parent_or_guardian: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    additional_info: Option<String>,
    opponent_one: Option<Uuid>,
    opponent_two: Option<Uuid>,
    opponent_three: Option<Uuid>,
    modified_by: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    closed_by: Option<String>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            player_id: row.player_id,
            first_name: row.first_name,
            last_name: row.last_name,
            rating: row.rating,
            beginning_rating: row.beginning_rating,
            grade: row.grade,
            lesson_class_id: row.lesson_class_id,
            active_member: row.active_member,
            is_volunteer: row.is_volunteer,
            parent_or_guardian: row.parent_or_guardian,
            email: row.email,
            phone: row.phone,
            additional_info: row.additional_info,
            opponent_one: row.opponent_one,
            opponent_two: row.opponent_two,
            opponent_three: row.opponent_three,
            version: VersionInfo {
                version_id: row.version_id,
                modified_by: row.modified_by,
                is_active: row.is_active,
                created_at: row.created_at,
                end_at: row.end_at,
                closed_by: row.closed_by,
            },
        }
    }
}

pub struct PlayerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active players in seed order
    pub async fn list_active(&self) -> Result<Vec<Player>> {
        let query = format!("SELECT {} FROM players WHERE is_active", PLAYER_COLUMNS);
        let rows = sqlx::query_as::<_, PlayerRow>(&query)
            .fetch_all(self.pool)
            .await?;

        let mut players: Vec<Player> = rows.into_iter().map(Player::from).collect();
        players.sort_by(seed_order);
        Ok(players)
    }

    pub async fn find_active(&self, player_id: Uuid) -> Result<Player> {
        let query = format!(
            "SELECT {} FROM players WHERE player_id = $1 AND is_active",
            PLAYER_COLUMNS
        );
        let row = sqlx::query_as::<_, PlayerRow>(&query)
            .bind(player_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(row.into())
    }

    /// Oldest active player carrying exactly this name
    pub async fn find_active_by_name(&self, name: &PlayerName) -> Result<Option<Player>> {
        let query = format!(
            "SELECT {} FROM players \
             WHERE last_name = $1 AND first_name = $2 AND is_active \
             ORDER BY created_at \
             LIMIT 1",
            PLAYER_COLUMNS
        );
        let row = sqlx::query_as::<_, PlayerRow>(&query)
            .bind(name.last())
            .bind(name.first())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Player::from))
    }

    /// Every version of a player, oldest first
    pub async fn history(&self, player_id: Uuid) -> Result<Vec<Player>> {
        let query = format!(
            "SELECT {} FROM players WHERE player_id = $1 ORDER BY created_at",
            PLAYER_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlayerRow>(&query)
            .bind(player_id)
            .fetch_all(self.pool)
            .await?;

        if rows.is_empty() {
            return Err(StorageError::NotFound);
        }

        Ok(rows.into_iter().map(Player::from).collect())
    }
}

/// Active version of a player, locked until the transaction ends.
pub(crate) async fn lock_active(conn: &mut PgConnection, player_id: Uuid) -> Result<Player> {
    let query = format!(
        "SELECT {} FROM players WHERE player_id = $1 AND is_active FOR UPDATE",
        PLAYER_COLUMNS
    );
    let row = sqlx::query_as::<_, PlayerRow>(&query)
        .bind(player_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)?;

    Ok(row.into())
}

pub(crate) async fn insert(conn: &mut PgConnection, player: &Player) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO players (
            version_id, player_id, first_name, last_name, rating,
            beginning_rating, grade, lesson_class_id, active_member, is_volunteer,
            parent_or_guardian, email, phone, additional_info,
            opponent_one, opponent_two, opponent_three,
            modified_by, is_active, created_at, end_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21)
        "#,
    )
    .bind(player.version.version_id)
    .bind(player.player_id)
    .bind(&player.first_name)
    .bind(&player.last_name)
    .bind(player.rating)
    .bind(player.beginning_rating)
    .bind(player.grade)
    .bind(player.lesson_class_id)
    .bind(player.active_member)
    .bind(player.is_volunteer)
    .bind(&player.parent_or_guardian)
    .bind(&player.email)
    .bind(&player.phone)
    .bind(&player.additional_info)
    .bind(player.opponent_one)
    .bind(player.opponent_two)
    .bind(player.opponent_three)
    .bind(&player.version.modified_by)
    .bind(player.version.is_active)
    .bind(player.version.created_at)
    .bind(player.version.end_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
