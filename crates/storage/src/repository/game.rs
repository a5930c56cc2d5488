use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Actor, Board, Game, GameResult, VersionInfo};

const GAME_COLUMNS: &str = "version_id, game_id, date_of_match, week_number, \
     board_letter, board_number, white_id, black_id, result, \
     modified_by, is_active, created_at, end_at, closed_by";

#[derive(FromRow)]
struct GameRow {
    version_id: Uuid,
    game_id: Uuid,
    date_of_match: NaiveDate,
    week_number: Option<i32>,
    board_letter: String,
    board_number: i32,
    white_id: Option<Uuid>,
    black_id: Option<Uuid>,
    result: String,
    modified_by: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    closed_by: Option<String>,
}

impl TryFrom<GameRow> for Game {
    type Error = StorageError;

    fn try_from(row: GameRow) -> Result<Self> {
        let invalid = || {
            StorageError::InvalidBoard(format!("{}-{}", row.board_letter, row.board_number))
        };
        let letter = row.board_letter.chars().next().ok_or_else(invalid)?;
        let number = u16::try_from(row.board_number).map_err(|_| invalid())?;

        Ok(Game {
            game_id: row.game_id,
            date_of_match: row.date_of_match,
            week_number: row.week_number,
            board: Board::new(letter, number)?,
            white: row.white_id,
            black: row.black_id,
            result: row.result.trim().parse::<GameResult>()?,
            version: VersionInfo {
                version_id: row.version_id,
                modified_by: row.modified_by,
                is_active: row.is_active,
                created_at: row.created_at,
                end_at: row.end_at,
                closed_by: row.closed_by,
            },
        })
    }
}

fn into_games(rows: Vec<GameRow>) -> Result<Vec<Game>> {
    rows.into_iter().map(Game::try_from).collect()
}

pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_on(&self, date: NaiveDate) -> Result<Vec<Game>> {
        let query = format!(
            "SELECT {} FROM games WHERE date_of_match = $1 AND is_active \
             ORDER BY board_letter, board_number",
            GAME_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameRow>(&query)
            .bind(date)
            .fetch_all(self.pool)
            .await?;

        into_games(rows)
    }

    pub async fn active_at(&self, date: NaiveDate, board: Board) -> Result<Option<Game>> {
        let query = format!(
            "SELECT {} FROM games \
             WHERE date_of_match = $1 AND board_letter = $2 AND board_number = $3 AND is_active",
            GAME_COLUMNS
        );
        let row = sqlx::query_as::<_, GameRow>(&query)
            .bind(date)
            .bind(board.letter().to_string())
            .bind(i32::from(board.number()))
            .fetch_optional(self.pool)
            .await?;

        row.map(Game::try_from).transpose()
    }

    /// Active games between two players, newest first
    pub async fn between(&self, a: Uuid, b: Uuid) -> Result<Vec<Game>> {
        let query = format!(
            "SELECT {} FROM games \
             WHERE is_active \
               AND ((white_id = $1 AND black_id = $2) OR (white_id = $2 AND black_id = $1)) \
             ORDER BY date_of_match DESC, created_at DESC",
            GAME_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameRow>(&query)
            .bind(a)
            .bind(b)
            .fetch_all(self.pool)
            .await?;

        into_games(rows)
    }

    /// Every version ever written for one board and date, oldest first
    pub async fn board_history(&self, date: NaiveDate, board: Board) -> Result<Vec<Game>> {
        let query = format!(
            "SELECT {} FROM games \
             WHERE date_of_match = $1 AND board_letter = $2 AND board_number = $3 \
             ORDER BY created_at",
            GAME_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameRow>(&query)
            .bind(date)
            .bind(board.letter().to_string())
            .bind(i32::from(board.number()))
            .fetch_all(self.pool)
            .await?;

        into_games(rows)
    }

    /// Active games on one board across every date, newest first
    pub async fn active_on_board(&self, board: Board) -> Result<Vec<Game>> {
        let query = format!(
            "SELECT {} FROM games \
             WHERE board_letter = $1 AND board_number = $2 AND is_active \
             ORDER BY date_of_match DESC, created_at DESC",
            GAME_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameRow>(&query)
            .bind(board.letter().to_string())
            .bind(i32::from(board.number()))
            .fetch_all(self.pool)
            .await?;

        into_games(rows)
    }

    /// Active games with any of the players in either seat, newest first
    pub async fn active_with_players(&self, player_ids: &[Uuid]) -> Result<Vec<Game>> {
        let query = format!(
            "SELECT {} FROM games \
             WHERE is_active AND (white_id = ANY($1) OR black_id = ANY($1)) \
             ORDER BY date_of_match DESC, created_at DESC",
            GAME_COLUMNS
        );
        let rows = sqlx::query_as::<_, GameRow>(&query)
            .bind(player_ids)
            .fetch_all(self.pool)
            .await?;

        into_games(rows)
    }

    /// The games among `game_ids` already recorded as rated
    pub async fn rated(&self, game_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let rated = sqlx::query_scalar::<_, Uuid>(
            "SELECT game_id FROM rated_games WHERE game_id = ANY($1)",
        )
        .bind(game_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rated)
    }
}

/// Records that a game's result has moved ratings. A game recorded twice is
/// a conflict.
pub(crate) async fn mark_rated(conn: &mut PgConnection, game_id: Uuid, actor: &Actor) -> Result<()> {
    let result = sqlx::query("INSERT INTO rated_games (game_id, rated_by) VALUES ($1, $2)")
        .bind(game_id)
        .bind(actor.as_str())
        .execute(&mut *conn)
        .await;

    match result.map_err(StorageError::from) {
        Ok(_) => Ok(()),
        Err(e) if e.is_unique_violation() => Err(StorageError::ConstraintViolation(format!(
            "game {} was already rated",
            game_id
        ))),
        Err(e) => Err(e),
    }
}

/// Inserts a game version. A second active game on the same board and date
/// is reported as `DuplicateBoard`.
pub(crate) async fn insert(conn: &mut PgConnection, game: &Game) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO games (
            version_id, game_id, date_of_match, week_number,
            board_letter, board_number, white_id, black_id, result,
            modified_by, is_active, created_at, end_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(game.version.version_id)
    .bind(game.game_id)
    .bind(game.date_of_match)
    .bind(game.week_number)
    .bind(game.board.letter().to_string())
    .bind(i32::from(game.board.number()))
    .bind(game.white)
    .bind(game.black)
    .bind(game.result.code())
    .bind(&game.version.modified_by)
    .bind(game.version.is_active)
    .bind(game.version.created_at)
    .bind(game.version.end_at)
    .execute(&mut *conn)
    .await;

    match result.map_err(StorageError::from) {
        Ok(_) => Ok(()),
        Err(e) if e.is_unique_violation() => Err(StorageError::DuplicateBoard {
            date: game.date_of_match,
            board: game.board,
        }),
        Err(e) => Err(e),
    }
}
