use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Actor;

/// Tables following the close-and-insert versioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VersionedTable {
    Players,
    LessonClasses,
    Games,
}

impl VersionedTable {
    fn name(self) -> &'static str {
        match self {
            Self::Players => "players",
            Self::LessonClasses => "lesson_classes",
            Self::Games => "games",
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Self::Players => "player_id",
            Self::LessonClasses => "class_id",
            Self::Games => "game_id",
        }
    }
}

/// Closes one specific version and returns the stable id it belonged to.
/// Fails when that version is no longer active, which means someone else
/// superseded it first.
pub(crate) async fn close_version(
    conn: &mut PgConnection,
    table: VersionedTable,
    version_id: Uuid,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<Uuid> {
    let query = format!(
        "UPDATE {} SET is_active = FALSE, end_at = $2, closed_by = $3 \
         WHERE version_id = $1 AND is_active \
         RETURNING {}",
        table.name(),
        table.id_column()
    );

    sqlx::query_scalar::<_, Uuid>(&query)
        .bind(version_id)
        .bind(now)
        .bind(actor.as_str())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            StorageError::ConstraintViolation(format!(
                "version {} in {} is no longer active",
                version_id,
                table.name()
            ))
        })
}

/// Closes the active version of an entity with no replacement.
pub(crate) async fn close_entity(
    conn: &mut PgConnection,
    table: VersionedTable,
    entity_id: Uuid,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<()> {
    let query = format!(
        "UPDATE {} SET is_active = FALSE, end_at = $2, closed_by = $3 \
         WHERE {} = $1 AND is_active",
        table.name(),
        table.id_column()
    );

    let result = sqlx::query(&query)
        .bind(entity_id)
        .bind(now)
        .bind(actor.as_str())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound);
    }

    Ok(())
}
