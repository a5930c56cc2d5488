use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{LessonClass, VersionInfo};

const LESSON_CLASS_COLUMNS: &str = "version_id, class_id, name, teacher_id, co_teacher_id, \
     modified_by, is_active, created_at, end_at, closed_by";

#[derive(FromRow)]
struct LessonClassRow {
    version_id: Uuid,
    class_id: Uuid,
    name: String,
    teacher_id: Uuid,
    co_teacher_id: Option<Uuid>,
    modified_by: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    closed_by: Option<String>,
}

impl From<LessonClassRow> for LessonClass {
    fn from(row: LessonClassRow) -> Self {
        LessonClass {
            class_id: row.class_id,
            name: row.name,
            teacher_id: row.teacher_id,
            co_teacher_id: row.co_teacher_id,
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

pub struct LessonClassRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LessonClassRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(&self) -> Result<Vec<LessonClass>> {
        let query = format!(
            "SELECT {} FROM lesson_classes WHERE is_active ORDER BY name",
            LESSON_CLASS_COLUMNS
        );
        let rows = sqlx::query_as::<_, LessonClassRow>(&query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(LessonClass::from).collect())
    }

    pub async fn exists(&self, class_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM lesson_classes WHERE class_id = $1 AND is_active)",
        )
        .bind(class_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}

/// Active version of a lesson class, locked until the transaction ends.
pub(crate) async fn lock_active(conn: &mut PgConnection, class_id: Uuid) -> Result<LessonClass> {
    let query = format!(
        "SELECT {} FROM lesson_classes WHERE class_id = $1 AND is_active FOR UPDATE",
        LESSON_CLASS_COLUMNS
    );
    let row = sqlx::query_as::<_, LessonClassRow>(&query)
        .bind(class_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)?;

    Ok(row.into())
}

pub(crate) async fn insert(conn: &mut PgConnection, class: &LessonClass) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO lesson_classes (
            version_id, class_id, name, teacher_id, co_teacher_id,
            modified_by, is_active, created_at, end_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(class.version.version_id)
    .bind(class.class_id)
    .bind(&class.name)
    .bind(class.teacher_id)
    .bind(class.co_teacher_id)
    .bind(&class.version.modified_by)
    .bind(class.version.is_active)
    .bind(class.version.created_at)
    .bind(class.version.end_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
