use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Actor, Versioned};

/// Append-only table of entity versions.
///
/// Rows are only ever pushed; the single mutation allowed on an existing row
/// is closing its validity window. At most one version per entity id is
/// active at a time.
#[derive(Debug, Clone)]
pub struct VersionedTable<T> {
    rows: Vec<T>,
}

impl<T> Default for VersionedTable<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: Versioned> VersionedTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the first version of a new entity.
    pub fn insert(&mut self, row: T) -> Result<T> {
        if self.current(row.entity_id()).is_some() {
            return Err(StorageError::ConstraintViolation(format!(
                "entity {} already has an active version",
                row.entity_id()
            )));
        }

        self.rows.push(row.clone());
        Ok(row)
    }

    /// Closes the current version of `entity_id` and appends `next` in its
    /// place.
    pub fn supersede(
        &mut self,
        entity_id: Uuid,
        next: T,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<T> {
        if next.entity_id() != entity_id {
            return Err(StorageError::ConstraintViolation(format!(
                "version for {} cannot supersede {}",
                next.entity_id(),
                entity_id
            )));
        }

        self.close(entity_id, actor, now)?;
        self.rows.push(next.clone());
        Ok(next)
    }

    /// Closes the current version of `entity_id` with no replacement.
    pub fn close(&mut self, entity_id: Uuid, actor: &Actor, now: DateTime<Utc>) -> Result<T> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.entity_id() == entity_id && row.is_active())
            .ok_or(StorageError::NotFound)?;

        row.version_mut().close(actor, now);
        Ok(row.clone())
    }

    /// Closes a specific version, failing if it is no longer the current one.
    pub fn close_version(
        &mut self,
        version_id: Uuid,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<T> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.version().version_id == version_id)
            .ok_or(StorageError::NotFound)?;

        if !row.is_active() {
            return Err(StorageError::ConstraintViolation(format!(
                "version {} was already superseded",
                version_id
            )));
        }

        row.version_mut().close(actor, now);
        Ok(row.clone())
    }

    pub fn current(&self, entity_id: Uuid) -> Option<&T> {
        self.rows
            .iter()
            .find(|row| row.entity_id() == entity_id && row.is_active())
    }

    pub fn active(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter(|row| row.is_active())
    }

    /// Every version of one entity, oldest first.
    pub fn history(&self, entity_id: Uuid) -> Vec<T> {
        let mut versions: Vec<T> = self
            .rows
            .iter()
            .filter(|row| row.entity_id() == entity_id)
            .cloned()
            .collect();
        versions.sort_by_key(|row| row.version().created_at);
        versions
    }

    pub fn all(&self) -> impl Iterator<Item = &T> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonClass, NewLessonClass};
    use chrono::Duration;

    fn class(name: &str) -> LessonClass {
        NewLessonClass {
            name: name.to_string(),
            teacher_id: Uuid::new_v4(),
            co_teacher_id: None,
        }
        .into_class(&Actor::new("import"), Utc::now())
    }

    #[test]
    fn test_supersede_keeps_lineage() {
        let mut table = VersionedTable::new();
        let first = table.insert(class("Pawns")).unwrap();

        let mut next = first.clone();
        next.name = "Knights".to_string();
        next.version = crate::models::VersionInfo::open(&Actor::new("director"), Utc::now());
        let later = Utc::now() + Duration::seconds(1);
        table
            .supersede(first.class_id, next, &Actor::new("director"), later)
            .unwrap();

        let current = table.current(first.class_id).unwrap();
        assert_eq!(current.name, "Knights");

        let history = table.history(first.class_id);
        assert_eq!(history.len(), 2);
        assert!(!history[0].version.is_active);
        assert_eq!(history[0].version.end_at, Some(later));
        assert_eq!(history[0].name, "Pawns");
        assert_eq!(history[0].version.closed_by.as_deref(), Some("director"));
        assert_eq!(table.active().count(), 1);
    }

    #[test]
    fn test_close_without_replacement() {
        let mut table = VersionedTable::new();
        let row = table.insert(class("Rooks")).unwrap();

        let actor = Actor::new("director");
        let closed = table.close(row.class_id, &actor, Utc::now()).unwrap();
        assert_eq!(closed.version.closed_by.as_deref(), Some("director"));
        assert!(table.current(row.class_id).is_none());
        assert_eq!(table.all().count(), 1);
        assert!(matches!(
            table.close(row.class_id, &actor, Utc::now()),
            Err(StorageError::NotFound)
        ));
    }

    #[test]
    fn test_stale_version_cannot_be_closed_twice() {
        let mut table = VersionedTable::new();
        let row = table.insert(class("Bishops")).unwrap();
        let actor = Actor::new("director");
        table.close_version(row.version.version_id, &actor, Utc::now()).unwrap();

        assert!(matches!(
            table.close_version(row.version.version_id, &actor, Utc::now()),
            Err(StorageError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_duplicate_active_insert_rejected() {
        let mut table = VersionedTable::new();
        let row = table.insert(class("Queens")).unwrap();
        assert!(table.insert(row).is_err());
    }
}
