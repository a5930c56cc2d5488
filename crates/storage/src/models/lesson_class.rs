use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::player::Player;
use super::version::{Actor, VersionInfo, Versioned};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LessonClass {
    pub class_id: Uuid,
    pub name: String,
    pub teacher_id: Uuid,
    pub co_teacher_id: Option<Uuid>,
    #[serde(flatten)]
    pub version: VersionInfo,
}

impl LessonClass {
    /// Teachers' first names, e.g. `"Anna & Boris"`.
    pub fn teachers_label(&self, players: &HashMap<Uuid, Player>) -> String {
        let first_name = |id: Uuid| {
            players
                .get(&id)
                .map(|p| p.first_name.clone())
                .unwrap_or_default()
        };

        match self.co_teacher_id {
            Some(co_teacher) => format!("{} & {}", first_name(self.teacher_id), first_name(co_teacher)),
            None => first_name(self.teacher_id),
        }
    }

    pub fn is_taught_by(&self, player_id: Uuid) -> bool {
        self.teacher_id == player_id || self.co_teacher_id == Some(player_id)
    }

    pub fn next_version(
        &self,
        changes: &LessonClassChanges,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> LessonClass {
        LessonClass {
            class_id: self.class_id,
            name: changes
                .name
                .as_deref()
                .map(|name| name.trim().to_string())
                .unwrap_or_else(|| self.name.clone()),
            teacher_id: changes.teacher_id.unwrap_or(self.teacher_id),
            co_teacher_id: changes.co_teacher_id.unwrap_or(self.co_teacher_id),
            version: VersionInfo::open(actor, now),
        }
    }
}

impl Versioned for LessonClass {
    fn entity_id(&self) -> Uuid {
        self.class_id
    }

    fn version(&self) -> &VersionInfo {
        &self.version
    }

    fn version_mut(&mut self) -> &mut VersionInfo {
        &mut self.version
    }
}

#[derive(Debug, Clone)]
pub struct NewLessonClass {
    pub name: String,
    pub teacher_id: Uuid,
    pub co_teacher_id: Option<Uuid>,
}

impl NewLessonClass {
    pub fn into_class(self, actor: &Actor, now: DateTime<Utc>) -> LessonClass {
        LessonClass {
            class_id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            teacher_id: self.teacher_id,
            co_teacher_id: self.co_teacher_id,
            version: VersionInfo::open(actor, now),
        }
    }
}

/// Deltas for the next version of a lesson class. `co_teacher_id` of
/// `Some(None)` removes the co-teacher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonClassChanges {
    pub name: Option<String>,
    pub teacher_id: Option<Uuid>,
    pub co_teacher_id: Option<Option<Uuid>>,
}
