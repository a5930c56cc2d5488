use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::player_name::PlayerName;
use super::version::{Actor, VersionInfo, Versioned};
use crate::services::rating::RATING_FLOOR;

/// One version of a club member's record.
///
/// `player_id` is stable across versions; `opponent_one` is the most recent
/// opponent, `opponent_three` the oldest one still remembered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    pub player_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub rating: i32,
    pub beginning_rating: Option<i32>,
    pub grade: Option<i32>,
    pub lesson_class_id: Option<Uuid>,
    pub active_member: bool,
    pub is_volunteer: bool,
    pub parent_or_guardian: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub additional_info: Option<String>,
    pub opponent_one: Option<Uuid>,
    pub opponent_two: Option<Uuid>,
    pub opponent_three: Option<Uuid>,
    #[serde(flatten)]
    pub version: VersionInfo,
}

impl Player {
    pub fn name(&self) -> PlayerName {
        PlayerName::new(&self.last_name, &self.first_name)
    }

    pub fn display_name(&self) -> String {
        self.name().to_string()
    }

    pub fn recent_opponents(&self) -> [Option<Uuid>; 3] {
        [self.opponent_one, self.opponent_two, self.opponent_three]
    }

    pub fn has_recently_played(&self, other: Uuid) -> bool {
        self.recent_opponents().contains(&Some(other))
    }

    /// Enrolled, non-volunteer members are the only ones paired and rated.
    pub fn is_competitor(&self) -> bool {
        self.active_member && !self.is_volunteer
    }

    /// Builds the content of the next version, keeping identity and every
    /// field the changes leave untouched.
    pub fn next_version(&self, changes: &PlayerChanges, actor: &Actor, now: DateTime<Utc>) -> Player {
        let [opponent_one, opponent_two, opponent_three] =
            changes.opponents.unwrap_or(self.recent_opponents());

        Player {
            player_id: self.player_id,
            first_name: changes.first_name.clone().unwrap_or_else(|| self.first_name.clone()),
            last_name: changes.last_name.clone().unwrap_or_else(|| self.last_name.clone()),
            rating: changes.rating.unwrap_or(self.rating).max(RATING_FLOOR),
            beginning_rating: pick(&changes.beginning_rating, &self.beginning_rating),
            grade: pick(&changes.grade, &self.grade),
            lesson_class_id: pick(&changes.lesson_class_id, &self.lesson_class_id),
            active_member: changes.active_member.unwrap_or(self.active_member),
            is_volunteer: changes.is_volunteer.unwrap_or(self.is_volunteer),
            parent_or_guardian: pick(&changes.parent_or_guardian, &self.parent_or_guardian),
            email: pick(&changes.email, &self.email),
            phone: pick(&changes.phone, &self.phone),
            additional_info: pick(&changes.additional_info, &self.additional_info),
            opponent_one,
            opponent_two,
            opponent_three,
            version: VersionInfo::open(actor, now),
        }
    }
}

fn pick<T: Clone>(change: &Option<Option<T>>, current: &Option<T>) -> Option<T> {
    match change {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

impl Versioned for Player {
    fn entity_id(&self) -> Uuid {
        self.player_id
    }

    fn version(&self) -> &VersionInfo {
        &self.version
    }

    fn version_mut(&mut self) -> &mut VersionInfo {
        &mut self.version
    }
}

/// Field values for a brand new player.
#[derive(Debug, Clone, Default)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub rating: i32,
    pub beginning_rating: Option<i32>,
    pub grade: Option<i32>,
    pub lesson_class_id: Option<Uuid>,
    pub active_member: bool,
    pub is_volunteer: bool,
    pub parent_or_guardian: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub additional_info: Option<String>,
}

impl NewPlayer {
    pub fn into_player(self, actor: &Actor, now: DateTime<Utc>) -> Player {
        Player {
            player_id: Uuid::new_v4(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            rating: self.rating.max(RATING_FLOOR),
            beginning_rating: self.beginning_rating,
            grade: self.grade,
            lesson_class_id: self.lesson_class_id,
            active_member: self.active_member,
            is_volunteer: self.is_volunteer,
            parent_or_guardian: self.parent_or_guardian,
            email: self.email,
            phone: self.phone,
            additional_info: self.additional_info,
            opponent_one: None,
            opponent_two: None,
            opponent_three: None,
            version: VersionInfo::open(actor, now),
        }
    }
}

/// Deltas for the next version of a player. `None` keeps the current value;
/// on the optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub rating: Option<i32>,
    pub beginning_rating: Option<Option<i32>>,
    pub grade: Option<Option<i32>>,
    pub lesson_class_id: Option<Option<Uuid>>,
    pub active_member: Option<bool>,
    pub is_volunteer: Option<bool>,
    pub parent_or_guardian: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub additional_info: Option<Option<String>>,
    pub opponents: Option<[Option<Uuid>; 3]>,
}

impl PlayerChanges {
    /// New rating after a game against `opponent`, with the opponent pushed
    /// to the front of the history and the oldest one dropped.
    pub fn after_game(player: &Player, new_rating: i32, opponent: Uuid) -> Self {
        Self {
            rating: Some(new_rating),
            opponents: Some([Some(opponent), player.opponent_one, player.opponent_two]),
            ..Self::default()
        }
    }
}
