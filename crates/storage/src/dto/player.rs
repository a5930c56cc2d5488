use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::nullable;
use crate::models::{NewPlayer, Player, PlayerChanges};
use crate::services::rating::RATING_FLOOR;

fn default_true() -> bool {
    true
}

/// Request payload for enrolling a player or volunteer
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlayerRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "First name must be between 1 and 255 characters"
    ))]
    pub first_name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Last name must be between 1 and 255 characters"
    ))]
    pub last_name: String,

    /// Starting rating, 100 when omitted
    #[validate(range(min = 100, max = 3500))]
    pub rating: Option<i32>,

    #[validate(range(min = 100, max = 3500))]
    pub beginning_rating: Option<i32>,

    #[validate(range(min = 0, max = 12, message = "Grade must be between 0 and 12"))]
    pub grade: Option<i32>,

    pub lesson_class_id: Option<Uuid>,

    #[serde(default = "default_true")]
    pub active_member: bool,

    #[serde(default)]
    pub is_volunteer: bool,

    #[validate(length(max = 255))]
    pub parent_or_guardian: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    pub additional_info: Option<String>,
}

impl From<CreatePlayerRequest> for NewPlayer {
    fn from(req: CreatePlayerRequest) -> Self {
        let rating = req.rating.unwrap_or(RATING_FLOOR);
        NewPlayer {
            first_name: req.first_name,
            last_name: req.last_name,
            rating,
            beginning_rating: req.beginning_rating.or(Some(rating)),
            grade: req.grade,
            lesson_class_id: req.lesson_class_id,
            active_member: req.active_member,
            is_volunteer: req.is_volunteer,
            parent_or_guardian: req.parent_or_guardian,
            email: req.email,
            phone: req.phone,
            additional_info: req.additional_info,
        }
    }
}

/// Request payload for the next version of a player. Omitted fields keep
/// their current value; an explicit `null` clears an optional one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePlayerRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,

    #[validate(range(min = 100, max = 3500))]
    pub rating: Option<i32>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 100, max = 3500))]
    pub beginning_rating: Option<Option<i32>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 0, max = 12, message = "Grade must be between 0 and 12"))]
    pub grade: Option<Option<i32>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub lesson_class_id: Option<Option<Uuid>>,

    pub active_member: Option<bool>,

    pub is_volunteer: Option<bool>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 255))]
    pub parent_or_guardian: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[validate(email)]
    pub email: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub additional_info: Option<Option<String>>,
}

impl From<UpdatePlayerRequest> for PlayerChanges {
    fn from(req: UpdatePlayerRequest) -> Self {
        PlayerChanges {
            first_name: req.first_name,
            last_name: req.last_name,
            rating: req.rating,
            beginning_rating: req.beginning_rating,
            grade: req.grade,
            lesson_class_id: req.lesson_class_id,
            active_member: req.active_member,
            is_volunteer: req.is_volunteer,
            parent_or_guardian: req.parent_or_guardian,
            email: req.email,
            phone: req.phone,
            additional_info: req.additional_info,
            opponents: None,
        }
    }
}

/// Current state of a player
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerResponse {
    pub player_id: Uuid,
    #[schema(example = "Polgar, Judit")]
    pub name: String,
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
    pub recent_opponents: Vec<Uuid>,
    pub modified_by: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            name: player.display_name(),
            recent_opponents: player.recent_opponents().into_iter().flatten().collect(),
            player_id: player.player_id,
            first_name: player.first_name,
            last_name: player.last_name,
            rating: player.rating,
            beginning_rating: player.beginning_rating,
            grade: player.grade,
            lesson_class_id: player.lesson_class_id,
            active_member: player.active_member,
            is_volunteer: player.is_volunteer,
            parent_or_guardian: player.parent_or_guardian,
            email: player.email,
            phone: player.phone,
            additional_info: player.additional_info,
            modified_by: player.version.modified_by,
            updated_at: player.version.created_at,
        }
    }
}

/// One stored version of a player, as listed in their history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerVersionResponse {
    pub version_id: Uuid,
    pub rating: i32,
    pub grade: Option<i32>,
    pub lesson_class_id: Option<Uuid>,
    pub active_member: bool,
    pub opponent_one: Option<Uuid>,
    pub modified_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
}

impl From<Player> for PlayerVersionResponse {
    fn from(player: Player) -> Self {
        Self {
            version_id: player.version.version_id,
            rating: player.rating,
            grade: player.grade,
            lesson_class_id: player.lesson_class_id,
            active_member: player.active_member,
            opponent_one: player.opponent_one,
            modified_by: player.version.modified_by,
            is_active: player.version.is_active,
            created_at: player.version.created_at,
            end_at: player.version.end_at,
            closed_by: player.version.closed_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePlayerRequest {
        serde_json::from_str(r#"{"first_name": "Judit", "last_name": "Polgar"}"#).unwrap()
    }

    #[test]
    fn test_create_request_defaults() {
        let req = request();
        assert!(req.validate().is_ok());
        assert!(req.active_member);
        assert!(!req.is_volunteer);

        let player = NewPlayer::from(req);
        assert_eq!(player.rating, RATING_FLOOR);
        assert_eq!(player.beginning_rating, Some(RATING_FLOOR));
    }

    #[test]
    fn test_create_request_validation() {
        let mut req = request();
        req.grade = Some(14);
        assert!(req.validate().is_err());

        let mut req = request();
        req.email = Some("not an email".to_string());
        assert!(req.validate().is_err());

        let mut req = request();
        req.rating = Some(50);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_request_null_clears_and_missing_keeps() {
        let req: UpdatePlayerRequest =
            serde_json::from_str(r#"{"lesson_class_id": null, "grade": 6}"#).unwrap();
        assert!(req.validate().is_ok());

        let changes = PlayerChanges::from(req);
        assert_eq!(changes.lesson_class_id, Some(None));
        assert_eq!(changes.grade, Some(Some(6)));
        assert_eq!(changes.email, None);
        assert_eq!(changes.phone, None);
    }

    #[test]
    fn test_update_request_validates_present_values() {
        let req: UpdatePlayerRequest =
            serde_json::from_str(r#"{"email": "not an email"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdatePlayerRequest = serde_json::from_str(r#"{"grade": 14}"#).unwrap();
        assert!(req.validate().is_err());

        let req: UpdatePlayerRequest =
            serde_json::from_str(r#"{"email": null, "grade": null}"#).unwrap();
        assert!(req.validate().is_ok());
    }
}
