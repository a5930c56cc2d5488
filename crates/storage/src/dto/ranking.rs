use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One line of the club ratings sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RatingSheetRow {
    pub player_id: Uuid,
    #[schema(example = "Polgar, Judit")]
    pub name: String,
    pub grade: Option<i32>,
    pub rating: i32,
    pub lesson_class: Option<String>,
    /// Points gained since `beginning_rating`; unset when no baseline is on
    /// file.
    pub improvement: Option<i32>,
}
