use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use storage::dto::round::{BoardSubmission, RoundSubmission};

pub const FORMAT_VERSION: &str = "1.0.0";

fn default_true() -> bool {
    true
}

/// Volunteers, lesson classes and players, imported in that order so classes
/// can find their teachers and players their class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFile {
    pub format_version: String,
    #[serde(default)]
    pub volunteers: Vec<PlayerRecord>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beginning_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    /// First name of the class teacher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_class: Option<String>,
    #[serde(default = "default_true")]
    pub active_member: bool,
    #[serde(default)]
    pub is_volunteer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_or_guardian: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

impl PlayerRecord {
    pub fn label(&self) -> String {
        format!("{}, {}", self.last_name.trim(), self.first_name.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    /// Teacher's first name
    pub teacher: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_teacher: Option<String>,
}

/// Results of one date as written on the round sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFile {
    pub format_version: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<i32>,
    pub boards: Vec<BoardSubmission>,
    #[serde(default)]
    pub separate_classes: bool,
}

impl From<RoundFile> for RoundSubmission {
    fn from(file: RoundFile) -> Self {
        RoundSubmission {
            date: file.date,
            week_number: file.week_number,
            boards: file.boards,
            separate_classes: file.separate_classes,
        }
    }
}
