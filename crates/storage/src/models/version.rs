use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The user recorded as `modified_by` on every version a mutation writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validity window of one stored version of an entity.
///
/// A version is current while `is_active` is set and `end_at` is empty.
/// Superseding or closing a version sets both and records who closed it in
/// `closed_by`, after which the row is never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VersionInfo {
    pub version_id: Uuid,
    pub modified_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
}

impl VersionInfo {
    pub fn open(actor: &Actor, now: DateTime<Utc>) -> Self {
        Self {
            version_id: Uuid::new_v4(),
            modified_by: actor.as_str().to_string(),
            is_active: true,
            created_at: now,
            end_at: None,
            closed_by: None,
        }
    }

    pub fn close(&mut self, actor: &Actor, now: DateTime<Utc>) {
        self.is_active = false;
        self.end_at = Some(now);
        self.closed_by = Some(actor.as_str().to_string());
    }
}

/// An entity stored as a chain of versions sharing one stable id.
pub trait Versioned: Clone {
    fn entity_id(&self) -> Uuid;

    fn version(&self) -> &VersionInfo;

    fn version_mut(&mut self) -> &mut VersionInfo;

    fn is_active(&self) -> bool {
        self.version().is_active
    }
}
