use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::nullable;
use crate::models::{LessonClass, LessonClassChanges, NewLessonClass};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLessonClassRequest {
    #[validate(length(min = 1, max = 255, message = "Class name is required"))]
    pub name: String,
    pub teacher_id: Uuid,
    pub co_teacher_id: Option<Uuid>,
}

impl From<CreateLessonClassRequest> for NewLessonClass {
    fn from(req: CreateLessonClassRequest) -> Self {
        NewLessonClass {
            name: req.name,
            teacher_id: req.teacher_id,
            co_teacher_id: req.co_teacher_id,
        }
    }
}

/// Request payload for the next version of a lesson class. Omitted fields
/// keep their current value; `co_teacher_id: null` removes the co-teacher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateLessonClassRequest {
    #[validate(length(min = 1, max = 255, message = "Class name is required"))]
    pub name: Option<String>,
    pub teacher_id: Option<Uuid>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub co_teacher_id: Option<Option<Uuid>>,
}

impl From<UpdateLessonClassRequest> for LessonClassChanges {
    fn from(req: UpdateLessonClassRequest) -> Self {
        LessonClassChanges {
            name: req.name,
            teacher_id: req.teacher_id,
            co_teacher_id: req.co_teacher_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonClassResponse {
    pub class_id: Uuid,
    pub name: String,
    pub teacher_id: Uuid,
    pub co_teacher_id: Option<Uuid>,
    #[schema(example = "Anna & Boris")]
    pub teachers: String,
}

impl LessonClassResponse {
    pub fn new(class: LessonClass, teachers: String) -> Self {
        Self {
            class_id: class.class_id,
            name: class.name,
            teacher_id: class.teacher_id,
            co_teacher_id: class.co_teacher_id,
            teachers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_removes_co_teacher_on_null() {
        let req: UpdateLessonClassRequest =
            serde_json::from_str(r#"{"co_teacher_id": null}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(LessonClassChanges::from(req).co_teacher_id, Some(None));

        let req: UpdateLessonClassRequest = serde_json::from_str(r#"{"name": "Rooks"}"#).unwrap();
        let changes = LessonClassChanges::from(req);
        assert_eq!(changes.name.as_deref(), Some("Rooks"));
        assert_eq!(changes.co_teacher_id, None);

        let req: UpdateLessonClassRequest = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
