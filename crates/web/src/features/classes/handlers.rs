use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::lesson_class::{
    CreateLessonClassRequest, LessonClassResponse, UpdateLessonClassRequest,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::ActingUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "Active lesson classes", body = Vec<LessonClassResponse>)
    ),
    tag = "classes"
)]
pub async fn list_classes(State(state): State<AppState>) -> Result<Response, WebError> {
    let classes = services::list_classes(state.store.as_ref()).await?;

    Ok(Json(classes).into_response())
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateLessonClassRequest,
    params(
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    responses(
        (status = 201, description = "Lesson class created", body = LessonClassResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Unknown teacher")
    ),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<CreateLessonClassRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let class = services::create_class(state.store.as_ref(), req.into(), &actor).await?;

    Ok((StatusCode::CREATED, Json(class)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Stable class id"),
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    request_body = UpdateLessonClassRequest,
    responses(
        (status = 200, description = "New version written", body = LessonClassResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No active class with this id"),
        (status = 409, description = "Unknown teacher or concurrent change")
    ),
    tag = "classes"
)]
pub async fn update_class(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLessonClassRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let class = services::update_class(state.store.as_ref(), id, req.into(), &actor).await?;

    Ok(Json(class).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Stable class id"),
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    responses(
        (status = 204, description = "Class deactivated"),
        (status = 404, description = "No active class with this id"),
        (status = 409, description = "Players are still enrolled")
    ),
    tag = "classes"
)]
pub async fn deactivate_class(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::deactivate_class(state.store.as_ref(), id, &actor).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
