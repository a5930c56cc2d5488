use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::player::{
    CreatePlayerRequest, PlayerResponse, PlayerVersionResponse, UpdatePlayerRequest,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::ActingUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/players",
    responses(
        (status = 200, description = "Active players in seed order", body = Vec<PlayerResponse>)
    ),
    tag = "players"
)]
pub async fn list_players(State(state): State<AppState>) -> Result<Response, WebError> {
    let players = services::list_players(state.store.as_ref()).await?;

    let response: Vec<PlayerResponse> = players.into_iter().map(PlayerResponse::from).collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Stable player id")
    ),
    responses(
        (status = 200, description = "Player found", body = PlayerResponse),
        (status = 404, description = "No active player with this id")
    ),
    tag = "players"
)]
pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let player = services::get_player(state.store.as_ref(), id).await?;

    Ok(Json(PlayerResponse::from(player)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/players/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Stable player id")
    ),
    responses(
        (status = 200, description = "All versions of the player, oldest first", body = Vec<PlayerVersionResponse>),
        (status = 404, description = "Unknown player")
    ),
    tag = "players"
)]
pub async fn get_player_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let versions = services::player_history(state.store.as_ref(), id).await?;

    let response: Vec<PlayerVersionResponse> = versions
        .into_iter()
        .map(PlayerVersionResponse::from)
        .collect();

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/players",
    request_body = CreatePlayerRequest,
    params(
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    responses(
        (status = 201, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Unknown lesson class")
    ),
    tag = "players"
)]
pub async fn create_player(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player = services::create_player(state.store.as_ref(), req.into(), &actor).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(player))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Stable player id"),
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "New version written", body = PlayerResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "No active player with this id"),
        (status = 409, description = "Player was changed concurrently")
    ),
    tag = "players"
)]
pub async fn update_player(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePlayerRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let player = services::update_player(state.store.as_ref(), id, req.into(), &actor).await?;

    Ok(Json(PlayerResponse::from(player)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    params(
        ("id" = Uuid, Path, description = "Stable player id"),
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    responses(
        (status = 204, description = "Player deactivated"),
        (status = 404, description = "No active player with this id")
    ),
    tag = "players"
)]
pub async fn deactivate_player(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::deactivate_player(state.store.as_ref(), id, &actor).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
