use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use storage::dto::round::{
    GameVersionResponse, RoundGameResponse, RoundSubmission, SettlementReport,
};
use storage::models::Board;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::actor::ActingUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rounds/{date}",
    params(
        ("date" = NaiveDate, Path, description = "Date of the round, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Active games of the round", body = Vec<RoundGameResponse>)
    ),
    tag = "rounds"
)]
pub async fn get_round(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Result<Response, WebError> {
    let games = services::list_round(state.store.as_ref(), date).await?;

    Ok(Json(games).into_response())
}

#[utoipa::path(
    get,
    path = "/api/rounds/{date}/boards/{board}",
    params(
        ("date" = NaiveDate, Path, description = "Date of the round, YYYY-MM-DD"),
        ("board" = String, Path, description = "Board such as G-3, G3 or 3G")
    ),
    responses(
        (status = 200, description = "Active game on the board", body = RoundGameResponse),
        (status = 400, description = "Malformed board"),
        (status = 404, description = "No game on this board")
    ),
    tag = "rounds"
)]
pub async fn get_board(
    State(state): State<AppState>,
    Path((date, board)): Path<(NaiveDate, String)>,
) -> Result<Response, WebError> {
    let board: Board = board.parse()?;
    let game = services::get_board(state.store.as_ref(), date, board).await?;

    Ok(Json(game).into_response())
}

#[utoipa::path(
    get,
    path = "/api/rounds/{date}/boards/{board}/history",
    params(
        ("date" = NaiveDate, Path, description = "Date of the round, YYYY-MM-DD"),
        ("board" = String, Path, description = "Board such as G-3, G3 or 3G")
    ),
    responses(
        (status = 200, description = "All versions of the board's game, oldest first", body = Vec<GameVersionResponse>),
        (status = 400, description = "Malformed board"),
        (status = 404, description = "Nothing was ever recorded on this board")
    ),
    tag = "rounds"
)]
pub async fn get_board_history(
    State(state): State<AppState>,
    Path((date, board)): Path<(NaiveDate, String)>,
) -> Result<Response, WebError> {
    let board: Board = board.parse()?;
    let versions = services::board_history(state.store.as_ref(), date, board).await?;

    Ok(Json(versions).into_response())
}

#[utoipa::path(
    post,
    path = "/api/rounds/{date}/settle",
    params(
        ("date" = NaiveDate, Path, description = "Date of the round, YYYY-MM-DD"),
        ("X-Actor" = String, Header, description = "User recorded as modified_by")
    ),
    request_body = RoundSubmission,
    responses(
        (status = 200, description = "Round settled; boards with unknown players are listed under errors", body = SettlementReport),
        (status = 400, description = "Malformed submission"),
        (status = 409, description = "A board was taken concurrently")
    ),
    tag = "rounds"
)]
pub async fn settle_round(
    State(state): State<AppState>,
    ActingUser(actor): ActingUser,
    Path(date): Path<NaiveDate>,
    Json(submission): Json<RoundSubmission>,
) -> Result<Response, WebError> {
    submission.validate()?;

    if submission.date != date {
        return Err(WebError::BadRequest(format!(
            "submission is for {} but was posted to {}",
            submission.date, date
        )));
    }

    let report = services::settle_round(state.store.as_ref(), &submission, &actor).await?;

    Ok(Json(report).into_response())
}
