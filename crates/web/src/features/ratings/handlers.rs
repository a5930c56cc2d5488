use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::ranking::RatingSheetRow;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/ratings",
    responses(
        (status = 200, description = "Club ratings sheet", body = Vec<RatingSheetRow>)
    ),
    tag = "ratings"
)]
pub async fn get_ratings(State(state): State<AppState>) -> Result<Response, WebError> {
    let rows = services::rating_sheet(state.store.as_ref()).await?;

    Ok(Json(rows).into_response())
}
