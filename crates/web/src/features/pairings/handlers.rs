use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::pairing::{PairingRequest, PairingResponse};
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/pairings",
    request_body = PairingRequest,
    responses(
        (status = 200, description = "Proposed pairings and the players left unpaired", body = PairingResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "pairings"
)]
pub async fn propose_pairings(
    State(state): State<AppState>,
    Json(request): Json<PairingRequest>,
) -> Result<Response, WebError> {
    request.validate()?;

    let response =
        services::propose_pairings(state.store.as_ref(), &request, &state.pairing).await?;

    Ok(Json(response).into_response())
}
