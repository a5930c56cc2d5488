use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::dto::search::{SearchQuery, SearchResults};

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Players, classes and games matching the query", body = SearchResults),
        (status = 400, description = "Empty query or malformed board")
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, WebError> {
    query.validate().map_err(WebError::BadRequest)?;

    let results = services::search(state.store.as_ref(), &query).await?;

    Ok(Json(results).into_response())
}
