use axum::{Router, routing::post};

use super::handlers::propose_pairings;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(propose_pairings))
}
