use axum::{Router, routing::get};

use super::handlers::search;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(search))
}
