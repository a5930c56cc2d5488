use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_board, get_board_history, get_round, settle_round};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:date", get(get_round))
        .route("/:date/boards/:board", get(get_board))
        .route("/:date/boards/:board/history", get(get_board_history))
        .route("/:date/settle", post(settle_round))
}
