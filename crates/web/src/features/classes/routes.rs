use axum::{
    Router,
    routing::{get, put},
};

use super::handlers::{create_class, deactivate_class, list_classes, update_class};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/:id", put(update_class).delete(deactivate_class))
}
