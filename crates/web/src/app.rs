use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{classes, pairings, players, ratings, rounds, search};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        players::handlers::list_players,
        players::handlers::get_player,
        players::handlers::get_player_history,
        players::handlers::create_player,
        players::handlers::update_player,
        players::handlers::deactivate_player,
        classes::handlers::list_classes,
        classes::handlers::create_class,
        classes::handlers::update_class,
        classes::handlers::deactivate_class,
        rounds::handlers::get_round,
        rounds::handlers::get_board,
        rounds::handlers::get_board_history,
        rounds::handlers::settle_round,
        pairings::handlers::propose_pairings,
        ratings::handlers::get_ratings,
        search::handlers::search,
    ),
    components(
        schemas(
            storage::dto::player::CreatePlayerRequest,
            storage::dto::player::UpdatePlayerRequest,
            storage::dto::player::PlayerResponse,
            storage::dto::player::PlayerVersionResponse,
            storage::dto::lesson_class::CreateLessonClassRequest,
            storage::dto::lesson_class::UpdateLessonClassRequest,
            storage::dto::lesson_class::LessonClassResponse,
            storage::dto::round::BoardSubmission,
            storage::dto::round::RoundSubmission,
            storage::dto::round::RoundGameResponse,
            storage::dto::round::GameVersionResponse,
            storage::dto::round::SettlementReport,
            storage::dto::round::RatingChange,
            storage::dto::round::BoardError,
            storage::dto::pairing::PairingRequest,
            storage::dto::pairing::PairingResponse,
            storage::dto::pairing::PairingEntry,
            storage::dto::ranking::RatingSheetRow,
            storage::dto::search::SearchKind,
            storage::dto::search::SearchResults,
        )
    ),
    tags(
        (name = "players", description = "Club roster"),
        (name = "classes", description = "Lesson classes"),
        (name = "rounds", description = "Round results and settlement"),
        (name = "pairings", description = "Board pairings for the next round"),
        (name = "ratings", description = "Club ratings sheet"),
        (name = "search", description = "Lookup by board or name"),
    )
)]
pub struct ApiDoc;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/players", players::routes::routes())
        .nest("/classes", classes::routes::routes())
        .nest("/rounds", rounds::routes::routes())
        .nest("/pairings", pairings::routes::routes())
        .nest("/ratings", ratings::routes::routes())
        .nest("/search", search::routes::routes());

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
