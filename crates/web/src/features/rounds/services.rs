use std::collections::HashMap;

use chrono::NaiveDate;
use storage::{
    ClubStore,
    dto::round::{GameVersionResponse, RoundGameResponse, RoundSubmission, SettlementReport},
    error::{Result, StorageError},
    models::{Actor, Board},
    services::settlement,
};
use uuid::Uuid;

async fn player_names(store: &dyn ClubStore) -> Result<HashMap<Uuid, String>> {
    Ok(store
        .active_players()
        .await?
        .into_iter()
        .map(|p| (p.player_id, p.display_name()))
        .collect())
}

/// Active games of one date, board by board, with player names
pub async fn list_round(store: &dyn ClubStore, date: NaiveDate) -> Result<Vec<RoundGameResponse>> {
    let games = store.active_games_on(date).await?;
    let names = player_names(store).await?;

    Ok(games
        .iter()
        .map(|game| RoundGameResponse::from_game(game, |id| names.get(&id).cloned()))
        .collect())
}

/// The game currently on one board of a date
pub async fn get_board(
    store: &dyn ClubStore,
    date: NaiveDate,
    board: Board,
) -> Result<RoundGameResponse> {
    let game = store
        .active_game_at(date, board)
        .await?
        .ok_or(StorageError::NotFound)?;
    let names = player_names(store).await?;

    Ok(RoundGameResponse::from_game(&game, |id| names.get(&id).cloned()))
}

/// Every version written for one board of a date, oldest first
pub async fn board_history(
    store: &dyn ClubStore,
    date: NaiveDate,
    board: Board,
) -> Result<Vec<GameVersionResponse>> {
    let versions = store.board_history(date, board).await?;
    if versions.is_empty() {
        return Err(StorageError::NotFound);
    }
    let names = player_names(store).await?;

    Ok(versions
        .iter()
        .map(|game| GameVersionResponse::from_game(game, |id| names.get(&id).cloned()))
        .collect())
}

pub async fn settle_round(
    store: &dyn ClubStore,
    submission: &RoundSubmission,
    actor: &Actor,
) -> Result<SettlementReport> {
    settlement::settle_round(store, submission, actor).await
}
