use storage::{
    ClubStore,
    error::Result,
    models::{Actor, NewPlayer, Player, PlayerChanges},
};
use uuid::Uuid;

/// Active players in seed order
pub async fn list_players(store: &dyn ClubStore) -> Result<Vec<Player>> {
    store.active_players().await
}

pub async fn get_player(store: &dyn ClubStore, player_id: Uuid) -> Result<Player> {
    store.find_player(player_id).await
}

/// Every stored version of a player, oldest first
pub async fn player_history(store: &dyn ClubStore, player_id: Uuid) -> Result<Vec<Player>> {
    store.player_history(player_id).await
}

pub async fn create_player(
    store: &dyn ClubStore,
    player: NewPlayer,
    actor: &Actor,
) -> Result<Player> {
    store.create_player(player, actor).await
}

/// Writes the next version of a player
pub async fn update_player(
    store: &dyn ClubStore,
    player_id: Uuid,
    changes: PlayerChanges,
    actor: &Actor,
) -> Result<Player> {
    store.update_player(player_id, changes, actor).await
}

/// Closes the player's current version without a replacement
pub async fn deactivate_player(store: &dyn ClubStore, player_id: Uuid, actor: &Actor) -> Result<()> {
    store.deactivate_player(player_id, actor).await
}
