use std::collections::HashMap;

use uuid::Uuid;

use crate::error::Result;
use crate::models::{Color, Game, Player};
use crate::store::ClubStore;

/// Color `player_id` held in the most recent of `games` played against
/// `opponent_id`.
///
/// Only active versions count. The newest game wins by date of match, then
/// by creation time.
pub fn last_color_against(player_id: Uuid, opponent_id: Uuid, games: &[Game]) -> Option<Color> {
    games
        .iter()
        .filter(|g| g.version.is_active && g.is_between(player_id, opponent_id))
        .max_by(|a, b| {
            a.date_of_match
                .cmp(&b.date_of_match)
                .then_with(|| a.version.created_at.cmp(&b.version.created_at))
        })
        .and_then(|g| g.color_of(player_id))
}

/// Color the player held against their most recent opponent, read from the
/// store. `None` when the player has no recorded opponent or no such game
/// is on file.
pub async fn last_color<S: ClubStore + ?Sized>(store: &S, player: &Player) -> Result<Option<Color>> {
    let Some(opponent_id) = player.opponent_one else {
        return Ok(None);
    };

    let games = store.games_between(player.player_id, opponent_id).await?;
    Ok(last_color_against(player.player_id, opponent_id, &games))
}

/// Last colors for a whole field of players, keyed by player id.
pub async fn last_colors<S: ClubStore + ?Sized>(
    store: &S,
    players: &[Player],
) -> Result<HashMap<Uuid, Color>> {
    let mut colors = HashMap::new();

    for player in players {
        if let Some(color) = last_color(store, player).await? {
            colors.insert(player.player_id, color);
        }
    }

    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, GameResult, NewGame, NewPlayer, PlayerChanges};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, Utc};

    fn game_on(day: u32, board: &str, white: Uuid, black: Uuid) -> NewGame {
        NewGame {
            date_of_match: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
            week_number: None,
            board: board.parse().unwrap(),
            white: Some(white),
            black: Some(black),
            result: GameResult::Draw,
        }
    }

    #[test]
    fn test_most_recent_game_decides() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let actor = Actor::new("director");
        let games = vec![
            game_on(2, "A-1", a, b).into_game(Uuid::new_v4(), &actor, Utc::now()),
            game_on(16, "A-1", b, a).into_game(Uuid::new_v4(), &actor, Utc::now()),
            game_on(9, "A-1", a, b).into_game(Uuid::new_v4(), &actor, Utc::now()),
        ];

        assert_eq!(last_color_against(a, b, &games), Some(Color::Black));
        assert_eq!(last_color_against(b, a, &games), Some(Color::White));
    }

    #[test]
    fn test_closed_versions_and_other_opponents_ignored() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let actor = Actor::new("director");
        let mut closed = game_on(20, "A-1", b, a).into_game(Uuid::new_v4(), &actor, Utc::now());
        closed.version.close(&actor, Utc::now());
        let games = vec![
            game_on(2, "A-1", a, b).into_game(Uuid::new_v4(), &actor, Utc::now()),
            closed,
            game_on(23, "A-2", c, a).into_game(Uuid::new_v4(), &actor, Utc::now()),
        ];

        assert_eq!(last_color_against(a, b, &games), Some(Color::White));
        assert_eq!(last_color_against(a, Uuid::new_v4(), &games), None);
    }

    #[tokio::test]
    async fn test_last_color_from_store() {
        let store = MemoryStore::new();
        let actor = Actor::new("director");
        let mut ids = Vec::new();
        for last in ["Lasker", "Steinitz"] {
            let player = store
                .create_player(
                    NewPlayer {
                        first_name: "Em".to_string(),
                        last_name: last.to_string(),
                        rating: 1000,
                        active_member: true,
                        ..NewPlayer::default()
                    },
                    &actor,
                )
                .await
                .unwrap();
            ids.push(player.player_id);
        }
        let (lasker, steinitz) = (ids[0], ids[1]);

        let fresh = store.find_player(lasker).await.unwrap();
        assert_eq!(last_color(&store, &fresh).await.unwrap(), None);

        store
            .create_game(game_on(5, "B-2", steinitz, lasker), &actor)
            .await
            .unwrap();
        let changes = PlayerChanges::after_game(&fresh, 1000, steinitz);
        let lasker_now = store.update_player(lasker, changes, &actor).await.unwrap();

        assert_eq!(
            last_color(&store, &lasker_now).await.unwrap(),
            Some(Color::Black)
        );

        let colors = last_colors(&store, &[lasker_now]).await.unwrap();
        assert_eq!(colors.get(&lasker), Some(&Color::Black));
    }
}
