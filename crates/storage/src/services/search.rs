//! Club-wide lookup by board or by name.

use std::collections::HashMap;

use uuid::Uuid;

use crate::dto::lesson_class::LessonClassResponse;
use crate::dto::player::PlayerResponse;
use crate::dto::round::RoundGameResponse;
use crate::dto::search::{SearchKind, SearchResults};
use crate::error::Result;
use crate::models::{Board, Game, LessonClass, Player};
use crate::store::ClubStore;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn name_matches(player: &Player, needle: &str) -> bool {
    contains_ci(&player.first_name, needle) || contains_ci(&player.last_name, needle)
}

fn game_rows(games: &[Game], players: &HashMap<Uuid, Player>) -> Vec<RoundGameResponse> {
    games
        .iter()
        .map(|game| RoundGameResponse::from_game(game, |id| players.get(&id).map(Player::display_name)))
        .collect()
}

fn class_row(class: &LessonClass, players: &HashMap<Uuid, Player>) -> LessonClassResponse {
    let teachers = class.teachers_label(players);
    LessonClassResponse::new(class.clone(), teachers)
}

/// Runs one search.
///
/// A board query lists every active game on that board, newest first. A
/// name query matches players by first or last name, classes by the names
/// of their teachers or their own name, and games by either player. A
/// teacher query lists the players enrolled in classes taught by someone
/// whose first name matches. Name matching ignores case.
pub async fn search<S: ClubStore + ?Sized>(
    store: &S,
    query: &str,
    kind: SearchKind,
) -> Result<SearchResults> {
    let query = query.trim();
    let kind = match kind {
        SearchKind::Auto if query.parse::<Board>().is_ok() => SearchKind::Board,
        SearchKind::Auto => SearchKind::Name,
        other => other,
    };

    let players: HashMap<Uuid, Player> = store
        .active_players()
        .await?
        .into_iter()
        .map(|p| (p.player_id, p))
        .collect();
    let mut results = SearchResults::default();

    match kind {
        SearchKind::Board | SearchKind::Auto => {
            let board: Board = query.parse()?;
            let games = store.games_on_board(board).await?;
            results.games = game_rows(&games, &players);
        }
        SearchKind::Name => {
            let needle = query.to_lowercase();
            let mut matched: Vec<&Player> =
                players.values().filter(|p| name_matches(p, &needle)).collect();
            matched.sort_by(|a, b| crate::store::seed_order(a, b));

            let ids: Vec<Uuid> = matched.iter().map(|p| p.player_id).collect();
            results.players = matched.into_iter().cloned().map(PlayerResponse::from).collect();

            let teacher_matches = |id: Uuid| players.get(&id).is_some_and(|p| name_matches(p, &needle));
            results.classes = store
                .lesson_classes()
                .await?
                .iter()
                .filter(|c| {
                    contains_ci(&c.name, &needle)
                        || teacher_matches(c.teacher_id)
                        || c.co_teacher_id.is_some_and(&teacher_matches)
                })
                .map(|c| class_row(c, &players))
                .collect();

            let games = store.games_of_players(&ids).await?;
            results.games = game_rows(&games, &players);
        }
        SearchKind::Teacher => {
            let needle = query.to_lowercase();
            let classes: Vec<LessonClass> = store
                .lesson_classes()
                .await?
                .into_iter()
                .filter(|c| {
                    players
                        .values()
                        .any(|p| contains_ci(&p.first_name, &needle) && c.is_taught_by(p.player_id))
                })
                .collect();

            let mut enrolled: Vec<&Player> = players
                .values()
                .filter(|p| {
                    p.lesson_class_id
                        .is_some_and(|id| classes.iter().any(|c| c.class_id == id))
                })
                .collect();
            enrolled.sort_by(|a, b| crate::store::seed_order(a, b));

            results.players = enrolled.into_iter().cloned().map(PlayerResponse::from).collect();
            results.classes = classes.iter().map(|c| class_row(c, &players)).collect();
        }
    }

    Ok(results)
}
