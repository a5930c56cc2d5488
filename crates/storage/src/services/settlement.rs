//! Reconciles a submitted round with the games on file and applies the
//! resulting rating changes.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::round::{BoardError, RatingChange, RoundSubmission, SettlementReport};
use crate::error::{Result, StorageError};
use crate::models::{Actor, Board, Game, GameResult, NewGame, Player, PlayerName};
use crate::services::rating::rate_game;
use crate::store::{ClubStore, GameReplacement, RatingUpdate, RoundChanges};

/// A submitted board after parsing, before names are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBoard {
    pub board: Board,
    pub white: Option<PlayerName>,
    pub black: Option<PlayerName>,
    pub result: GameResult,
}

/// Parses every board of a submission. Any malformed board, name or result,
/// or a board listed twice, rejects the whole submission.
pub fn parse_boards(submission: &RoundSubmission) -> Result<Vec<ParsedBoard>> {
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(submission.boards.len());

    for entry in &submission.boards {
        let board: Board = entry.board.parse().map_err(|e| {
            StorageError::InvalidSubmission(format!("board '{}': {}", entry.board, e))
        })?;

        if !seen.insert(board) {
            return Err(StorageError::InvalidSubmission(format!(
                "board {} is listed more than once",
                board
            )));
        }

        let name = |raw: Option<&str>| {
            PlayerName::parse_optional(raw).map_err(|e| {
                StorageError::InvalidSubmission(format!("board {}: {}", board, e))
            })
        };

        parsed.push(ParsedBoard {
            board,
            white: name(entry.white.as_deref())?,
            black: name(entry.black.as_deref())?,
            result: GameResult::parse_optional(entry.result.as_deref()).map_err(|e| {
                StorageError::InvalidSubmission(format!("board {}: {}", board, e))
            })?,
        });
    }

    Ok(parsed)
}

/// First player in `players` carrying exactly this name.
fn resolve<'a>(players: &'a [Player], name: &PlayerName) -> Option<&'a Player> {
    players
        .iter()
        .find(|p| p.last_name == name.last() && p.first_name == name.first())
}

/// Seat resolution for one board; `Err` holds the message for the report.
fn resolve_board(
    players: &[Player],
    parsed: &ParsedBoard,
) -> std::result::Result<(Option<Uuid>, Option<Uuid>), String> {
    let seat = |name: &Option<PlayerName>| -> std::result::Result<Option<Uuid>, String> {
        match name {
            None => Ok(None),
            Some(name) => resolve(players, name)
                .map(|p| Some(p.player_id))
                .ok_or_else(|| StorageError::PlayerNotFound { name: name.to_string() }.to_string()),
        }
    };

    let white = seat(&parsed.white)?;
    let black = seat(&parsed.black)?;

    if white.is_some() && white == black {
        return Err(format!("{} cannot play themselves", parsed.board));
    }

    Ok((white, black))
}

/// A decided game between two seated players, in submission order.
struct RatedBoard {
    game_id: Uuid,
    white: Uuid,
    black: Uuid,
    result: GameResult,
}

/// Settles one round.
///
/// Game changes for the date are written in one transaction and rating
/// changes in a second one. A board with an unknown player is reported and
/// left untouched, along with whatever game is stored on it.
///
/// Every decided game is rated at most once. The rating transaction records
/// the ids of the games it rated, and settlement rates whichever submitted
/// games are decided and not yet recorded. Submitting the same round twice
/// therefore changes nothing, and settling again after the rating step
/// failed picks up the games it missed. A correction to a game that was
/// already rated is written but not re-rated.
pub async fn settle_round<S: ClubStore + ?Sized>(
    store: &S,
    submission: &RoundSubmission,
    actor: &Actor,
) -> Result<SettlementReport> {
    let date = submission.date;
    let parsed = parse_boards(submission)?;

    let players = store.active_players().await?;
    let stored: HashMap<Board, _> = store
        .active_games_on(date)
        .await?
        .into_iter()
        .map(|g| (g.board, g))
        .collect();

    let mut report = SettlementReport::new(date);
    let mut changes = RoundChanges::default();
    let mut skipped: HashSet<Board> = HashSet::new();
    let mut submitted: HashSet<Board> = HashSet::new();
    let mut settled: Vec<Board> = Vec::new();

    for entry in &parsed {
        submitted.insert(entry.board);

        let (white, black) = match resolve_board(&players, entry) {
            Ok(seats) => seats,
            Err(message) => {
                warn!("Skipping board {} on {}: {}", entry.board, date, message);
                skipped.insert(entry.board);
                report.errors.push(BoardError {
                    date,
                    board: entry.board.to_string(),
                    message,
                });
                continue;
            }
        };
        settled.push(entry.board);

        let stored_game = stored.get(&entry.board);
        let next = NewGame {
            date_of_match: date,
            week_number: submission
                .week_number
                .or_else(|| stored_game.and_then(|g| g.week_number)),
            board: entry.board,
            white,
            black,
            result: entry.result,
        };

        match stored_game {
            None => {
                report.created.push(entry.board.to_string());
                changes.created.push(next);
            }
            Some(game) if game.matches(&next) => {}
            Some(game) => {
                report.updated.push(entry.board.to_string());
                changes.updated.push(GameReplacement {
                    previous: game.version.version_id,
                    next,
                });
            }
        }
    }

    let mut closing: Vec<_> = stored
        .values()
        .filter(|g| !submitted.contains(&g.board) && !skipped.contains(&g.board))
        .collect();
    closing.sort_by_key(|g| g.board);
    for game in closing {
        report.deactivated.push(game.board.to_string());
        changes.deactivated.push(game.version.version_id);
    }

    let written: HashMap<Board, Game> = if changes.is_empty() {
        stored
    } else {
        store.apply_round(&changes, actor).await?;
        store
            .active_games_on(date)
            .await?
            .into_iter()
            .map(|g| (g.board, g))
            .collect()
    };

    let games: Vec<&Game> = settled.iter().filter_map(|b| written.get(b)).collect();
    let ids: Vec<Uuid> = games.iter().map(|g| g.game_id).collect();
    let already_rated = store.rated_games(&ids).await?;

    let mut rated = Vec::new();
    for game in games {
        if already_rated.contains(&game.game_id) {
            if report.updated.contains(&game.board.to_string()) {
                report.unrated_corrections.push(game.board.to_string());
            }
            continue;
        }
        if game.result.is_decided()
            && let (Some(white), Some(black)) = (game.white, game.black)
        {
            rated.push(RatedBoard {
                game_id: game.game_id,
                white,
                black,
                result: game.result,
            });
        }
    }

    let (updates, ratings, rated_ids) = rating_updates(&players, &rated);
    if !updates.is_empty() {
        store.apply_ratings(&updates, &rated_ids, actor).await?;
    }
    report.ratings = ratings;

    info!(
        "Settled {}: {} created, {} updated, {} deactivated, {} rating change(s), {} board error(s)",
        date,
        report.created.len(),
        report.updated.len(),
        report.deactivated.len(),
        report.ratings.len(),
        report.errors.len()
    );

    Ok(report)
}

/// Rating updates for the rated boards in order, with the ids of the games
/// that produced them. A player on several boards starts each game from the
/// rating the previous one left them with.
fn rating_updates(
    players: &[Player],
    rated: &[RatedBoard],
) -> (Vec<RatingUpdate>, Vec<RatingChange>, Vec<Uuid>) {
    let mut current: HashMap<Uuid, Player> =
        players.iter().map(|p| (p.player_id, p.clone())).collect();
    let mut updates = Vec::new();
    let mut ratings = Vec::new();
    let mut game_ids = Vec::new();

    for game in rated {
        let (Some(white), Some(black)) = (current.get(&game.white), current.get(&game.black)) else {
            continue;
        };
        let Some((white_rating, black_rating)) = rate_game(white, black, game.result) else {
            continue;
        };
        game_ids.push(game.game_id);

        for (player_id, new_rating, opponent) in [
            (game.white, white_rating, game.black),
            (game.black, black_rating, game.white),
        ] {
            let Some(player) = current.get_mut(&player_id) else {
                continue;
            };

            ratings.push(RatingChange {
                player_id,
                name: player.display_name(),
                previous_rating: player.rating,
                new_rating,
            });
            updates.push(RatingUpdate {
                player_id,
                new_rating,
                opponent,
            });

            player.opponent_three = player.opponent_two;
            player.opponent_two = player.opponent_one;
            player.opponent_one = Some(opponent);
            player.rating = new_rating;
        }
    }

    (updates, ratings, game_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::round::BoardSubmission;
    use crate::models::NewPlayer;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
    }

    fn board(board: &str, white: &str, black: &str, result: &str) -> BoardSubmission {
        let seat = |name: &str| (!name.is_empty()).then(|| name.to_string());
        BoardSubmission {
            board: board.to_string(),
            white: seat(white),
            black: seat(black),
            result: seat(result),
        }
    }

    fn round(date: NaiveDate, boards: Vec<BoardSubmission>) -> RoundSubmission {
        RoundSubmission {
            date,
            week_number: Some(6),
            boards,
            separate_classes: false,
        }
    }

    async fn club(entries: &[(&str, &str, i32, bool)]) -> MemoryStore {
        let store = MemoryStore::new();
        let actor = Actor::new("import");
        for (last, first, rating, is_volunteer) in entries {
            store
                .create_player(
                    NewPlayer {
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        rating: *rating,
                        active_member: true,
                        is_volunteer: *is_volunteer,
                        ..NewPlayer::default()
                    },
                    &actor,
                )
                .await
                .unwrap();
        }
        store
    }

    async fn find(store: &MemoryStore, last: &str, first: &str) -> Player {
        store
            .find_player_by_name(&PlayerName::new(last, first))
            .await
            .unwrap()
            .unwrap()
    }

    async fn rating_of(store: &MemoryStore, last: &str, first: &str) -> i32 {
        find(store, last, first).await.rating
    }

    async fn player_id(store: &MemoryStore, last: &str, first: &str) -> Uuid {
        find(store, last, first).await.player_id
    }

    #[tokio::test]
    async fn test_white_win_rates_both_players() {
        let store = club(&[("Tal", "Mikhail", 1000, false), ("Petrosian", "Tigran", 1000, false)]).await;
        let actor = Actor::new("director");

        let report = settle_round(
            &store,
            &round(day(7), vec![board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "W")]),
            &actor,
        )
        .await
        .unwrap();

        assert_eq!(report.created, vec!["G-1"]);
        assert_eq!(report.ratings.len(), 2);
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1016);
        assert_eq!(rating_of(&store, "Petrosian", "Tigran").await, 984);

        let tal = find(&store, "Tal", "Mikhail").await;
        let petrosian = find(&store, "Petrosian", "Tigran").await;
        assert_eq!(tal.opponent_one, Some(petrosian.player_id));
        assert_eq!(petrosian.opponent_one, Some(tal.player_id));
        assert_eq!(tal.version.modified_by, "director");
    }

    #[tokio::test]
    async fn test_resubmission_is_idempotent() {
        let store = club(&[
            ("Tal", "Mikhail", 1000, false),
            ("Petrosian", "Tigran", 1000, false),
            ("Smyslov", "Vasily", 1100, false),
            ("Spassky", "Boris", 1090, false),
        ])
        .await;
        let actor = Actor::new("director");
        let submission = round(
            day(7),
            vec![
                board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "W"),
                board("G-2", "Smyslov, Vasily", "Spassky, Boris", "D"),
            ],
        );

        settle_round(&store, &submission, &actor).await.unwrap();
        let spassky_after_first = rating_of(&store, "Spassky", "Boris").await;
        let tal_id = player_id(&store, "Tal", "Mikhail").await;
        let versions_after_first = store.player_history(tal_id).await.unwrap().len();

        let again = settle_round(&store, &submission, &actor).await.unwrap();

        assert!(!again.has_game_changes());
        assert!(again.ratings.is_empty());
        assert_eq!(rating_of(&store, "Spassky", "Boris").await, spassky_after_first);
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1016);
        assert_eq!(
            store.player_history(tal_id).await.unwrap().len(),
            versions_after_first
        );
    }

    #[tokio::test]
    async fn test_missing_board_is_deactivated_without_replacement() {
        let store = club(&[
            ("Tal", "Mikhail", 1000, false),
            ("Petrosian", "Tigran", 1000, false),
            ("Smyslov", "Vasily", 1100, false),
            ("Spassky", "Boris", 1090, false),
        ])
        .await;
        let actor = Actor::new("director");

        settle_round(
            &store,
            &round(
                day(7),
                vec![
                    board("G-1", "Tal, Mikhail", "Petrosian, Tigran", ""),
                    board("G-2", "Smyslov, Vasily", "Spassky, Boris", ""),
                ],
            ),
            &actor,
        )
        .await
        .unwrap();

        let report = settle_round(
            &store,
            &round(day(7), vec![board("G-2", "Smyslov, Vasily", "Spassky, Boris", "")]),
            &actor,
        )
        .await
        .unwrap();

        assert_eq!(report.deactivated, vec!["G-1"]);
        assert!(report.created.is_empty());

        let g1: Board = "G-1".parse().unwrap();
        assert!(store.active_game_at(day(7), g1).await.unwrap().is_none());
        let history = store.board_history(day(7), g1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(!history[0].version.is_active);
        assert!(history[0].version.end_at.is_some());
    }

    #[tokio::test]
    async fn test_result_entered_later_rates_once() {
        let store = club(&[("Tal", "Mikhail", 1000, false), ("Petrosian", "Tigran", 1000, false)]).await;
        let actor = Actor::new("director");

        settle_round(
            &store,
            &round(day(7), vec![board("A-1", "Tal, Mikhail", "Petrosian, Tigran", "U")]),
            &actor,
        )
        .await
        .unwrap();
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1000);

        let report = settle_round(
            &store,
            &round(day(7), vec![board("A-1", "Tal, Mikhail", "Petrosian, Tigran", "B")]),
            &actor,
        )
        .await
        .unwrap();
        assert_eq!(report.updated, vec!["A-1"]);
        assert!(report.unrated_corrections.is_empty());
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 984);
        assert_eq!(rating_of(&store, "Petrosian", "Tigran").await, 1016);

        let report = settle_round(
            &store,
            &round(day(7), vec![board("A-1", "Tal, Mikhail", "Petrosian, Tigran", "W")]),
            &actor,
        )
        .await
        .unwrap();
        assert_eq!(report.updated, vec!["A-1"]);
        assert_eq!(report.unrated_corrections, vec!["A-1"]);
        assert!(report.ratings.is_empty());
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 984);

        let a1: Board = "A-1".parse().unwrap();
        let history = store.board_history(day(7), a1).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|g| g.game_id == history[0].game_id));
        assert_eq!(history.iter().filter(|g| g.version.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_settling_again_rates_games_left_unrated() {
        let store = club(&[("Tal", "Mikhail", 1000, false), ("Petrosian", "Tigran", 1000, false)]).await;
        let actor = Actor::new("director");
        let tal = player_id(&store, "Tal", "Mikhail").await;
        let petrosian = player_id(&store, "Petrosian", "Tigran").await;

        // Game written but never rated, as after a failed rating step.
        store
            .create_game(
                NewGame {
                    date_of_match: day(7),
                    week_number: Some(6),
                    board: "G-1".parse().unwrap(),
                    white: Some(tal),
                    black: Some(petrosian),
                    result: GameResult::White,
                },
                &actor,
            )
            .await
            .unwrap();
        let submission = round(day(7), vec![board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "W")]);

        let report = settle_round(&store, &submission, &actor).await.unwrap();
        assert!(!report.has_game_changes());
        assert_eq!(report.ratings.len(), 2);
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1016);
        assert_eq!(rating_of(&store, "Petrosian", "Tigran").await, 984);

        let again = settle_round(&store, &submission, &actor).await.unwrap();
        assert!(again.ratings.is_empty());
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1016);
        assert_eq!(store.player_history(tal).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_volunteer_games_are_recorded_but_not_rated() {
        let store = club(&[("Tal", "Mikhail", 1000, false), ("Coach", "Pat", 1500, true)]).await;
        let actor = Actor::new("director");

        let report = settle_round(
            &store,
            &round(day(7), vec![board("C-1", "Coach, Pat", "Tal, Mikhail", "B")]),
            &actor,
        )
        .await
        .unwrap();

        assert_eq!(report.created, vec!["C-1"]);
        assert!(report.ratings.is_empty());
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1000);
        assert_eq!(rating_of(&store, "Coach", "Pat").await, 1500);
    }

    #[tokio::test]
    async fn test_unknown_player_skips_only_that_board() {
        let store = club(&[
            ("Tal", "Mikhail", 1000, false),
            ("Petrosian", "Tigran", 1000, false),
            ("Smyslov", "Vasily", 1100, false),
            ("Spassky", "Boris", 1090, false),
        ])
        .await;
        let actor = Actor::new("director");

        settle_round(
            &store,
            &round(day(7), vec![board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "")]),
            &actor,
        )
        .await
        .unwrap();

        let report = settle_round(
            &store,
            &round(
                day(7),
                vec![
                    board("G-1", "Tal, Mikhail", "Fischer, Bobby", "W"),
                    board("G-2", "Smyslov, Vasily", "Spassky, Boris", "D"),
                ],
            ),
            &actor,
        )
        .await
        .unwrap();

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].board, "G-1");
        assert_eq!(report.errors[0].date, day(7));
        assert!(report.errors[0].message.contains("Fischer, Bobby"));
        assert_eq!(report.created, vec!["G-2"]);
        assert!(report.deactivated.is_empty());

        let g1 = store
            .active_game_at(day(7), "G-1".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(g1.result, GameResult::Unknown);
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1000);
    }

    #[tokio::test]
    async fn test_player_on_two_boards_is_rated_sequentially() {
        let store = club(&[
            ("Tal", "Mikhail", 1000, false),
            ("Petrosian", "Tigran", 1000, false),
            ("Smyslov", "Vasily", 1000, false),
        ])
        .await;
        let actor = Actor::new("director");

        settle_round(
            &store,
            &round(
                day(7),
                vec![
                    board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "W"),
                    board("G-2", "Tal, Mikhail", "Smyslov, Vasily", "W"),
                ],
            ),
            &actor,
        )
        .await
        .unwrap();

        // 1016 against 1000 gains round(32 * (1 - 0.5230)) = 15.
        assert_eq!(rating_of(&store, "Tal", "Mikhail").await, 1031);
        assert_eq!(rating_of(&store, "Smyslov", "Vasily").await, 985);
    }

    #[tokio::test]
    async fn test_malformed_submissions_are_rejected_before_writing() {
        let store = club(&[("Tal", "Mikhail", 1000, false), ("Petrosian", "Tigran", 1000, false)]).await;
        let actor = Actor::new("director");

        for boards in [
            vec![board("11", "Tal, Mikhail", "Petrosian, Tigran", "W")],
            vec![board("G-1", "Tal Mikhail", "Petrosian, Tigran", "W")],
            vec![board("G-1", "Tal, Mikhail", "Petrosian, Tigran", "X")],
            vec![
                board("G-1", "Tal, Mikhail", "", ""),
                board("g1", "Petrosian, Tigran", "", ""),
            ],
        ] {
            let err = settle_round(&store, &round(day(7), boards), &actor)
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidSubmission(_)), "{:?}", err);
        }

        assert!(store.active_games_on(day(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_boards_and_null_results() {
        let store = club(&[("Tal", "Mikhail", 1000, false)]).await;
        let actor = Actor::new("director");

        let report = settle_round(
            &store,
            &round(
                day(7),
                vec![BoardSubmission {
                    board: "3G".to_string(),
                    white: Some("Tal, Mikhail".to_string()),
                    black: Some("NULL".to_string()),
                    result: Some("None".to_string()),
                }],
            ),
            &actor,
        )
        .await
        .unwrap();

        assert_eq!(report.created, vec!["G-3"]);
        let game = store
            .active_game_at(day(7), "G-3".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(game.black, None);
        assert_eq!(game.result, GameResult::Unknown);
        assert_eq!(game.week_number, Some(6));
    }
}
