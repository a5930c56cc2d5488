//! Elo-style rating update applied after every decided game.

use crate::models::{Color, GameResult, Player};

/// K-factor for rating updates.
pub const K_FACTOR: f64 = 32.0;

/// No rating ever drops below this value.
pub const RATING_FLOOR: i32 = 100;

/// Expected score of a player rated `rating` against `opponent_rating`.
pub fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
    let diff = f64::from(opponent_rating - rating);
    1.0 / (1.0 + 10f64.powf(diff / 400.0))
}

/// Rating after one game scored `actual` (1 win, 0.5 draw, 0 loss).
pub fn new_rating(rating: i32, opponent_rating: i32, actual: f64) -> i32 {
    let expected = expected_score(rating, opponent_rating);
    let updated = (f64::from(rating) + K_FACTOR * (actual - expected)).round() as i32;
    updated.max(RATING_FLOOR)
}

/// New `(white, black)` ratings for a finished game, both computed from the
/// pre-game ratings. `None` when the result is not decided or either side
/// is a volunteer.
pub fn rate_game(white: &Player, black: &Player, result: GameResult) -> Option<(i32, i32)> {
    if white.is_volunteer || black.is_volunteer {
        return None;
    }

    let white_score = result.score_for(Color::White)?;
    let black_score = result.score_for(Color::Black)?;

    Some((
        new_rating(white.rating, black.rating, white_score),
        new_rating(black.rating, white.rating, black_score),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, NewPlayer};
    use chrono::Utc;

    fn player(rating: i32, is_volunteer: bool) -> Player {
        NewPlayer {
            first_name: "Bobby".to_string(),
            last_name: "Fischer".to_string(),
            rating,
            active_member: true,
            is_volunteer,
            ..NewPlayer::default()
        }
        .into_player(&Actor::new("import"), Utc::now())
    }

    #[test]
    fn test_equal_ratings_expect_half() {
        assert!((expected_score(1000, 1000) - 0.5).abs() < 1e-9);
        assert!(expected_score(1400, 1000) > 0.9);
        assert!(expected_score(1000, 1400) < 0.1);
    }

    #[test]
    fn test_white_win_between_equals() {
        assert_eq!(new_rating(1000, 1000, 1.0), 1016);
        assert_eq!(new_rating(1000, 1000, 0.0), 984);
    }

    #[test]
    fn test_draw_between_equals_is_unchanged() {
        for rating in [100, 750, 1000, 1850, 2400] {
            assert_eq!(new_rating(rating, rating, 0.5), rating);
        }
    }

    #[test]
    fn test_deltas_have_opposite_sign_and_bounded_magnitude() {
        let ratings = [100, 400, 800, 1000, 1210, 1500, 2000, 2800];
        for &r1 in &ratings {
            for &r2 in &ratings {
                let winner_delta = new_rating(r1, r2, 1.0) - r1;
                let loser = new_rating(r2, r1, 0.0);
                let loser_delta = loser - r2;

                assert!(winner_delta >= 0, "{} beat {}", r1, r2);
                assert!(winner_delta <= 32);
                assert!(loser_delta <= 0, "{} lost to {}", r2, r1);
                assert!(loser_delta >= -32 || loser == RATING_FLOOR);
            }
        }
    }

    #[test]
    fn test_floor_holds() {
        assert_eq!(new_rating(100, 100, 0.0), RATING_FLOOR);
        assert_eq!(new_rating(105, 2000, 0.0), 105);
        assert_eq!(new_rating(110, 100, 0.0), RATING_FLOOR);
        assert!(new_rating(100, 3000, 0.0) >= RATING_FLOOR);
    }

    #[test]
    fn test_rate_game() {
        let white = player(1000, false);
        let black = player(1000, false);

        assert_eq!(rate_game(&white, &black, GameResult::White), Some((1016, 984)));
        assert_eq!(rate_game(&white, &black, GameResult::Black), Some((984, 1016)));
        assert_eq!(rate_game(&white, &black, GameResult::Draw), Some((1000, 1000)));
        assert_eq!(rate_game(&white, &black, GameResult::Unknown), None);
    }

    #[test]
    fn test_volunteers_are_not_rated() {
        let student = player(1000, false);
        let volunteer = player(1000, true);

        assert_eq!(rate_game(&student, &volunteer, GameResult::White), None);
        assert_eq!(rate_game(&volunteer, &student, GameResult::Black), None);
    }
}
