use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::dto::ranking::RatingSheetRow;
use crate::error::Result;
use crate::models::Player;
use crate::store::ClubStore;

/// Export order: rating and grade descending, then last and first name
/// ascending. Players without a grade come after every graded player of the
/// same rating.
fn sheet_order(a: &Player, b: &Player) -> Ordering {
    b.rating
        .cmp(&a.rating)
        .then_with(|| b.grade.cmp(&a.grade))
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.first_name.cmp(&b.first_name))
}

/// Rows for enrolled, non-volunteer players in export order.
pub fn rating_sheet(players: &[Player], class_names: &HashMap<Uuid, String>) -> Vec<RatingSheetRow> {
    let mut competitors: Vec<&Player> = players
        .iter()
        .filter(|p| p.version.is_active && p.is_competitor())
        .collect();
    competitors.sort_by(|a, b| sheet_order(a, b));

    competitors
        .into_iter()
        .map(|p| RatingSheetRow {
            player_id: p.player_id,
            name: p.display_name(),
            grade: p.grade,
            rating: p.rating,
            lesson_class: p.lesson_class_id.and_then(|id| class_names.get(&id).cloned()),
            improvement: p.beginning_rating.map(|start| p.rating - start),
        })
        .collect()
}

pub async fn load_rating_sheet<S: ClubStore + ?Sized>(store: &S) -> Result<Vec<RatingSheetRow>> {
    let players = store.active_players().await?;
    let class_names: HashMap<Uuid, String> = store
        .lesson_classes()
        .await?
        .into_iter()
        .map(|c| (c.class_id, c.name))
        .collect();

    Ok(rating_sheet(&players, &class_names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, NewLessonClass, NewPlayer};
    use crate::store::MemoryStore;

    fn new_player(last: &str, first: &str, rating: i32, grade: Option<i32>) -> NewPlayer {
        NewPlayer {
            first_name: first.to_string(),
            last_name: last.to_string(),
            rating,
            grade,
            active_member: true,
            ..NewPlayer::default()
        }
    }

    #[tokio::test]
    async fn test_sheet_order_and_columns() {
        let store = MemoryStore::new();
        let actor = Actor::new("import");

        let teacher = store
            .create_player(
                NewPlayer {
                    is_volunteer: true,
                    ..new_player("Coach", "Ana", 1800, None)
                },
                &actor,
            )
            .await
            .unwrap();
        let class = store
            .create_lesson_class(
                NewLessonClass {
                    name: "Knights".to_string(),
                    teacher_id: teacher.player_id,
                    co_teacher_id: None,
                },
                &actor,
            )
            .await
            .unwrap();

        for player in [
            NewPlayer {
                beginning_rating: Some(900),
                lesson_class_id: Some(class.class_id),
                ..new_player("Baker", "Zed", 1000, Some(4))
            },
            new_player("Adams", "Amy", 1000, Some(4)),
            new_player("Adams", "Bea", 1000, None),
            new_player("Young", "Cal", 1200, Some(2)),
            NewPlayer {
                active_member: false,
                ..new_player("Gone", "Dee", 1500, Some(5))
            },
        ] {
            store.create_player(player, &actor).await.unwrap();
        }

        let rows = load_rating_sheet(&store).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Young, Cal", "Adams, Amy", "Baker, Zed", "Adams, Bea"]
        );

        let baker = &rows[2];
        assert_eq!(baker.lesson_class.as_deref(), Some("Knights"));
        assert_eq!(baker.improvement, Some(100));
        assert_eq!(rows[0].improvement, None);
    }
}
