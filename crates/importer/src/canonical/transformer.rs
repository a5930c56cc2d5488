use super::models::{ClassRecord, PlayerRecord, RosterFile};
use crate::Result;
use serde::Serialize;
use storage::ClubStore;
use storage::dto::round::{RoundSubmission, SettlementReport};
use storage::models::{Actor, LessonClass, NewLessonClass, NewPlayer, Player, PlayerChanges, PlayerName};
use storage::services::rating::RATING_FLOOR;
use storage::services::settle_round;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counts of what a roster import did. Records that could not be placed are
/// listed in `skipped` with the reason.
#[derive(Debug, Default, Serialize)]
pub struct ImportSummary {
    pub players_created: usize,
    pub players_updated: usize,
    pub classes_created: usize,
    pub classes_existing: usize,
    pub skipped: Vec<String>,
}

pub struct CanonicalTransformer<'a> {
    store: &'a dyn ClubStore,
    actor: &'a Actor,
}

impl<'a> CanonicalTransformer<'a> {
    pub fn new(store: &'a dyn ClubStore, actor: &'a Actor) -> Self {
        Self { store, actor }
    }

    /// Loads volunteers first, then classes, then players. Each record is
    /// written on its own; a failure stops the import with earlier records
    /// already stored.
    pub async fn import_roster(&self, roster: RosterFile) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for record in &roster.volunteers {
            self.upsert_player(record, true, None, &mut summary).await?;
        }

        for class in &roster.classes {
            self.import_class(class, &mut summary).await?;
        }

        let classes = self.store.lesson_classes().await?;
        let players = self.store.active_players().await?;
        for record in &roster.players {
            let class_id = match &record.lesson_class {
                Some(teacher) => match class_taught_by(&classes, &players, teacher) {
                    Some(class) => Some(class.class_id),
                    None => {
                        let reason = format!(
                            "{}: no lesson class taught by '{}'",
                            record.label(),
                            teacher
                        );
                        warn!("Skipping player {}", reason);
                        summary.skipped.push(reason);
                        continue;
                    }
                },
                None => None,
            };

            self.upsert_player(record, record.is_volunteer, class_id, &mut summary)
                .await?;
        }

        info!(
            "Roster imported: {} player(s) created, {} updated, {} class(es) created, {} skipped",
            summary.players_created,
            summary.players_updated,
            summary.classes_created,
            summary.skipped.len()
        );

        Ok(summary)
    }

    pub async fn import_round(&self, submission: &RoundSubmission) -> Result<SettlementReport> {
        let report = settle_round(self.store, submission, self.actor).await?;

        for error in &report.errors {
            warn!("Board {} on {}: {}", error.board, error.date, error.message);
        }

        Ok(report)
    }

    async fn import_class(&self, record: &ClassRecord, summary: &mut ImportSummary) -> Result<()> {
        let existing = self.store.lesson_classes().await?;
        if existing.iter().any(|c| c.name == record.name.trim()) {
            debug!("Lesson class '{}' already exists", record.name);
            summary.classes_existing += 1;
            return Ok(());
        }

        let players = self.store.active_players().await?;
        let Some(teacher) = find_by_first_name(&players, &record.teacher) else {
            let reason = format!("class '{}': no teacher named '{}'", record.name, record.teacher);
            warn!("Skipping {}", reason);
            summary.skipped.push(reason);
            return Ok(());
        };

        let co_teacher_id = match &record.co_teacher {
            Some(name) => match find_by_first_name(&players, name) {
                Some(co_teacher) => Some(co_teacher.player_id),
                None => {
                    warn!(
                        "Co-teacher '{}' of class '{}' not found, creating class without one",
                        name, record.name
                    );
                    None
                }
            },
            None => None,
        };

        let class = self
            .store
            .create_lesson_class(
                NewLessonClass {
                    name: record.name.clone(),
                    teacher_id: teacher.player_id,
                    co_teacher_id,
                },
                self.actor,
            )
            .await?;
        info!("Created lesson class '{}'", class.name);
        summary.classes_created += 1;

        Ok(())
    }

    async fn upsert_player(
        &self,
        record: &PlayerRecord,
        is_volunteer: bool,
        lesson_class_id: Option<Uuid>,
        summary: &mut ImportSummary,
    ) -> Result<Player> {
        let name = PlayerName::new(&record.last_name, &record.first_name);

        let player = match self.store.find_player_by_name(&name).await? {
            Some(existing) => {
                // Blank roster cells keep what is on file.
                let changes = PlayerChanges {
                    rating: record.rating.map(|r| r.max(RATING_FLOOR)),
                    beginning_rating: record.beginning_rating.map(Some),
                    grade: record.grade.map(Some),
                    lesson_class_id: lesson_class_id.map(Some),
                    active_member: Some(record.active_member),
                    is_volunteer: Some(is_volunteer),
                    parent_or_guardian: record.parent_or_guardian.clone().map(Some),
                    email: record.email.clone().map(Some),
                    phone: record.phone.clone().map(Some),
                    additional_info: record.additional_info.clone().map(Some),
                    ..PlayerChanges::default()
                };
                debug!("Updating player {}", name);
                summary.players_updated += 1;
                self.store
                    .update_player(existing.player_id, changes, self.actor)
                    .await?
            }
            None => {
                let rating = record.rating.unwrap_or(RATING_FLOOR).max(RATING_FLOOR);
                let player = NewPlayer {
                    first_name: record.first_name.trim().to_string(),
                    last_name: record.last_name.trim().to_string(),
                    rating,
                    beginning_rating: Some(record.beginning_rating.unwrap_or(rating)),
                    grade: record.grade,
                    lesson_class_id,
                    active_member: record.active_member,
                    is_volunteer,
                    parent_or_guardian: record.parent_or_guardian.clone(),
                    email: record.email.clone(),
                    phone: record.phone.clone(),
                    additional_info: record.additional_info.clone(),
                };
                debug!("Creating player {}", name);
                summary.players_created += 1;
                self.store.create_player(player, self.actor).await?
            }
        };

        Ok(player)
    }
}

fn find_by_first_name<'p>(players: &'p [Player], first_name: &str) -> Option<&'p Player> {
    let first_name = first_name.trim();
    players.iter().find(|p| p.first_name == first_name)
}

/// Class whose teacher or co-teacher goes by `teacher_first_name`.
fn class_taught_by<'c>(
    classes: &'c [LessonClass],
    players: &[Player],
    teacher_first_name: &str,
) -> Option<&'c LessonClass> {
    let teacher_first_name = teacher_first_name.trim();
    let teaches = |id: Uuid| {
        players
            .iter()
            .any(|p| p.player_id == id && p.first_name == teacher_first_name)
    };

    classes
        .iter()
        .find(|c| teaches(c.teacher_id) || c.co_teacher_id.is_some_and(&teaches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::models::RoundFile;
    use storage::MemoryStore;

    fn roster() -> RosterFile {
        serde_json::from_str(
            r#"{
                "format_version": "1.0.0",
                "volunteers": [
                    {"first_name": "Anna", "last_name": "Coach"},
                    {"first_name": "Boris", "last_name": "Helper"}
                ],
                "classes": [
                    {"name": "Knights", "teacher": "Anna", "co_teacher": "Boris"},
                    {"name": "Rooks", "teacher": "Nobody"}
                ],
                "players": [
                    {"first_name": "Judit", "last_name": "Polgar", "rating": 1200, "grade": 5, "lesson_class": "Anna"},
                    {"first_name": "Magnus", "last_name": "Carlsen", "lesson_class": "Boris"},
                    {"first_name": "Garry", "last_name": "Kasparov", "lesson_class": "Nobody"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_import_roster() {
        let store = MemoryStore::new();
        let actor = Actor::new("import");
        let transformer = CanonicalTransformer::new(&store, &actor);

        let summary = transformer.import_roster(roster()).await.unwrap();

        assert_eq!(summary.players_created, 4);
        assert_eq!(summary.players_updated, 0);
        assert_eq!(summary.classes_created, 1);
        assert_eq!(summary.skipped.len(), 2);

        let classes = store.lesson_classes().await.unwrap();
        assert_eq!(classes.len(), 1);
        let knights = classes[0].class_id;

        let judit = store
            .find_player_by_name(&PlayerName::new("Polgar", "Judit"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(judit.rating, 1200);
        assert_eq!(judit.beginning_rating, Some(1200));
        assert_eq!(judit.lesson_class_id, Some(knights));
        assert!(judit.is_competitor());

        let magnus = store
            .find_player_by_name(&PlayerName::new("Carlsen", "Magnus"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(magnus.rating, RATING_FLOOR);
        assert_eq!(magnus.lesson_class_id, Some(knights));

        let anna = store
            .find_player_by_name(&PlayerName::new("Coach", "Anna"))
            .await
            .unwrap()
            .unwrap();
        assert!(anna.is_volunteer);

        assert!(
            store
                .find_player_by_name(&PlayerName::new("Kasparov", "Garry"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_reimport_updates_in_place() {
        let store = MemoryStore::new();
        let actor = Actor::new("import");
        let transformer = CanonicalTransformer::new(&store, &actor);
        transformer.import_roster(roster()).await.unwrap();

        let mut again = roster();
        again.players[0].rating = None;
        again.players[0].grade = Some(6);
        let summary = transformer.import_roster(again).await.unwrap();

        assert_eq!(summary.players_created, 0);
        assert_eq!(summary.players_updated, 4);
        assert_eq!(summary.classes_created, 0);
        assert_eq!(summary.classes_existing, 1);

        let judit = store
            .find_player_by_name(&PlayerName::new("Polgar", "Judit"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(judit.rating, 1200);
        assert_eq!(judit.grade, Some(6));
        assert_eq!(store.player_history(judit.player_id).await.unwrap().len(), 2);
        assert_eq!(store.active_players().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_import_round_settles() {
        let store = MemoryStore::new();
        let actor = Actor::new("import");
        let transformer = CanonicalTransformer::new(&store, &actor);
        transformer.import_roster(roster()).await.unwrap();

        let round: RoundFile = serde_json::from_str(
            r#"{
                "format_version": "1.0.0",
                "date": "2024-10-07",
                "week_number": 5,
                "boards": [
                    {"board": "G-1", "white": "Carlsen, Magnus", "black": "Polgar, Judit", "result": "B"},
                    {"board": "G-2", "white": "Kasparov, Garry", "black": "Polgar, Judit", "result": "W"}
                ]
            }"#,
        )
        .unwrap();

        let report = transformer
            .import_round(&RoundSubmission::from(round))
            .await
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.ratings.len(), 2);
    }
}
