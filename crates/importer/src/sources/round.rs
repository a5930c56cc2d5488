use crate::canonical::models::RoundFile;
use storage::dto::round::RoundSubmission;
use crate::canonical::transformer::CanonicalTransformer;
use crate::canonical::validator::CanonicalValidator;
use crate::traits::{ClubImporter, ImportContext, ImportOutcome};
use crate::Result;
use std::path::Path;
use tracing::info;

/// Settles one round sheet: the games of a single date and their results.
pub struct RoundImporter;

#[async_trait::async_trait]
impl ClubImporter for RoundImporter {
    async fn import(&self, file: &Path, context: &ImportContext) -> Result<ImportOutcome> {
        let content = tokio::fs::read_to_string(file).await?;
        let round: RoundFile = serde_json::from_str(&content)?;

        info!("Loaded round for {}: {} board(s)", round.date, round.boards.len());

        let report = CanonicalValidator::validate_round(&round)?;
        report.log_warnings();

        if context.validate_only {
            return Ok(ImportOutcome::Validated);
        }

        let submission = RoundSubmission::from(round);
        let transformer = CanonicalTransformer::new(context.store.as_ref(), &context.actor);
        let report = transformer.import_round(&submission).await?;
        Ok(ImportOutcome::Round {
            report,
            next_round: submission.pairing_request(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use storage::models::{Actor, NewPlayer};
    use storage::{ClubStore, MemoryStore};

    #[tokio::test]
    async fn test_round_from_file() {
        let store = Arc::new(MemoryStore::new());
        let actor = Actor::new("import");
        for (first, last) in [("Mikhail", "Tal"), ("Tigran", "Petrosian")] {
            store
                .create_player(
                    NewPlayer {
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        rating: 1000,
                        active_member: true,
                        ..NewPlayer::default()
                    },
                    &actor,
                )
                .await
                .unwrap();
        }

        let path = std::env::temp_dir().join(format!("{}-round.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"{
                "format_version": "1.0.0",
                "date": "2024-10-07",
                "separate_classes": true,
                "boards": [{"board": "G-1", "white": "Tal, Mikhail", "black": "Petrosian, Tigran", "result": "W"}]
            }"#,
        )
        .await
        .unwrap();

        let context = ImportContext {
            store: store.clone(),
            actor,
            validate_only: false,
        };
        match RoundImporter.import(&path, &context).await.unwrap() {
            ImportOutcome::Round { report, next_round } => {
                assert_eq!(report.created, vec!["G-1".to_string()]);
                assert_eq!(report.ratings.len(), 2);
                assert!(next_round.separate_classes);
                assert_eq!(next_round.date, None);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let ratings: Vec<i32> = store
            .active_players()
            .await
            .unwrap()
            .iter()
            .map(|p| p.rating)
            .collect();
        assert_eq!(ratings, vec![1016, 984]);
        tokio::fs::remove_file(path).await.ok();
    }
}
