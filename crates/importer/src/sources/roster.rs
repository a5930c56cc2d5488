use crate::canonical::models::RosterFile;
use crate::canonical::transformer::CanonicalTransformer;
use crate::canonical::validator::CanonicalValidator;
use crate::traits::{ClubImporter, ImportContext, ImportOutcome};
use crate::Result;
use std::path::Path;
use tracing::info;

/// Imports a roster file: volunteers, lesson classes and players.
pub struct RosterImporter;

#[async_trait::async_trait]
impl ClubImporter for RosterImporter {
    async fn import(&self, file: &Path, context: &ImportContext) -> Result<ImportOutcome> {
        let content = tokio::fs::read_to_string(file).await?;
        let roster: RosterFile = serde_json::from_str(&content)?;

        info!(
            "Loaded roster: {} volunteer(s), {} class(es), {} player(s) (v{})",
            roster.volunteers.len(),
            roster.classes.len(),
            roster.players.len(),
            roster.format_version
        );

        let report = CanonicalValidator::validate_roster(&roster)?;
        report.log_warnings();

        if context.validate_only {
            return Ok(ImportOutcome::Validated);
        }

        let transformer = CanonicalTransformer::new(context.store.as_ref(), &context.actor);
        let summary = transformer.import_roster(roster).await?;
        Ok(ImportOutcome::Roster(summary))
    }
}
