use crate::Result;
use crate::canonical::transformer::ImportSummary;
use std::path::Path;
use std::sync::Arc;
use storage::ClubStore;
use storage::dto::pairing::PairingRequest;
use storage::dto::round::SettlementReport;
use storage::models::Actor;

pub struct ImportContext {
    pub store: Arc<dyn ClubStore>,
    pub actor: Actor,
    /// Parse and validate only, leaving the store untouched.
    pub validate_only: bool,
}

#[derive(Debug)]
pub enum ImportOutcome {
    Validated,
    Roster(ImportSummary),
    Round {
        report: SettlementReport,
        /// Pairing request for the following round, carrying over the
        /// round's class setting.
        next_round: PairingRequest,
    },
}

#[async_trait::async_trait]
pub trait ClubImporter: Send + Sync {
    async fn import(&self, file: &Path, context: &ImportContext) -> Result<ImportOutcome>;
}
