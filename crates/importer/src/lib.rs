pub mod canonical;
pub mod error;
pub mod sources;
pub mod traits;

pub use error::{ImporterError, Result};
pub use sources::{RosterImporter, RoundImporter};
pub use traits::{ClubImporter, ImportContext, ImportOutcome};
