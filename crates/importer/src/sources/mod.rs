pub mod roster;
pub mod round;

pub use roster::RosterImporter;
pub use round::RoundImporter;
