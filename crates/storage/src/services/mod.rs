pub mod history;
pub mod pairing;
pub mod ranking;
pub mod rating;
pub mod search;
pub mod settlement;

pub use pairing::{ClassGroups, PairingOptions, propose_pairings};
pub use ranking::load_rating_sheet;
pub use search::search;
pub use settlement::settle_round;
