pub mod classes;
pub mod pairings;
pub mod players;
pub mod ratings;
pub mod rounds;
pub mod search;
