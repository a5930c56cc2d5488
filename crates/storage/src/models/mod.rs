pub mod board;
pub mod game;
pub mod lesson_class;
pub mod player;
pub mod player_name;
pub mod version;

pub use board::Board;
pub use game::{Color, Game, GameResult, NewGame};
pub use lesson_class::{LessonClass, LessonClassChanges, NewLessonClass};
pub use player::{NewPlayer, Player, PlayerChanges};
pub use player_name::PlayerName;
pub use version::{Actor, VersionInfo, Versioned};
