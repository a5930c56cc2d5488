pub mod club;
pub mod game;
pub mod lesson_class;
pub mod player;
mod versioning;

pub use club::PgClubStore;
pub use game::GameRepository;
pub use lesson_class::LessonClassRepository;
pub use player::PlayerRepository;
