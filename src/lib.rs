// Library interface for forca-ai
// This allows integration tests to access internal modules

pub mod cli;
pub mod game_state;
pub mod guesser;
pub mod learning;
pub mod logging;
pub mod normalize;
pub mod ranking;
pub mod solver;
pub mod store;
pub mod tui;

// Re-export commonly used items for easier testing
pub use game_state::{GameInterface, GameSettings, Mode, Scoreboard, UserAction, game_loop};
pub use guesser::{GuessOutcome, Guesser};
pub use learning::LearningState;
pub use normalize::normalize_word;
pub use ranking::{JsonRankingStore, MemoryRanking, PlayerIdentity, RankingStore};
pub use store::{JsonFileStore, LearningStore, MemoryStore};
