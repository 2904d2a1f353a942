#[cfg(feature = "cli")]
pub mod cli;
pub mod players;

#[cfg(feature = "cli")]
pub use cli::BotConfig;
pub use players::{MentionId, PlayerDirectory};
