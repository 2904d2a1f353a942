pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::BotConfig;

pub use adapters::{ChromeSessionFactory, DiscordGateway, DryRunGateway};
pub use config::PlayerDirectory;
pub use crate::core::{
    fetcher::{FetchSettings, PageFetcher},
    notifier::Notifier,
    retry::RetryPolicy,
    scheduler::TurnWatcher,
};
pub use utils::error::{BotError, Result};
