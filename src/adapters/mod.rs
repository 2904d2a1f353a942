// Adapters layer: concrete implementations of the domain ports.

pub mod browser;
pub mod discord;

pub use browser::{ChromeSession, ChromeSessionFactory};
pub use discord::{DiscordGateway, DryRunGateway};
