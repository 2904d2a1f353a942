use crate::core::fetcher::FetchSettings;
use crate::core::retry::RetryPolicy;
use crate::utils::error::{BotError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, validate_url_with_schemes,
    Validate,
};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

#[derive(Clone, Parser)]
#[command(name = "turn-notifier")]
#[command(about = "Watches a game page and announces whose turn it is")]
pub struct BotConfig {
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true, default_value = "")]
    pub discord_token: String,

    /// Channel or thread IDs, comma separated
    #[arg(
        long,
        env = "NOTIFICATION_TARGETS",
        value_delimiter = ',',
        value_parser = parse_target_id
    )]
    pub notification_targets: Vec<u64>,

    #[arg(long, env = "TARGET_URL")]
    pub target_url: String,

    /// Seconds to wait after navigation/refresh before reading the page
    #[arg(long = "page-load-wait", env = "ARCS_PAGE_LOAD_WAIT", default_value = "40")]
    pub page_load_wait_secs: u64,

    /// Minutes between checks
    #[arg(long = "check-interval", env = "ARCS_CHECK_INTERVAL", default_value = "15")]
    pub check_interval_mins: u64,

    /// Chrome DevTools endpoint (http://host:port or ws://...)
    #[arg(long, env = "BROWSER_ENDPOINT", default_value = "http://localhost:9222")]
    pub browser_endpoint: String,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PLAYERS_FILE", default_value = "players.yml")]
    pub players_file: String,

    /// Seconds to wait for the page body to appear
    #[arg(long = "element-wait", env = "ELEMENT_WAIT", default_value = "10")]
    pub element_wait_secs: u64,

    #[arg(long, env = "FETCH_RETRY_ATTEMPTS", default_value = "3")]
    pub fetch_retry_attempts: u32,

    #[arg(long = "fetch-retry-delay", env = "FETCH_RETRY_DELAY", default_value = "30")]
    pub fetch_retry_delay_secs: u64,

    #[arg(long, env = "RECONNECT_ATTEMPTS", default_value = "5")]
    pub reconnect_attempts: u32,

    #[arg(long = "reconnect-delay", env = "RECONNECT_DELAY", default_value = "10")]
    pub reconnect_delay_secs: u64,

    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_DISCORD_API_BASE)]
    pub discord_api_base: String,

    #[arg(long, help = "Log notifications instead of posting them")]
    pub dry_run: bool,

    #[arg(long, help = "Run a single check and exit")]
    pub once: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

// 手寫 Debug，避免 token 進入日誌
// 允許 "111, 222" 這種逗號後帶空白的寫法
fn parse_target_id(value: &str) -> std::result::Result<u64, String> {
    let trimmed = value.trim();
    trimmed
        .parse::<u64>()
        .map_err(|e| format!("invalid channel id '{}': {}", trimmed, e))
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("notification_targets", &self.notification_targets)
            .field("target_url", &self.target_url)
            .field("page_load_wait_secs", &self.page_load_wait_secs)
            .field("check_interval_mins", &self.check_interval_mins)
            .field("browser_endpoint", &self.browser_endpoint)
            .field("log_level", &self.log_level)
            .field("players_file", &self.players_file)
            .field("dry_run", &self.dry_run)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

impl BotConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_mins.saturating_mul(60))
    }

    pub fn page_load_wait(&self) -> Duration {
        Duration::from_secs(self.page_load_wait_secs)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn fetch_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.fetch_retry_attempts,
            Duration::from_secs(self.fetch_retry_delay_secs),
        )
    }

    pub fn reconnect_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.reconnect_attempts,
            Duration::from_secs(self.reconnect_delay_secs),
        )
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            target_url: self.target_url.clone(),
            settle: self.page_load_wait(),
            fetch_policy: self.fetch_policy(),
            reconnect_policy: self.reconnect_policy(),
        }
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validate_url("TARGET_URL", &self.target_url)?;
        validate_url_with_schemes(
            "BROWSER_ENDPOINT",
            &self.browser_endpoint,
            &["http", "https", "ws", "wss"],
        )?;
        validate_url("DISCORD_API_BASE", &self.discord_api_base)?;
        validate_positive_number("ARCS_CHECK_INTERVAL", self.check_interval_mins, 1)?;
        validate_positive_number("ELEMENT_WAIT", self.element_wait_secs, 1)?;
        validate_positive_number("FETCH_RETRY_ATTEMPTS", self.fetch_retry_attempts as u64, 1)?;
        validate_positive_number("RECONNECT_ATTEMPTS", self.reconnect_attempts as u64, 1)?;

        // dry run 不會真的送出訊息，可以不設 token 與目的地
        if !self.dry_run {
            validate_non_empty_string("DISCORD_TOKEN", &self.discord_token)?;
            if self.notification_targets.is_empty() {
                return Err(BotError::MissingConfigError {
                    field: "NOTIFICATION_TARGETS".to_string(),
                });
            }
        }

        Ok(())
    }
}
