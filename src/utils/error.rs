use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Chat API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Browser automation error: {message}")]
    BrowserError { message: String },

    #[error("Timed out after {seconds}s while {operation}")]
    PageTimeout { operation: String, seconds: u64 },

    #[error("No browser session is available")]
    SessionUnavailable,

    #[error("Browser reconnect failed after {attempts} attempts: {message}")]
    ReconnectExhausted { attempts: u32, message: String },

    #[error("Chat API returned {status}: {message}")]
    ChatApiError { status: u16, message: String },

    #[error("No permission to send to {target}")]
    PermissionDenied { target: u64 },

    #[error("Rate limited by chat API, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Chat token was rejected")]
    Unauthorized,

    #[error("Player directory '{path}' could not be loaded: {message}")]
    PlayerDirectoryError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Browser,
    Chat,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<chromiumoxide::error::CdpError> for BotError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BotError::BrowserError {
            message: err.to_string(),
        }
    }
}

impl BotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::BrowserError { .. }
            | BotError::PageTimeout { .. }
            | BotError::SessionUnavailable
            | BotError::ReconnectExhausted { .. } => ErrorCategory::Browser,
            BotError::ApiError(_)
            | BotError::ChatApiError { .. }
            | BotError::PermissionDenied { .. }
            | BotError::RateLimited { .. }
            | BotError::Unauthorized => ErrorCategory::Chat,
            BotError::PlayerDirectoryError { .. }
            | BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BotError::IoError(_) | BotError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BotError::ReconnectExhausted { .. } => ErrorSeverity::Critical,
            BotError::Unauthorized => ErrorSeverity::Critical,
            BotError::PlayerDirectoryError { .. }
            | BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            BotError::PermissionDenied { .. } | BotError::ChatApiError { .. } => {
                ErrorSeverity::Low
            }
            _ => ErrorSeverity::Medium,
        }
    }

    /// 可以在同一個邊界內直接重試的錯誤
    pub fn is_retryable(&self) -> bool {
        match self {
            BotError::BrowserError { .. }
            | BotError::PageTimeout { .. }
            | BotError::SessionUnavailable
            | BotError::RateLimited { .. }
            | BotError::ApiError(_) => true,
            BotError::ChatApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 程序無法繼續運作的錯誤
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Browser => format!("Browser session problem: {}", self),
            ErrorCategory::Chat => format!("Chat delivery problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BotError::ReconnectExhausted { .. } | BotError::SessionUnavailable => {
                "Check that the browser automation endpoint is running and reachable"
            }
            BotError::Unauthorized => "Check DISCORD_TOKEN",
            BotError::PermissionDenied { .. } => {
                "Grant the bot Send Messages permission on the target channel"
            }
            BotError::PlayerDirectoryError { .. } => {
                "Make sure the players file exists and contains a `players` mapping"
            }
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => {
                "Check the environment variables or .env file"
            }
            BotError::PageTimeout { .. } => "Increase ARCS_PAGE_LOAD_WAIT or ELEMENT_WAIT",
            _ => "The next cycle will retry automatically",
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_exhausted_is_fatal() {
        let err = BotError::ReconnectExhausted {
            attempts: 5,
            message: "connection refused".to_string(),
        };
        assert!(err.is_fatal());
        assert!(!err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Browser);
    }

    #[test]
    fn test_transient_browser_errors_are_retryable() {
        assert!(BotError::SessionUnavailable.is_retryable());
        assert!(BotError::PageTimeout {
            operation: "waiting for body".to_string(),
            seconds: 10
        }
        .is_retryable());
        assert!(!BotError::PermissionDenied { target: 1 }.is_retryable());
    }

    #[test]
    fn test_chat_server_errors_are_retryable() {
        let server_error = BotError::ChatApiError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let client_error = BotError::ChatApiError {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(server_error.is_retryable());
        assert!(!client_error.is_retryable());
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = BotError::MissingConfigError {
            field: "TARGET_URL".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(!err.is_fatal());
        assert!(err.user_friendly_message().starts_with("Configuration problem"));
    }
}
