use crate::utils::error::{BotError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    validate_url_with_schemes(field_name, url_str, &["http", "https"])
}

pub fn validate_url_with_schemes(field_name: &str, url_str: &str, schemes: &[&str]) -> Result<()> {
    if url_str.is_empty() {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => {
            if schemes.contains(&url.scheme()) {
                Ok(())
            } else {
                Err(BotError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: url_str.to_string(),
                    reason: format!(
                        "Unsupported URL scheme: {}. Allowed schemes: {}",
                        url.scheme(),
                        schemes.join(", ")
                    ),
                })
            }
        }
        Err(e) => Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BotError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("TARGET_URL", "https://example.com").is_ok());
        assert!(validate_url("TARGET_URL", "http://example.com").is_ok());
        assert!(validate_url("TARGET_URL", "").is_err());
        assert!(validate_url("TARGET_URL", "invalid-url").is_err());
        assert!(validate_url("TARGET_URL", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_url_with_websocket_schemes() {
        let schemes = ["http", "https", "ws", "wss"];
        assert!(validate_url_with_schemes("BROWSER_ENDPOINT", "ws://127.0.0.1:9222/devtools/browser/abc", &schemes).is_ok());
        assert!(validate_url_with_schemes("BROWSER_ENDPOINT", "http://localhost:9222", &schemes).is_ok());
        assert!(validate_url_with_schemes("BROWSER_ENDPOINT", "file:///tmp/x", &schemes).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("ARCS_CHECK_INTERVAL", 15, 1).is_ok());
        assert!(validate_positive_number("ARCS_CHECK_INTERVAL", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("DISCORD_TOKEN", "abc").is_ok());
        assert!(matches!(
            validate_non_empty_string("DISCORD_TOKEN", "   "),
            Err(BotError::MissingConfigError { .. })
        ));
    }
}
