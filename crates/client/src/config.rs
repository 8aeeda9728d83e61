//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TECHMART_API_URL` - Backend origin (default: `http://localhost:8080`);
//!   the REST API lives under `/api` and product images under `/images`
//! - `TECHMART_STATE_PATH` - JSON file holding the persisted session
//!   (default: `$HOME/.techmart/state.json`)
//! - `TECHMART_GUEST_CART_RETENTION` - `until-cart-load` (default) or
//!   `clear-after-merge`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const STATE_DIR: &str = ".techmart";
const STATE_FILE: &str = "state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// What happens to the persisted guest cart once login has tried to merge it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuestCartRetention {
    /// Keep `localCart` until a server cart load succeeds.
    #[default]
    UntilCartLoad,
    /// Delete `localCart` right after the merge attempt, whatever its outcome.
    ClearAfterMerge,
}

impl FromStr for GuestCartRetention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "until-cart-load" => Ok(Self::UntilCartLoad),
            "clear-after-merge" => Ok(Self::ClearAfterMerge),
            other => Err(format!(
                "expected `until-cart-load` or `clear-after-merge`, got `{other}`"
            )),
        }
    }
}

/// TechMart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without the `/api` suffix
    pub api_url: Url,
    /// File backing the persisted session
    pub state_path: PathBuf,
    /// Guest cart handling after login
    pub guest_cart_retention: GuestCartRetention,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default("TECHMART_API_URL", DEFAULT_API_URL))?;
        let state_path = get_optional_env("TECHMART_STATE_PATH")
            .map_or_else(default_state_path, PathBuf::from);
        let guest_cart_retention = get_optional_env("TECHMART_GUEST_CART_RETENTION")
            .map(|raw| {
                raw.parse().map_err(|e| {
                    ConfigError::InvalidEnvVar("TECHMART_GUEST_CART_RETENTION".to_string(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_url,
            state_path,
            guest_cart_retention,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("TECHMART_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "TECHMART_API_URL".to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    Ok(url)
}

fn default_state_path() -> PathBuf {
    get_optional_env("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(STATE_DIR)
        .join(STATE_FILE)
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_parse() {
        assert_eq!(
            "clear-after-merge".parse::<GuestCartRetention>().unwrap(),
            GuestCartRetention::ClearAfterMerge
        );
        assert_eq!(
            " Until-Cart-Load ".parse::<GuestCartRetention>().unwrap(),
            GuestCartRetention::UntilCartLoad
        );
        assert!("forever".parse::<GuestCartRetention>().is_err());
        assert_eq!(GuestCartRetention::default(), GuestCartRetention::UntilCartLoad);
    }

    #[test]
    fn test_parse_api_url() {
        let url = parse_api_url("http://localhost:8080").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert!(matches!(
            parse_api_url("ftp://example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_default_state_path_ends_with_state_file() {
        let path = default_state_path();
        assert!(path.ends_with(".techmart/state.json"));
    }
}
