//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_API_BASE_URL` - Base URL of the storefront API
//!   (e.g., `http://localhost:3333`)
//!
//! ## Optional
//! - `CART_API_TOKEN` - Bearer token for the storefront API
//! - `CART_STORAGE_DIR` - Directory holding the persistence slot (default: `.`)
//! - `CART_STORAGE_SLOT` - Name of the persistence slot (default: `cart`)
//! - `CART_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: `10`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct CartConfig {
    /// Base URL of the storefront API.
    pub api_base_url: String,
    /// Bearer token for the storefront API, if the deployment requires one.
    pub api_token: Option<SecretString>,
    /// Directory the persistence slot lives in.
    pub storage_dir: PathBuf,
    /// Name of the persistence slot.
    pub storage_slot: String,
    /// Timeout applied to every API request.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for CartConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("storage_dir", &self.storage_dir)
            .field("storage_slot", &self.storage_slot)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url("CART_API_BASE_URL", &get_required_env("CART_API_BASE_URL")?)?;
        let api_token = get_optional_env("CART_API_TOKEN").map(SecretString::from);
        let storage_dir = PathBuf::from(get_env_or_default("CART_STORAGE_DIR", "."));
        let storage_slot = get_env_or_default("CART_STORAGE_SLOT", "cart");
        let request_timeout = parse_timeout_secs(
            "CART_REQUEST_TIMEOUT_SECS",
            &get_env_or_default("CART_REQUEST_TIMEOUT_SECS", "10"),
        )?;

        Ok(Self {
            api_base_url,
            api_token,
            storage_dir,
            storage_slot,
            request_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a base URL and strip any trailing slash.
fn parse_base_url(var_name: &str, raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse a timeout given in whole seconds.
fn parse_timeout_secs(var_name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_strips_trailing_slash() {
        let url = parse_base_url("TEST_VAR", "http://localhost:3333/").unwrap();
        assert_eq!(url, "http://localhost:3333");
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        let result = parse_base_url("TEST_VAR", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_base_url_rejects_non_http_scheme() {
        let result = parse_base_url("TEST_VAR", "ftp://example.com");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_timeout_secs() {
        assert_eq!(
            parse_timeout_secs("TEST_VAR", "10").unwrap(),
            Duration::from_secs(10)
        );
        assert!(parse_timeout_secs("TEST_VAR", "fast").is_err());
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = CartConfig {
            api_base_url: "http://localhost:3333".to_string(),
            api_token: Some(SecretString::from("super_secret_token")),
            storage_dir: PathBuf::from("."),
            storage_slot: "cart".to_string(),
            request_timeout: Duration::from_secs(10),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("http://localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }
}
