//! Configuration loading for the Marquee CLI.
//!
//! All top-level fields are required. Only `fetch` and the individual auth
//! credentials may be omitted.

use std::path::Path;
use std::time::Duration;

use marquee_api::{ClientCredentials, ReconnectConfig};
use marquee_core::FetchConfig;
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    pub api_base_url: String,
    pub ws_endpoint: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub user_id: Option<String>,
}

impl AuthConfig {
    pub fn credentials(&self) -> ClientCredentials {
        ClientCredentials {
            api_key: self.api_key.clone(),
            token: self.token.clone(),
        }
    }
}

impl CliConfig {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, CliError> {
        let config: CliConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Read, parse and validate in one step.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let config = Self::from_path(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), CliError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("api_base_url", "must not be empty"));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(invalid("api_base_url", "must start with http:// or https://"));
        }
        if self.ws_endpoint.trim().is_empty() {
            return Err(invalid("ws_endpoint", "must not be empty"));
        }
        if !self.ws_endpoint.starts_with("ws://") && !self.ws_endpoint.starts_with("wss://") {
            return Err(invalid("ws_endpoint", "must start with ws:// or wss://"));
        }
        if self.auth.api_key.is_none() && self.auth.token.is_none() {
            return Err(invalid("auth", "api_key or token must be provided"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.reconnect.initial_ms == 0 {
            return Err(invalid("reconnect.initial_ms", "must be > 0"));
        }
        if self.reconnect.max_ms < self.reconnect.initial_ms {
            return Err(invalid("reconnect.max_ms", "must be >= initial_ms"));
        }
        if self.reconnect.multiplier < 1.0 {
            return Err(invalid("reconnect.multiplier", "must be >= 1.0"));
        }
        self.fetch.validate()?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> CliError {
    CliError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
api_base_url = "http://localhost:8096"
ws_endpoint = "ws://localhost:8096/socket"
request_timeout_ms = 5000

[auth]
api_key = "secret"

[reconnect]
initial_ms = 250
max_ms = 5000
multiplier = 2.0
jitter_ms = 100
"#;

    #[test]
    fn test_minimal_config_uses_fetch_defaults() {
        let config = CliConfig::from_toml(MINIMAL).expect("parses");
        config.validate().expect("valid");
        assert_eq!(config.fetch, FetchConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let contents = format!("{}\nextra = 1\n", MINIMAL);
        assert!(matches!(CliConfig::from_toml(&contents), Err(CliError::Parse(_))));
    }
}
