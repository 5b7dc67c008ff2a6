//! Error types for the CLI.

use marquee_core::{ApiError, MarqueeError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("Invalid JSON for {arg}: {source}")]
    InvalidJson {
        arg: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("No data returned for {endpoint}.{method}")]
    NoData { endpoint: String, method: String },
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("Failed to initialize logging: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Marquee(#[from] MarqueeError),
}
