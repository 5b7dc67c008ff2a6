//! Error types for Marquee operations

use thiserror::Error;

/// Errors raised while talking to the media server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Endpoint {endpoint} has no method named {method}")]
    UnknownMethod { endpoint: String, method: String },

    #[error("Missing path parameter {name} for {endpoint}.{method}")]
    MissingPathParam {
        endpoint: String,
        method: String,
        name: String,
    },

    #[error("Request to {url} failed with status {status}: {message}")]
    RequestFailed {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Transport error: {reason}")]
    Transport { reason: String },

    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },
}

/// Validation errors for argument snapshots and response payloads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all Marquee errors.
#[derive(Debug, Clone, Error)]
pub enum MarqueeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Marquee operations.
pub type MarqueeResult<T> = Result<T, MarqueeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_unknown_method() {
        let err = ApiError::UnknownMethod {
            endpoint: "items".to_string(),
            method: "getNothing".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("items"));
        assert!(msg.contains("getNothing"));
    }

    #[test]
    fn test_master_error_wraps_config() {
        let err: MarqueeError = ConfigError::MissingRequired {
            field: "api_base_url".to_string(),
        }
        .into();
        assert!(matches!(err, MarqueeError::Config(_)));
        assert!(err.to_string().starts_with("Config error"));
    }
}
