//! Configuration types for request coordination.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, MarqueeResult};
use crate::params::{ApiEnums, StandardParams};

/// Settings that shape dispatched requests and handle resolution.
///
/// `fields` and `image_types` seed a store through [`FetchConfig::api_enums`].
/// Dispatch always reads the field and image lists from the store, so they
/// take effect only through the store they were used to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Field selection for the store built from this config.
    pub fields: Vec<String>,
    /// Image types for the store built from this config.
    pub image_types: Vec<String>,
    pub enable_images: bool,
    pub image_type_limit: Option<u32>,
    /// Upper bound on how long a handle waits for first data.
    /// `None` waits until data arrives, however long that takes.
    pub resolve_timeout_ms: Option<u64>,
    /// Text of the transient banner shown when a call is queued offline.
    pub offline_message: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let enums = ApiEnums::default();
        Self {
            fields: enums.fields,
            image_types: enums.image_types,
            enable_images: true,
            image_type_limit: Some(1),
            resolve_timeout_ms: None,
            offline_message: "You are offline. The request will be retried once the connection is back."
                .to_string(),
        }
    }
}

impl FetchConfig {
    pub fn api_enums(&self) -> ApiEnums {
        ApiEnums {
            fields: self.fields.clone(),
            image_types: self.image_types.clone(),
        }
    }

    pub fn standard_params(&self, enums: &ApiEnums) -> StandardParams {
        StandardParams::from_enums(enums, self.enable_images, self.image_type_limit)
    }

    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - field and image type names are non-empty
    /// - image_type_limit, when set, is > 0
    /// - resolve_timeout_ms, when set, is > 0
    pub fn validate(&self) -> MarqueeResult<()> {
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.fields".to_string(),
                reason: "field names must not be empty".to_string(),
            }
            .into());
        }
        if self.image_types.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.image_types".to_string(),
                reason: "image type names must not be empty".to_string(),
            }
            .into());
        }
        if self.image_type_limit == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.image_type_limit".to_string(),
                reason: "must be > 0 when set".to_string(),
            }
            .into());
        }
        if self.resolve_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "fetch.resolve_timeout_ms".to_string(),
                reason: "must be > 0 when set".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
