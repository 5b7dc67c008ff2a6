//! Marquee Core - request and entity types
//!
//! Pure data structures shared by the store, the API adapters and the
//! request coordinator. No I/O lives here.

pub mod args;
pub mod config;
pub mod error;
pub mod item;
pub mod key;
pub mod loading;
pub mod params;

pub use args::{canonical_json, RequestArgs};
pub use config::FetchConfig;
pub use error::{ApiError, ConfigError, MarqueeError, MarqueeResult, ValidationError};
pub use item::{BaseItem, ItemData, ItemId, ItemRefs};
pub use key::RequestKey;
pub use loading::LoadingState;
pub use params::{ApiEnums, StandardParams};

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
