//! Marquee Store - request and entity cache
//!
//! Two caches live behind one [`CacheStore`]:
//!
//! - the request cache, keyed by [`marquee_core::RequestKey`], holding either
//!   a raw response result or the identifiers of the entities it returned;
//! - the shared entity cache, keyed by [`marquee_core::ItemId`], which
//!   deduplicates entities returned by unrelated requests.
//!
//! The store also publishes a revision counter so that waiters can observe
//! a key becoming populated without polling.

pub mod memory;
pub mod traits;

pub use memory::InMemoryCacheStore;
pub use traits::{CacheStats, CacheStore, CachedRequest, CachedValue, RequestData};
