//! Cache store trait and stored entry types.
//!
//! The coordinator never owns cached data. It reads and writes through this
//! trait, and the implementation decides storage and lifetime.

use marquee_core::{ApiEnums, BaseItem, ItemData, ItemId, ItemRefs, RequestKey, Timestamp};
use serde_json::Value;
use tokio::sync::watch;

/// What was stored for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// Generic call: the response result verbatim.
    Raw(Value),
    /// Item-oriented call: identifiers into the shared entity cache.
    Items(ItemRefs),
}

impl CachedValue {
    pub fn is_items(&self) -> bool {
        matches!(self, Self::Items(_))
    }
}

/// A stored request result.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRequest {
    pub value: CachedValue,
    pub stored_at: Timestamp,
}

/// A stored request result resolved into data a consumer can use.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestData {
    Raw(Value),
    Items(ItemData),
}

/// Cache store used by the request coordinator.
///
/// Implementations must be cheap to read synchronously: the coordinator
/// consults the store before any network round-trip completes.
pub trait CacheStore: Send + Sync {
    /// Look up the stored result for `key`. Counts toward hit statistics.
    fn get_cached_request(&self, key: &RequestKey) -> Option<CachedRequest>;

    /// Same lookup without touching hit statistics, for repeated reads of
    /// an already-issued request.
    fn peek_cached_request(&self, key: &RequestKey) -> Option<CachedRequest>;

    /// Store (or overwrite) the result for `key`.
    fn request_add(&self, key: &RequestKey, value: CachedValue);

    /// Resolve a stored entry. Item identifiers are looked up in the shared
    /// entity cache; identifiers with no record are skipped.
    fn get_request(&self, entry: &CachedRequest) -> Option<RequestData>;

    /// Upsert entities by identifier. The latest write replaces the record.
    fn base_item_add(&self, items: Vec<BaseItem>);

    fn get_item_by_id(&self, id: &ItemId) -> Option<BaseItem>;

    /// Look up several entities, preserving the order of `ids`.
    fn get_items_by_id(&self, ids: &[ItemId]) -> Vec<BaseItem>;

    /// Canonical field and image configuration.
    fn api_enums(&self) -> ApiEnums;

    /// Revision counter bumped on every mutation.
    fn changes(&self) -> watch::Receiver<u64>;
}

/// Statistics about store usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of request lookups that found an entry.
    pub hits: u64,
    /// Number of request lookups that found nothing.
    pub misses: u64,
    /// Number of stored request results.
    pub request_count: u64,
    /// Number of entities in the shared entity cache.
    pub item_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
