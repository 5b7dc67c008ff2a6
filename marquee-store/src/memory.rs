//! In-memory cache store.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use marquee_core::{ApiEnums, BaseItem, ItemData, ItemId, ItemRefs, RequestKey};
use tokio::sync::watch;

use crate::traits::{CacheStats, CacheStore, CachedRequest, CachedValue, RequestData};

/// `CacheStore` backed by concurrent hash maps.
///
/// Every individual mutation is atomic; the order of mutations coming from
/// overlapping requests is whatever order they resolve in.
pub struct InMemoryCacheStore {
    requests: DashMap<RequestKey, CachedRequest>,
    items: DashMap<ItemId, BaseItem>,
    enums: ApiEnums,
    revision: watch::Sender<u64>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(ApiEnums::default())
    }
}

impl InMemoryCacheStore {
    pub fn new(enums: ApiEnums) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            requests: DashMap::new(),
            items: DashMap::new(),
            enums,
            revision,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            request_count: self.requests.len() as u64,
            item_count: self.items.len() as u64,
        }
    }

    pub fn remove_request(&self, key: &RequestKey) -> Option<CachedRequest> {
        let removed = self.requests.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.bump();
        }
        removed
    }

    /// Drop every stored request and entity, e.g. on logout.
    pub fn clear(&self) {
        self.requests.clear();
        self.items.clear();
        self.bump();
        tracing::debug!("Cache store cleared");
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get_cached_request(&self, key: &RequestKey) -> Option<CachedRequest> {
        let entry = self.peek_cached_request(key);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    fn peek_cached_request(&self, key: &RequestKey) -> Option<CachedRequest> {
        self.requests.get(key).map(|e| e.value().clone())
    }

    fn request_add(&self, key: &RequestKey, value: CachedValue) {
        tracing::trace!(key = %key, items = value.is_items(), "Storing request result");
        self.requests.insert(
            key.clone(),
            CachedRequest {
                value,
                stored_at: Utc::now(),
            },
        );
        self.bump();
    }

    fn get_request(&self, entry: &CachedRequest) -> Option<RequestData> {
        match &entry.value {
            CachedValue::Raw(value) => Some(RequestData::Raw(value.clone())),
            CachedValue::Items(ItemRefs::Single(id)) => self
                .get_item_by_id(id)
                .map(|item| RequestData::Items(ItemData::Single(item))),
            CachedValue::Items(ItemRefs::List(ids)) => Some(RequestData::Items(ItemData::List(
                self.get_items_by_id(ids),
            ))),
        }
    }

    fn base_item_add(&self, items: Vec<BaseItem>) {
        if items.is_empty() {
            return;
        }
        let count = items.len();
        for item in items {
            self.items.insert(item.id.clone(), item);
        }
        tracing::trace!(count, "Upserted items");
        self.bump();
    }

    fn get_item_by_id(&self, id: &ItemId) -> Option<BaseItem> {
        self.items.get(id).map(|e| e.value().clone())
    }

    fn get_items_by_id(&self, ids: &[ItemId]) -> Vec<BaseItem> {
        ids.iter().filter_map(|id| self.get_item_by_id(id)).collect()
    }

    fn api_enums(&self) -> ApiEnums {
        self.enums.clone()
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::RequestArgs;
    use serde_json::json;

    fn item(id: &str, name: &str) -> BaseItem {
        BaseItem::from_value(json!({"Id": id, "Name": name})).expect("valid item")
    }

    fn key(method: &str) -> RequestKey {
        RequestKey::new("items", method, &RequestArgs::new(vec![json!({"parentId": "p"})]))
    }

    #[test]
    fn test_request_roundtrip_and_stats() {
        let store = InMemoryCacheStore::default();
        assert!(store.get_cached_request(&key("getItems")).is_none());

        store.request_add(&key("getItems"), CachedValue::Raw(json!({"ok": true})));
        let entry = store.get_cached_request(&key("getItems")).expect("stored");
        assert_eq!(
            store.get_request(&entry),
            Some(RequestData::Raw(json!({"ok": true})))
        );

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.request_count, 1);
    }

    #[test]
    fn test_peek_does_not_count() {
        let store = InMemoryCacheStore::default();
        assert!(store.peek_cached_request(&key("getItems")).is_none());
        store.request_add(&key("getItems"), CachedValue::Raw(json!(1)));
        for _ in 0..5 {
            assert!(store.peek_cached_request(&key("getItems")).is_some());
        }

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_latest_item_write_wins() {
        let store = InMemoryCacheStore::default();
        store.base_item_add(vec![item("a", "first")]);
        store.base_item_add(vec![item("a", "second"), item("b", "other")]);

        assert_eq!(store.stats().item_count, 2);
        let a = store.get_item_by_id(&ItemId::from("a")).expect("present");
        assert_eq!(a.name.as_deref(), Some("second"));
    }

    #[test]
    fn test_item_refs_resolve_in_order_and_skip_missing() {
        let store = InMemoryCacheStore::default();
        store.base_item_add(vec![item("a", "A"), item("c", "C")]);
        let ids = vec![ItemId::from("c"), ItemId::from("missing"), ItemId::from("a")];
        let names: Vec<_> = store
            .get_items_by_id(&ids)
            .into_iter()
            .filter_map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["C".to_string(), "A".to_string()]);

        store.request_add(&key("getItem"), CachedValue::Items(ItemRefs::Single(ItemId::from("missing"))));
        let entry = store.get_cached_request(&key("getItem")).expect("stored");
        assert!(store.get_request(&entry).is_none());
    }

    #[tokio::test]
    async fn test_mutations_bump_revision() {
        let store = InMemoryCacheStore::default();
        let mut changes = store.changes();
        let before = *changes.borrow_and_update();

        store.request_add(&key("getItems"), CachedValue::Raw(json!([])));
        changes.changed().await.expect("sender alive");
        assert!(*changes.borrow_and_update() > before);
    }

    #[test]
    fn test_clear_and_remove() {
        let store = InMemoryCacheStore::default();
        store.request_add(&key("getItems"), CachedValue::Raw(json!(1)));
        assert!(store.remove_request(&key("getItems")).is_some());
        assert!(store.remove_request(&key("getItems")).is_none());

        store.base_item_add(vec![item("a", "A")]);
        store.clear();
        assert_eq!(store.stats().item_count, 0);
    }
}
