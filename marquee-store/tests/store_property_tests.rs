//! Property tests for the in-memory cache store.

use std::collections::HashMap;

use marquee_core::{BaseItem, ItemId};
use marquee_store::{CacheStore, InMemoryCacheStore};
use proptest::prelude::*;
use serde_json::json;

fn item(id: &str, name: &str) -> BaseItem {
    BaseItem::from_value(json!({"Id": id, "Name": name})).expect("valid item")
}

fn arb_writes() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-e]", "[a-z]{1,8}"), 1..32)
}

proptest! {
    #[test]
    fn prop_latest_write_wins_per_id(writes in arb_writes()) {
        let store = InMemoryCacheStore::default();
        let mut expected: HashMap<String, String> = HashMap::new();
        for (id, name) in &writes {
            store.base_item_add(vec![item(id, name)]);
            expected.insert(id.clone(), name.clone());
        }

        prop_assert_eq!(store.stats().item_count, expected.len() as u64);
        for (id, name) in &expected {
            let stored = store.get_item_by_id(&ItemId::from(id.as_str()));
            prop_assert_eq!(stored.and_then(|i| i.name), Some(name.clone()));
        }
    }

    #[test]
    fn prop_lookup_keeps_requested_order_and_skips_missing(
        present in prop::collection::hash_set("[a-j]", 0..10),
        requested in prop::collection::vec("[a-m]", 0..20),
    ) {
        let store = InMemoryCacheStore::default();
        store.base_item_add(present.iter().map(|id| item(id, id)).collect());

        let ids: Vec<ItemId> = requested.iter().map(|id| ItemId::from(id.as_str())).collect();
        let found: Vec<String> = store
            .get_items_by_id(&ids)
            .into_iter()
            .filter_map(|i| i.name)
            .collect();
        let expected: Vec<String> = requested.into_iter().filter(|id| present.contains(id)).collect();
        prop_assert_eq!(found, expected);
    }
}
