//! Property tests for request snapshots and entity-cache reads.

use std::sync::Arc;

use marquee_api::Endpoint;
use marquee_core::{ApiEnums, ItemId, StandardParams};
use marquee_fetch::Request;
use marquee_store::CacheStore;
use marquee_test_utils::generators::{arb_base_item, arb_params};
use marquee_test_utils::{memory_store, MockEndpoint};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn endpoint() -> Arc<dyn Endpoint> {
    Arc::new(MockEndpoint::new("items"))
}

proptest! {
    #[test]
    fn prop_snapshot_key_ignores_insertion_order(params in arb_params()) {
        let forward = Value::Object(params.clone());
        let reversed: Map<String, Value> = params.into_iter().rev().collect();

        let a = Request::new(endpoint(), "getItems").arg(forward).snapshot().map(|s| s.key());
        let b = Request::new(endpoint(), "getItems").arg(Value::Object(reversed)).snapshot().map(|s| s.key());
        prop_assert!(a.is_some());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_standard_params_keep_other_caller_keys(params in arb_params()) {
        let standard = StandardParams::from_enums(&ApiEnums::default(), true, Some(1)).with_user(Some("user-1".to_string()));
        let snapshot = Request::new(endpoint(), "getItems")
            .arg(Value::Object(params.clone()))
            .snapshot()
            .expect("fixed request has a snapshot");
        let injected = snapshot.args.with_standard_params(&standard);
        let merged = injected.params().expect("params object");

        let standard_keys = standard.to_map();
        for (key, value) in &params {
            if !standard_keys.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        for (key, value) in &standard_keys {
            prop_assert_eq!(merged.get(key), Some(value));
        }
    }

    #[test]
    fn prop_entity_lookup_preserves_requested_order(
        items in prop::collection::vec(arb_base_item(), 1..12),
    ) {
        let store = memory_store();
        store.base_item_add(items.clone());

        let mut ids: Vec<ItemId> = items.iter().map(|i| i.id.clone()).collect();
        ids.reverse();
        let found = store.get_items_by_id(&ids);
        let found_ids: Vec<ItemId> = found.iter().map(|i| i.id.clone()).collect();

        let mut expected = Vec::new();
        for id in ids {
            if !expected.contains(&id) {
                expected.push(id);
            }
        }
        let mut deduped_found = Vec::new();
        for id in found_ids {
            if !deduped_found.contains(&id) {
                deduped_found.push(id);
            }
        }
        prop_assert_eq!(deduped_found, expected);
    }
}
