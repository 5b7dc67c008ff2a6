//! Property-based tests for request key canonicalization.
//!
//! Deep-equal argument snapshots must map to the same key whatever order
//! their object fields were inserted in, and snapshots that differ in value
//! must map to different keys.

use marquee_core::{RequestArgs, RequestKey};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn params_strategy() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-zA-Z]{1,8}", any::<i64>(), 0..8)
}

fn build(entries: impl Iterator<Item = (String, i64)>) -> RequestArgs {
    let mut map = Map::new();
    for (k, v) in entries {
        map.insert(k, Value::from(v));
    }
    RequestArgs::new(vec![Value::Object(map)])
}

proptest! {
    #[test]
    fn prop_key_ignores_insertion_order(params in params_strategy()) {
        let forward = build(params.clone().into_iter());
        let backward = build(params.into_iter().rev());
        prop_assert_eq!(
            RequestKey::new("items", "getItems", &forward),
            RequestKey::new("items", "getItems", &backward)
        );
    }

    #[test]
    fn prop_key_tracks_value_changes(params in params_strategy(), extra in "[a-z]{9,12}", value in any::<i64>()) {
        let base = build(params.clone().into_iter());
        let mut changed_params = params;
        changed_params.insert(extra, value);
        let changed = build(changed_params.into_iter());
        prop_assert_ne!(base.canonical(), changed.canonical());
    }

    #[test]
    fn prop_canonical_form_is_valid_json(params in params_strategy(), tail in prop::collection::vec(any::<bool>(), 0..4)) {
        let mut values = vec![];
        let mut map = Map::new();
        for (k, v) in params {
            map.insert(k, Value::from(v));
        }
        values.push(Value::Object(map));
        values.extend(tail.into_iter().map(Value::Bool));
        let args = RequestArgs::new(values.clone());
        let parsed: Value = serde_json::from_str(&args.canonical()).expect("canonical output parses");
        prop_assert_eq!(parsed, Value::Array(values));
    }
}
