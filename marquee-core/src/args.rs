//! Argument snapshots and their canonical serialization.
//!
//! A snapshot is the ordered list of values passed to an endpoint method.
//! Two snapshots that are deep-equal must produce the same canonical string,
//! no matter how the objects inside them were built. Object keys are sorted
//! before writing, so the result does not depend on whether `serde_json` was
//! compiled with `preserve_order`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write as _;

use crate::params::StandardParams;

/// Ordered argument snapshot for a single endpoint call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestArgs(Vec<Value>);

impl RequestArgs {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first argument, when it is a parameter object.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.0.first().and_then(Value::as_object)
    }

    /// Canonical string form used in cache keys.
    pub fn canonical(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push('[');
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_canonical(&mut out, value);
        }
        out.push(']');
        out
    }

    /// Merge the standard parameters into the first argument object.
    ///
    /// Standard parameters win over caller-supplied keys of the same name.
    /// With no arguments at all, the standard parameters become the first
    /// argument. A non-object first argument is left untouched.
    pub fn with_standard_params(&self, params: &StandardParams) -> Self {
        let mut values = self.0.clone();
        match values.first_mut() {
            Some(Value::Object(map)) => {
                for (k, v) in params.to_map() {
                    map.insert(k, v);
                }
            }
            Some(_) => {}
            None => values.push(Value::Object(params.to_map())),
        }
        Self(values)
    }
}

impl From<Vec<Value>> for RequestArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// Write `value` as compact JSON with object keys in sorted order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Display on a JSON string value escapes it correctly.
                let _ = write!(out, "{}", Value::String(key.clone()));
                out.push(':');
                write_canonical(out, &map[key]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{}", scalar);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn standard() -> StandardParams {
        StandardParams {
            fields: vec!["Overview".to_string()],
            image_types: vec!["Primary".to_string()],
            enable_images: true,
            image_type_limit: Some(1),
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let a = RequestArgs::new(vec![json!({"b": 1, "a": {"y": [1, 2], "x": null}})]);
        assert_eq!(a.canonical(), r#"[{"a":{"x":null,"y":[1,2]},"b":1}]"#);
    }

    #[test]
    fn test_canonical_escapes_keys_and_strings() {
        let a = RequestArgs::new(vec![json!({"qu\"ote": "line\nbreak"})]);
        assert_eq!(a.canonical(), r#"[{"qu\"ote":"line\nbreak"}]"#);
    }

    #[test]
    fn test_empty_args_canonicalize_to_empty_list() {
        assert_eq!(RequestArgs::empty().canonical(), "[]");
    }

    #[test]
    fn test_standard_params_override_caller_values() {
        let args = RequestArgs::new(vec![json!({"parentId": "p", "enableTotalRecordCount": true})]);
        let merged = args.with_standard_params(&standard());
        let params = merged.params().expect("object params");
        assert_eq!(params["parentId"], json!("p"));
        assert_eq!(params["enableTotalRecordCount"], json!(false));
        assert_eq!(params["userId"], json!("u1"));
        assert_eq!(params["fields"], json!(["Overview"]));
    }

    #[test]
    fn test_standard_params_fill_empty_args() {
        let merged = RequestArgs::empty().with_standard_params(&standard());
        assert_eq!(merged.len(), 1);
        assert!(merged.params().is_some());
    }

    #[test]
    fn test_non_object_first_arg_is_untouched() {
        let args = RequestArgs::new(vec![json!("abc"), json!({"k": 1})]);
        let merged = args.with_standard_params(&standard());
        assert_eq!(merged, args);
    }

    #[test]
    fn test_injection_does_not_change_the_source_snapshot() {
        let args = RequestArgs::new(vec![json!({"parentId": "p"})]);
        let before = args.canonical();
        let _ = args.with_standard_params(&standard());
        assert_eq!(args.canonical(), before);
    }
}
