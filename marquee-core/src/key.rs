//! Cache keys for stored request results.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::args::RequestArgs;

/// Address of a stored request result: endpoint, method and canonical args.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub endpoint: String,
    pub method: String,
    pub args: String,
}

impl RequestKey {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>, args: &RequestArgs) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            args: args.canonical(),
        }
    }

    /// The endpoint/method half of the key, without arguments.
    pub fn operation(&self) -> String {
        format!("{}.{}", self.endpoint, self.method)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.endpoint, self.method, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_includes_all_parts() {
        let key = RequestKey::new("items", "getItems", &RequestArgs::new(vec![json!({"a": 1})]));
        assert_eq!(key.to_string(), r#"items.getItems[{"a":1}]"#);
        assert_eq!(key.operation(), "items.getItems");
    }

    #[test]
    fn test_different_methods_do_not_collide() {
        let args = RequestArgs::new(vec![json!({"a": 1})]);
        assert_ne!(
            RequestKey::new("items", "getItems", &args),
            RequestKey::new("items", "getResumeItems", &args)
        );
    }
}
