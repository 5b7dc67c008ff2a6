//! Canonical media entity and helpers for item-oriented responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ValidationError;

/// Server-assigned identifier of a media entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A media entity as returned by the server.
///
/// Only the identity fields are typed; everything else is kept verbatim so
/// that a record written by one call site round-trips unchanged to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseItem {
    #[serde(rename = "Id")]
    pub id: ItemId,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl BaseItem {
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::InvalidValue {
                field: "item".to_string(),
                reason: "expected an object".to_string(),
            });
        }
        if value.get("Id").and_then(Value::as_str).is_none() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "Id".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| ValidationError::InvalidValue {
            field: "item".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Entities extracted from one item-oriented response.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    Single(BaseItem),
    List(Vec<BaseItem>),
}

impl ItemData {
    /// Parse a response result as a single entity or a list of entities.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Array(values) => values
                .into_iter()
                .map(BaseItem::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            other => BaseItem::from_value(other).map(Self::Single),
        }
    }

    pub fn refs(&self) -> ItemRefs {
        match self {
            Self::Single(item) => ItemRefs::Single(item.id.clone()),
            Self::List(items) => ItemRefs::List(items.iter().map(|i| i.id.clone()).collect()),
        }
    }

    pub fn items(&self) -> Vec<&BaseItem> {
        match self {
            Self::Single(item) => vec![item],
            Self::List(items) => items.iter().collect(),
        }
    }

    pub fn into_items(self) -> Vec<BaseItem> {
        match self {
            Self::Single(item) => vec![item],
            Self::List(items) => items,
        }
    }
}

/// Identifiers stored for an item-oriented request, preserving its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemRefs {
    Single(ItemId),
    List(Vec<ItemId>),
}

impl ItemRefs {
    pub fn ids(&self) -> Vec<ItemId> {
        match self {
            Self::Single(id) => vec![id.clone()],
            Self::List(ids) => ids.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_keeps_unknown_fields() {
        let item = BaseItem::from_value(json!({
            "Id": "a1",
            "Name": "Heat",
            "Type": "Movie",
            "ProductionYear": 1995
        }))
        .expect("valid item");
        assert_eq!(item.id.as_str(), "a1");
        assert_eq!(item.field("ProductionYear"), Some(&json!(1995)));

        let back = serde_json::to_value(&item).expect("serialize");
        assert_eq!(back["ProductionYear"], json!(1995));
        assert_eq!(back["Id"], json!("a1"));
    }

    #[test]
    fn test_item_without_id_is_rejected() {
        let err = BaseItem::from_value(json!({"Name": "x"})).unwrap_err();
        assert!(matches!(err, ValidationError::RequiredFieldMissing { .. }));
    }

    #[test]
    fn test_list_response_keeps_order() {
        let data = ItemData::from_value(json!([{"Id": "b"}, {"Id": "a"}])).expect("valid list");
        assert_eq!(
            data.refs(),
            ItemRefs::List(vec![ItemId::from("b"), ItemId::from("a")])
        );
    }

    #[test]
    fn test_scalar_response_is_not_an_item() {
        assert!(ItemData::from_value(json!(42)).is_err());
    }
}
