//! Standard request parameters injected into every dispatched call.
//!
//! Every call site asks the server for the same field selection and image
//! settings so that cached entities have one shape, whichever request
//! produced them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical field and image configuration owned by the cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEnums {
    pub fields: Vec<String>,
    pub image_types: Vec<String>,
}

impl Default for ApiEnums {
    fn default() -> Self {
        Self {
            fields: [
                "Overview",
                "Genres",
                "Tags",
                "Studios",
                "People",
                "ParentId",
                "PrimaryImageAspectRatio",
                "MediaSources",
                "MediaStreams",
                "ProviderIds",
                "DateCreated",
                "Chapters",
                "ChildCount",
                "RecursiveItemCount",
                "Width",
                "Height",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            image_types: ["Primary", "Backdrop", "Logo", "Thumb", "Banner", "Art"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Parameters merged into the first argument object on dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardParams {
    pub fields: Vec<String>,
    pub image_types: Vec<String>,
    pub enable_images: bool,
    pub image_type_limit: Option<u32>,
    pub user_id: Option<String>,
}

impl StandardParams {
    pub fn from_enums(enums: &ApiEnums, enable_images: bool, image_type_limit: Option<u32>) -> Self {
        Self {
            fields: enums.fields.clone(),
            image_types: enums.image_types.clone(),
            enable_images,
            image_type_limit,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Wire form, using the server's parameter names.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "fields".to_string(),
            Value::Array(self.fields.iter().cloned().map(Value::String).collect()),
        );
        map.insert(
            "enableImageTypes".to_string(),
            Value::Array(self.image_types.iter().cloned().map(Value::String).collect()),
        );
        map.insert("enableImages".to_string(), Value::Bool(self.enable_images));
        if let Some(limit) = self.image_type_limit {
            map.insert("imageTypeLimit".to_string(), Value::from(limit));
        }
        if let Some(user_id) = &self.user_id {
            map.insert("userId".to_string(), Value::String(user_id.clone()));
        }
        map.insert("enableTotalRecordCount".to_string(), Value::Bool(false));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_record_count_is_always_disabled() {
        let params = StandardParams::from_enums(&ApiEnums::default(), true, None);
        assert_eq!(params.to_map()["enableTotalRecordCount"], Value::Bool(false));
    }

    #[test]
    fn test_user_id_only_present_when_known() {
        let params = StandardParams::from_enums(&ApiEnums::default(), true, None);
        assert!(!params.to_map().contains_key("userId"));
        let params = params.with_user(Some("abc".to_string()));
        assert_eq!(params.to_map()["userId"], Value::String("abc".to_string()));
    }
}
