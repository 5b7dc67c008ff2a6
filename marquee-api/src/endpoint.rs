//! Endpoint factories: named groups of remote operations.
//!
//! An [`Endpoint`] binds a connection handle to a namespaced table of
//! methods. The coordinator only knows the endpoint's name (for cache keys)
//! and how to invoke a method by name with an argument snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{canonical_json, ApiError, RequestArgs};
use serde_json::{Map, Value};

use crate::transport::{ApiRequest, ClientCredentials, RestTransport, Transport, Verb};

/// Response envelope: every operation returns its body under `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub data: Value,
}

/// Connection handle shared by every endpoint.
#[derive(Clone)]
pub struct ApiConnection {
    transport: Arc<dyn Transport>,
}

impl ApiConnection {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Connect over HTTP with reqwest.
    pub fn rest(
        base_url: &str,
        credentials: &ClientCredentials,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let transport = RestTransport::new(base_url, credentials, request_timeout)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.transport.execute(request).await
    }
}

/// A namespaced set of named asynchronous operations.
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Namespace used to build cache keys.
    fn name(&self) -> &str;

    async fn invoke(
        &self,
        conn: &ApiConnection,
        method: &str,
        args: &RequestArgs,
    ) -> Result<ResponseEnvelope, ApiError>;
}

/// Route of a single method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: Verb,
    /// Path template; `{name}` segments are filled from the parameters,
    /// percent-encoded.
    pub path: String,
}

impl Route {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
        }
    }

    /// Resolve the route against an argument snapshot.
    ///
    /// The first argument object supplies path placeholders and query
    /// parameters; for verbs with a body, the second argument is sent as JSON.
    pub fn resolve(&self, endpoint: &str, method: &str, args: &RequestArgs) -> Result<ApiRequest, ApiError> {
        let mut params: Map<String, Value> = args.params().cloned().unwrap_or_default();
        let path = fill_path(&self.path, &mut params).map_err(|name| ApiError::MissingPathParam {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            name,
        })?;

        let mut query: Vec<(String, String)> = params
            .into_iter()
            .filter_map(|(k, v)| query_value(&v).map(|v| (k, v)))
            .collect();
        query.sort();

        let body = match self.verb {
            Verb::Get => None,
            _ => args.values().get(1).cloned(),
        };

        Ok(ApiRequest {
            verb: self.verb,
            path,
            query,
            body,
        })
    }
}

fn fill_path(template: &str, params: &mut Map<String, Value>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 1..start + len];
        let value = params
            .remove(name)
            .and_then(|v| query_value(&v))
            .ok_or_else(|| name.to_string())?;
        out.push_str(&urlencoding::encode(&value));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(query_value).collect();
            Some(parts.join(","))
        }
        Value::Object(_) => Some(canonical_json(value)),
    }
}

/// Endpoint backed by a method-name to [`Route`] table.
#[derive(Debug, Clone)]
pub struct RestEndpoint {
    name: String,
    routes: HashMap<String, Route>,
}

impl RestEndpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routes: HashMap::new(),
        }
    }

    pub fn route(mut self, method: impl Into<String>, verb: Verb, path: impl Into<String>) -> Self {
        self.routes.insert(method.into(), Route::new(verb, path));
        self
    }

    pub fn get(self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.route(method, Verb::Get, path)
    }

    pub fn post(self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.route(method, Verb::Post, path)
    }

    pub fn delete(self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.route(method, Verb::Delete, path)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn resolve(&self, method: &str, args: &RequestArgs) -> Result<ApiRequest, ApiError> {
        let route = self.routes.get(method).ok_or_else(|| ApiError::UnknownMethod {
            endpoint: self.name.clone(),
            method: method.to_string(),
        })?;
        route.resolve(&self.name, method, args)
    }
}

#[async_trait]
impl Endpoint for RestEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        conn: &ApiConnection,
        method: &str,
        args: &RequestArgs,
    ) -> Result<ResponseEnvelope, ApiError> {
        let request = self.resolve(method, args)?;
        let data = conn.execute(request).await?;
        Ok(ResponseEnvelope { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> RestEndpoint {
        RestEndpoint::new("user_library")
            .get("getItem", "/Items/{itemId}")
            .post("markFavoriteItem", "/UserFavoriteItems/{itemId}")
    }

    #[test]
    fn test_path_placeholders_are_removed_from_query() {
        let args = RequestArgs::new(vec![json!({"itemId": "abc", "userId": "u1"})]);
        let request = library().resolve("getItem", &args).expect("resolves");
        assert_eq!(request.path, "/Items/abc");
        assert_eq!(request.query, vec![("userId".to_string(), "u1".to_string())]);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_arrays_join_with_commas_and_nulls_drop() {
        let args = RequestArgs::new(vec![json!({
            "itemId": "abc",
            "fields": ["Overview", "Genres"],
            "limit": 10,
            "parentId": null
        })]);
        let request = library().resolve("getItem", &args).expect("resolves");
        assert_eq!(
            request.query,
            vec![
                ("fields".to_string(), "Overview,Genres".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_missing_path_param_is_reported() {
        let err = library()
            .resolve("getItem", &RequestArgs::new(vec![json!({})]))
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::MissingPathParam {
                endpoint: "user_library".to_string(),
                method: "getItem".to_string(),
                name: "itemId".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_method_is_reported() {
        let err = library().resolve("nope", &RequestArgs::empty()).unwrap_err();
        assert!(matches!(err, ApiError::UnknownMethod { .. }));
    }

    #[test]
    fn test_post_sends_second_argument_as_body() {
        let args = RequestArgs::new(vec![json!({"itemId": "abc"}), json!({"IsFavorite": true})]);
        let request = library().resolve("markFavoriteItem", &args).expect("resolves");
        assert_eq!(request.verb, Verb::Post);
        assert_eq!(request.body, Some(json!({"IsFavorite": true})));
    }

    #[test]
    fn test_path_values_are_percent_encoded() {
        let endpoint = RestEndpoint::new("persons").get("getPerson", "/Persons/{name}");
        let args = RequestArgs::new(vec![json!({"name": "AC/DC"})]);
        let request = endpoint.resolve("getPerson", &args).expect("resolves");
        assert_eq!(request.path, "/Persons/AC%2FDC");

        let args = RequestArgs::new(vec![json!({"name": "What? #1 & Co"})]);
        let request = endpoint.resolve("getPerson", &args).expect("resolves");
        assert_eq!(request.path, "/Persons/What%3F%20%231%20%26%20Co");
        assert!(request.query.is_empty());
    }
}
