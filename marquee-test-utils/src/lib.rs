//! Marquee Test Utilities
//!
//! Shared test infrastructure for the Marquee workspace:
//! - Mock endpoints and transports with scripted responses
//! - Proptest generators for argument snapshots and items
//! - Fixtures for media-server payloads

pub use marquee_api::{ApiConnection, ApiRequest, Endpoint, ResponseEnvelope, Transport};
pub use marquee_core::{ApiEnums, ApiError, BaseItem, ItemData, ItemId, RequestArgs, RequestKey};
pub use marquee_store::{CacheStore, InMemoryCacheStore};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Notify, Semaphore};

// ============================================================================
// MOCK ENDPOINT
// ============================================================================

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub args: RequestArgs,
}

#[derive(Debug, Clone)]
enum Scripted {
    Respond(Value),
    Fail(String),
}

#[derive(Debug, Default)]
struct Script {
    once: HashMap<String, VecDeque<Scripted>>,
    always: HashMap<String, Scripted>,
}

/// Endpoint with scripted responses and call recording.
///
/// One-shot responses are consumed first, then the standing response for
/// the method. A gated endpoint holds every call until [`MockEndpoint::release`]
/// hands out permits.
#[derive(Debug)]
pub struct MockEndpoint {
    name: String,
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
    called: Notify,
    gate: Option<Semaphore>,
}

impl MockEndpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Vec::new()),
            called: Notify::new(),
            gate: None,
        }
    }

    /// Every call blocks until released.
    pub fn gated(name: impl Into<String>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(name)
        }
    }

    pub fn respond(self, method: &str, body: Value) -> Self {
        self.set_response(method, body);
        self
    }

    pub fn fail(self, method: &str, message: &str) -> Self {
        self.set_failure(method, message);
        self
    }

    pub fn set_response(&self, method: &str, body: Value) {
        let mut script = self.script.lock().unwrap();
        script.always.insert(method.to_string(), Scripted::Respond(body));
    }

    pub fn set_failure(&self, method: &str, message: &str) {
        let mut script = self.script.lock().unwrap();
        script.always.insert(method.to_string(), Scripted::Fail(message.to_string()));
    }

    pub fn respond_once(&self, method: &str, body: Value) {
        let mut script = self.script.lock().unwrap();
        script
            .once
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Respond(body));
    }

    pub fn fail_once(&self, method: &str, message: &str) {
        let mut script = self.script.lock().unwrap();
        script
            .once
            .entry(method.to_string())
            .or_default()
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Let `n` held calls through.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, method: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.method == method).collect()
    }

    /// Wait until at least `n` calls have been recorded.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if self.call_count() >= n {
                return;
            }
            notified.await;
        }
    }

    fn next_response(&self, method: &str) -> Option<Scripted> {
        let mut script = self.script.lock().unwrap();
        if let Some(queued) = script.once.get_mut(method).and_then(VecDeque::pop_front) {
            return Some(queued);
        }
        script.always.get(method).cloned()
    }
}

#[async_trait]
impl Endpoint for MockEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(
        &self,
        _conn: &ApiConnection,
        method: &str,
        args: &RequestArgs,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            args: args.clone(),
        });
        self.called.notify_waiters();

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match self.next_response(method) {
            Some(Scripted::Respond(data)) => Ok(ResponseEnvelope { data }),
            Some(Scripted::Fail(message)) => Err(ApiError::RequestFailed {
                url: format!("mock://{}/{}", self.name, method),
                status: 500,
                message,
            }),
            None => Err(ApiError::UnknownMethod {
                endpoint: self.name.clone(),
                method: method.to_string(),
            }),
        }
    }
}

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// Transport answering by request path, recording every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses.lock().unwrap().insert(path.to_string(), body);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = self.responses.lock().unwrap().get(&request.path).cloned();
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);
        response.ok_or_else(|| ApiError::RequestFailed {
            url: path,
            status: 404,
            message: "no scripted response".to_string(),
        })
    }
}

/// Connection over a fresh [`MockTransport`].
pub fn mock_connection() -> ApiConnection {
    ApiConnection::new(Arc::new(MockTransport::new()))
}

/// Store with default enums behind the trait object the coordinator takes.
pub fn memory_store() -> Arc<InMemoryCacheStore> {
    Arc::new(InMemoryCacheStore::new(ApiEnums::default()))
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;
    use serde_json::Map;

    pub fn arb_item_id() -> impl Strategy<Value = ItemId> {
        "[a-f0-9]{32}".prop_map(ItemId::new)
    }

    /// JSON scalars that survive a round trip through serde_json unchanged.
    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _-]{0,16}".prop_map(Value::String),
        ]
    }

    /// Query-style parameter object.
    pub fn arb_params() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map("[a-zA-Z]{1,12}", arb_scalar(), 0..8)
            .prop_map(|m| m.into_iter().collect())
    }

    pub fn arb_base_item() -> impl Strategy<Value = BaseItem> {
        let kinds = prop_oneof![Just("Movie"), Just("Episode"), Just("Series")];
        (arb_item_id(), "[A-Za-z ]{1,24}", kinds)
            .prop_map(|(id, name, kind)| fixtures::item_with_type(id.as_str(), &name, kind))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use serde_json::json;

    pub fn item_json(id: &str, name: &str) -> Value {
        json!({"Id": id, "Name": name, "Type": "Movie"})
    }

    pub fn item_with_type(id: &str, name: &str, item_type: &str) -> BaseItem {
        let value = json!({"Id": id, "Name": name, "Type": item_type});
        BaseItem::from_value(value).expect("fixture item is valid")
    }

    pub fn item(id: &str, name: &str) -> BaseItem {
        item_with_type(id, name, "Movie")
    }

    /// List response the way the server wraps it.
    pub fn items_response(items: &[(&str, &str)]) -> Value {
        let items: Vec<Value> = items.iter().map(|(id, name)| item_json(id, name)).collect();
        let total = items.len();
        json!({
            "Items": items,
            "TotalRecordCount": total,
            "StartIndex": 0,
        })
    }
}
