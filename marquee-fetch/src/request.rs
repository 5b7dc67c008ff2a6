//! Request inputs and per-call options.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::select_all;
use marquee_api::Endpoint;
use marquee_core::{RequestArgs, RequestKey};
use serde_json::Value;
use tokio::sync::watch;

use crate::reactive::Reactive;

/// Endpoint, method and argument sources of a coordinated request.
///
/// Each part is either fixed or follows a watch channel. A request whose
/// endpoint or method is currently `None` is inert.
#[derive(Clone)]
pub struct Request {
    endpoint: Reactive<Option<Arc<dyn Endpoint>>>,
    method: Reactive<Option<String>>,
    args: Vec<Reactive<Value>>,
}

/// Values read from a [`Request`] at one trigger.
#[derive(Clone)]
pub struct RequestSnapshot {
    pub endpoint: Arc<dyn Endpoint>,
    pub method: String,
    pub args: RequestArgs,
}

impl RequestSnapshot {
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.endpoint.name(), self.method.as_str(), &self.args)
    }
}

impl Request {
    pub fn new(endpoint: Arc<dyn Endpoint>, method: impl Into<String>) -> Self {
        Self {
            endpoint: Reactive::Fixed(Some(endpoint)),
            method: Reactive::Fixed(Some(method.into())),
            args: Vec::new(),
        }
    }

    /// A request that never dispatches anything.
    pub fn inert() -> Self {
        Self {
            endpoint: Reactive::Fixed(None),
            method: Reactive::Fixed(None),
            args: Vec::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: watch::Receiver<Option<Arc<dyn Endpoint>>>) -> Self {
        self.endpoint = Reactive::Signal(endpoint);
        self
    }

    pub fn with_method(mut self, method: watch::Receiver<Option<String>>) -> Self {
        self.method = Reactive::Signal(method);
        self
    }

    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(Reactive::Fixed(value));
        self
    }

    pub fn arg_signal(mut self, value: watch::Receiver<Value>) -> Self {
        self.args.push(Reactive::Signal(value));
        self
    }

    /// Read every input. `None` while the endpoint or method is unset.
    pub fn snapshot(&self) -> Option<RequestSnapshot> {
        let endpoint = self.endpoint.get()?;
        let method = self.method.get()?;
        let args = RequestArgs::new(self.args.iter().map(Reactive::get).collect());
        Some(RequestSnapshot {
            endpoint,
            method,
            args,
        })
    }

    pub fn has_signals(&self) -> bool {
        self.endpoint.is_signal() || self.method.is_signal() || self.args.iter().any(Reactive::is_signal)
    }

    /// Wait until any signal-backed input changes. Never returns for a
    /// request built only from fixed values.
    pub async fn changed(&mut self) {
        let mut waits: Vec<Pin<Box<dyn Future<Output = ()> + Send + '_>>> = Vec::new();
        if self.endpoint.is_signal() {
            waits.push(Box::pin(self.endpoint.changed()));
        }
        if self.method.is_signal() {
            waits.push(Box::pin(self.method.changed()));
        }
        for arg in self.args.iter_mut().filter(|a| a.is_signal()) {
            waits.push(Box::pin(arg.changed()));
        }
        if waits.is_empty() {
            std::future::pending::<()>().await;
        }
        select_all(waits).await;
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Do not write the result to the request cache; resolve after the
    /// first attempt instead of waiting for a cache entry.
    pub skip_cache: bool,
    /// Bound on the wait for first data. Overrides the configured default.
    pub resolve_timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn skip_cache() -> Self {
        Self {
            skip_cache: true,
            ..Default::default()
        }
    }

    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = Some(timeout);
        self
    }
}
