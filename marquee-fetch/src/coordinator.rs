//! Request coordination: cache lookup, refresh, offline queueing and replay.
//!
//! # Flow
//!
//! 1. Snapshot the request inputs and derive the cache key
//! 2. Expose any stored entry for that key straight away
//! 3. Dispatch a refresh when online, otherwise queue it
//! 4. Inside a [`ReactiveScope`], re-run on input changes and reconnects
//!
//! Errors never reach the caller. A rejected call shows up only as
//! [`LoadingState::Failed`] on the handle.

use std::sync::Arc;

use marquee_api::ApiConnection;
use marquee_core::{FetchConfig, ItemData, LoadingState, RequestKey};
use marquee_store::{CacheStore, CachedValue};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::connectivity::Connectivity;
use crate::handle::{ApiHandle, HandleShared, ItemHandle};
use crate::identity::{IdentityProvider, StaticIdentity};
use crate::notifications::{Notification, NotificationAction, NotificationLevel, Notifier, TracingNotifier};
use crate::pending::{CallKind, PendingCall, PendingQueue};
use crate::request::{FetchOptions, Request, RequestSnapshot};
use crate::scope::ReactiveScope;

struct Inner {
    conn: ApiConnection,
    store: Arc<dyn CacheStore>,
    connectivity: Connectivity,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    pending: PendingQueue,
    config: FetchConfig,
}

/// Coordinates requests against one connection and one cache store.
#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

/// Builder for [`RequestCoordinator`].
///
/// Without explicit collaborators the coordinator is always connected,
/// anonymous, and logs notifications through tracing.
pub struct CoordinatorBuilder {
    conn: ApiConnection,
    store: Arc<dyn CacheStore>,
    connectivity: Option<Connectivity>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    config: FetchConfig,
}

impl CoordinatorBuilder {
    pub fn connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Image flags, resolve timeout and the offline message. Field and image
    /// lists come from the store's `api_enums()`.
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RequestCoordinator {
        let connectivity = self
            .connectivity
            .unwrap_or_else(|| Connectivity::channel(true, true).1);
        RequestCoordinator {
            inner: Arc::new(Inner {
                conn: self.conn,
                store: self.store,
                connectivity,
                identity: self.identity,
                notifier: self.notifier,
                pending: PendingQueue::new(),
                config: self.config,
            }),
        }
    }
}

impl RequestCoordinator {
    pub fn builder(conn: ApiConnection, store: Arc<dyn CacheStore>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            conn,
            store,
            connectivity: None,
            identity: Arc::new(StaticIdentity::anonymous()),
            notifier: Arc::new(TracingNotifier),
            config: FetchConfig::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.inner.store
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.inner.connectivity
    }

    /// Number of calls waiting for connectivity.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.len()
    }

    /// Generic call: `data` is the raw cached result.
    pub async fn use_api(&self, request: Request, options: FetchOptions, scope: Option<&ReactiveScope>) -> ApiHandle {
        let shared = self.coordinate(request, options, CallKind::Raw, scope).await;
        ApiHandle::new(shared)
    }

    /// Item-oriented call: `data` is read from the shared entity cache.
    pub async fn use_base_item(
        &self,
        request: Request,
        options: FetchOptions,
        scope: Option<&ReactiveScope>,
    ) -> ItemHandle {
        let shared = self.coordinate(request, options, CallKind::Items, scope).await;
        ItemHandle::new(shared)
    }

    /// Dispatch every queued call, oldest first, and clear the queue.
    ///
    /// Does nothing while offline. Returns the number of calls dispatched.
    pub fn replay_pending(&self) -> usize {
        if !self.inner.connectivity.is_connected() {
            return 0;
        }
        let calls = self.inner.pending.drain();
        let count = calls.len();
        if count > 0 {
            tracing::debug!(count, "Replaying queued calls");
        }
        for call in calls {
            self.spawn_perform(call);
        }
        count
    }

    /// Replay the queue on every reconnect for as long as `scope` lives.
    pub fn replay_on_reconnect(&self, scope: &ReactiveScope) {
        let coordinator = self.clone();
        let mut connectivity = self.inner.connectivity.subscribe();
        scope.spawn(async move {
            loop {
                connectivity.reconnected().await;
                coordinator.replay_pending();
            }
        });
    }

    async fn coordinate(
        &self,
        request: Request,
        options: FetchOptions,
        kind: CallKind,
        scope: Option<&ReactiveScope>,
    ) -> Arc<HandleShared> {
        let shared = Arc::new(HandleShared::new(self.inner.store.clone(), options.skip_cache));

        let snapshot = request.snapshot();
        let key = snapshot.as_ref().map(RequestSnapshot::key);
        shared.set_key(key.clone());

        let cached = !options.skip_cache
            && key
                .as_ref()
                .is_some_and(|k| self.inner.store.get_cached_request(k).is_some());

        let first = snapshot.and_then(|s| self.trigger(s, kind, &shared));

        match scope {
            Some(scope) if key.is_some() || request.has_signals() => {
                self.spawn_watcher(scope, request, kind, shared.clone(), key.clone());
            }
            Some(_) => {}
            None => {
                if let Some(key) = &key {
                    tracing::debug!(key = %key, "No reactive scope; request will not refresh on changes");
                }
            }
        }

        let Some(key) = key else {
            return shared;
        };
        if cached {
            return shared;
        }

        if options.skip_cache {
            if let Some(attempt) = first {
                if let Err(err) = attempt.await {
                    tracing::warn!(key = %key, error = %err, "Request task failed");
                }
            }
            return shared;
        }

        let timeout = options.resolve_timeout.or_else(|| self.inner.config.resolve_timeout());
        let wait = self.wait_for_entry(&shared);
        match timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, wait).await.is_err() {
                    tracing::debug!(key = %key, timeout_ms = limit.as_millis() as u64, "Resolved without data");
                }
            }
            None => wait.await,
        }
        shared
    }

    /// Replay the queue, then dispatch or queue one call.
    ///
    /// Returns the task running the call when it was dispatched.
    fn trigger(&self, snapshot: RequestSnapshot, kind: CallKind, shared: &Arc<HandleShared>) -> Option<JoinHandle<()>> {
        shared.take_queued();
        self.replay_pending();

        let key = snapshot.key();
        let call = PendingCall {
            endpoint: snapshot.endpoint,
            method: snapshot.method,
            args: snapshot.args,
            key,
            kind,
            skip_cache: shared.skip_cache(),
            handle: shared.clone(),
        };

        if !self.inner.connectivity.is_connected() {
            tracing::debug!(key = %call.key, "Offline; queueing call");
            shared.mark_queued();
            self.inner.pending.push(call);
            self.inner.notifier.notify(
                Notification::new(NotificationLevel::Warning, self.inner.config.offline_message.as_str())
                    .with_action(NotificationAction::Reconnect),
            );
            return None;
        }
        Some(self.spawn_perform(call))
    }

    fn spawn_perform(&self, call: PendingCall) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.perform(call).await })
    }

    async fn perform(&self, call: PendingCall) {
        call.handle.set_loading(LoadingState::InFlight);
        self.inner.notifier.loading_started();

        let params = self
            .inner
            .config
            .standard_params(&self.inner.store.api_enums())
            .with_user(self.inner.identity.current_user_id());
        let args = call.args.with_standard_params(&params);

        tracing::debug!(endpoint = %call.endpoint.name(), method = %call.method, "Dispatching request");
        let outcome = call.endpoint.invoke(&self.inner.conn, &call.method, &args).await;
        self.inner.notifier.loading_finished();

        match outcome {
            Ok(envelope) => {
                self.store_result(&call, envelope.data);
                call.handle.set_loading(LoadingState::Idle);
            }
            Err(err) => {
                tracing::warn!(key = %call.key, error = %err, "Request failed");
                call.handle.set_loading(LoadingState::Failed);
            }
        }
    }

    fn store_result(&self, call: &PendingCall, body: Value) {
        let result = unwrap_items(body);
        if result.is_null() {
            tracing::debug!(key = %call.key, "Response carried no data");
            return;
        }

        let value = match call.kind {
            CallKind::Raw => CachedValue::Raw(result),
            CallKind::Items => match ItemData::from_value(result) {
                Ok(items) => {
                    let refs = items.refs();
                    self.inner.store.base_item_add(items.into_items());
                    CachedValue::Items(refs)
                }
                Err(err) => {
                    tracing::warn!(key = %call.key, error = %err, "Malformed item response");
                    return;
                }
            },
        };

        call.handle.set_last_result(value.clone());
        if !call.skip_cache {
            self.inner.store.request_add(&call.key, value);
        }
    }

    async fn wait_for_entry(&self, shared: &HandleShared) {
        let mut changes = self.inner.store.changes();
        loop {
            changes.borrow_and_update();
            if let Some(key) = shared.key() {
                if self.inner.store.peek_cached_request(&key).is_some() {
                    return;
                }
            }
            if changes.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    fn spawn_watcher(
        &self,
        scope: &ReactiveScope,
        mut request: Request,
        kind: CallKind,
        shared: Arc<HandleShared>,
        mut last_key: Option<RequestKey>,
    ) {
        let coordinator = self.clone();
        let mut connectivity = self.inner.connectivity.subscribe();
        scope.spawn(async move {
            loop {
                let input_changed = tokio::select! {
                    _ = request.changed() => true,
                    _ = connectivity.reconnected() => false,
                };

                let Some(snapshot) = request.snapshot() else {
                    last_key = None;
                    shared.set_key(None);
                    continue;
                };
                let key = snapshot.key();

                if input_changed {
                    if last_key.as_ref() == Some(&key) {
                        continue;
                    }
                } else {
                    // The replay covers this handle's own queued call.
                    let queued = shared.take_queued();
                    coordinator.replay_pending();
                    if queued {
                        continue;
                    }
                }

                tracing::debug!(key = %key, reconnect = !input_changed, "Re-running request");
                last_key = Some(key.clone());
                shared.set_key(Some(key));
                coordinator.trigger(snapshot, kind, &shared);
            }
        });
    }
}

/// List responses wrap their entries in `Items`.
fn unwrap_items(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("Items").is_some_and(Value::is_array) => {
            map.remove("Items").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_items_takes_list_payload() {
        let body = json!({"Items": [{"Id": "a"}], "TotalRecordCount": 1});
        assert_eq!(unwrap_items(body), json!([{"Id": "a"}]));
    }

    #[test]
    fn test_unwrap_items_keeps_other_bodies() {
        assert_eq!(unwrap_items(json!({"Id": "a"})), json!({"Id": "a"}));
        assert_eq!(unwrap_items(json!({"Items": 3})), json!({"Items": 3}));
        assert_eq!(unwrap_items(Value::Null), Value::Null);
    }
}
