//! Handles returned to consumers of coordinated requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use marquee_core::{ItemData, LoadingState, RequestKey};
use marquee_store::{CacheStore, CachedRequest, CachedValue, RequestData};
use serde_json::Value;
use tokio::sync::watch;

/// State shared between a handle, its watcher and its in-flight calls.
pub(crate) struct HandleShared {
    store: Arc<dyn CacheStore>,
    loading: watch::Sender<LoadingState>,
    key: watch::Sender<Option<RequestKey>>,
    last_result: watch::Sender<Option<CachedValue>>,
    skip_cache: bool,
    queued: AtomicBool,
}

impl HandleShared {
    pub(crate) fn new(store: Arc<dyn CacheStore>, skip_cache: bool) -> Self {
        Self {
            store,
            loading: watch::channel(LoadingState::Idle).0,
            key: watch::channel(None).0,
            last_result: watch::channel(None).0,
            skip_cache,
            queued: AtomicBool::new(false),
        }
    }

    pub(crate) fn skip_cache(&self) -> bool {
        self.skip_cache
    }

    pub(crate) fn set_loading(&self, state: LoadingState) {
        self.loading.send_replace(state);
    }

    pub(crate) fn loading(&self) -> LoadingState {
        *self.loading.borrow()
    }

    pub(crate) fn set_key(&self, key: Option<RequestKey>) {
        self.key.send_replace(key);
    }

    pub(crate) fn key(&self) -> Option<RequestKey> {
        self.key.borrow().clone()
    }

    pub(crate) fn set_last_result(&self, value: CachedValue) {
        self.last_result.send_replace(Some(value));
    }

    pub(crate) fn mark_queued(&self) {
        self.queued.store(true, Ordering::SeqCst);
    }

    /// Whether a call was queued since the last check.
    pub(crate) fn take_queued(&self) -> bool {
        self.queued.swap(false, Ordering::SeqCst)
    }

    /// Current data view.
    ///
    /// Cache-skipping handles read their own last result. Everything else
    /// reads the store entry for the current key, so a cache hit is visible
    /// while a refresh is still in flight.
    fn current(&self) -> Option<RequestData> {
        if self.skip_cache {
            let value = self.last_result.borrow().clone()?;
            return self.store.get_request(&CachedRequest {
                value,
                stored_at: chrono::Utc::now(),
            });
        }
        let key = self.key()?;
        let entry = self.store.peek_cached_request(&key)?;
        self.store.get_request(&entry)
    }
}

/// Handle for a generic call.
#[derive(Clone)]
pub struct ApiHandle {
    shared: Arc<HandleShared>,
}

impl ApiHandle {
    pub(crate) fn new(shared: Arc<HandleShared>) -> Self {
        Self { shared }
    }

    /// The raw cached result for the current arguments.
    pub fn data(&self) -> Option<Value> {
        match self.shared.current()? {
            RequestData::Raw(value) => Some(value),
            RequestData::Items(_) => None,
        }
    }

    pub fn loading(&self) -> LoadingState {
        self.shared.loading()
    }

    pub fn loading_signal(&self) -> watch::Receiver<LoadingState> {
        self.shared.loading.subscribe()
    }

    /// Cache key for the current arguments; `None` while inert.
    pub fn key(&self) -> Option<RequestKey> {
        self.shared.key()
    }
}

/// Handle for an item-oriented call.
///
/// Data is always read back from the shared entity cache, so an entity
/// updated by any other call shows up here too.
#[derive(Clone)]
pub struct ItemHandle {
    shared: Arc<HandleShared>,
}

impl ItemHandle {
    pub(crate) fn new(shared: Arc<HandleShared>) -> Self {
        Self { shared }
    }

    pub fn data(&self) -> Option<ItemData> {
        match self.shared.current()? {
            RequestData::Items(items) => Some(items),
            RequestData::Raw(_) => None,
        }
    }

    pub fn loading(&self) -> LoadingState {
        self.shared.loading()
    }

    pub fn loading_signal(&self) -> watch::Receiver<LoadingState> {
        self.shared.loading.subscribe()
    }

    pub fn key(&self) -> Option<RequestKey> {
        self.shared.key()
    }
}
