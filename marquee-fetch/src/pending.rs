//! Calls recorded while offline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use marquee_api::Endpoint;
use marquee_core::{RequestArgs, RequestKey};

use crate::handle::HandleShared;

/// Which specialization issued a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Generic call; the response is stored verbatim.
    Raw,
    /// Item-oriented call; entities go to the shared entity cache.
    Items,
}

/// A dispatch attempted while offline.
#[derive(Clone)]
pub struct PendingCall {
    pub(crate) endpoint: Arc<dyn Endpoint>,
    pub(crate) method: String,
    pub(crate) args: RequestArgs,
    pub(crate) key: RequestKey,
    pub(crate) kind: CallKind,
    pub(crate) skip_cache: bool,
    pub(crate) handle: Arc<HandleShared>,
}

impl PendingCall {
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &RequestArgs {
        &self.args
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }
}

impl std::fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCall")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("skip_cache", &self.skip_cache)
            .finish()
    }
}

/// Unbounded FIFO of offline calls.
#[derive(Debug, Default)]
pub struct PendingQueue {
    calls: Mutex<VecDeque<PendingCall>>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: PendingCall) {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.push_back(call);
    }

    /// Take every queued call, oldest first, leaving the queue empty.
    pub fn drain(&self) -> Vec<PendingCall> {
        let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
