//! Lifetime owner for watcher tasks.

use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;

/// Owns the watcher tasks registered by coordinated requests.
///
/// Closing or dropping the scope aborts every watcher. Requests those
/// watchers already dispatched run to completion.
#[derive(Debug, Default)]
pub struct ReactiveScope {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReactiveScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// Number of live watchers.
    pub fn len(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ReactiveScope {
    fn drop(&mut self) {
        self.close();
    }
}
