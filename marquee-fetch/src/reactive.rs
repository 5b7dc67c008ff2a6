//! Fixed or signal-backed inputs.

use tokio::sync::watch;

/// An input that is either a fixed value or follows a watch channel.
#[derive(Debug, Clone)]
pub enum Reactive<T> {
    Fixed(T),
    Signal(watch::Receiver<T>),
}

impl<T: Clone> Reactive<T> {
    /// Current value, read fresh.
    pub fn get(&self) -> T {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Signal(rx) => rx.borrow().clone(),
        }
    }

    pub fn is_signal(&self) -> bool {
        matches!(self, Self::Signal(_))
    }

    /// Wait for the next change. Fixed values, and signals whose sender is
    /// gone, never change.
    pub async fn changed(&mut self) {
        match self {
            Self::Fixed(_) => std::future::pending::<()>().await,
            Self::Signal(rx) => {
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await
                }
            }
        }
    }
}
