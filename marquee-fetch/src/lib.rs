//! Marquee Fetch - reactive request/cache coordination
//!
//! [`RequestCoordinator`] turns an endpoint, a method name and a list of
//! argument sources into a handle with a loading signal and a data view
//! backed by the injected [`marquee_store::CacheStore`].
//!
//! - Cached data is visible immediately while a refresh runs
//! - Calls made offline are queued and replayed on reconnect
//! - Inside a [`ReactiveScope`], requests re-run when their inputs change

pub mod connectivity;
pub mod coordinator;
pub mod handle;
pub mod identity;
pub mod notifications;
pub mod pending;
pub mod reactive;
pub mod request;
pub mod scope;

pub use connectivity::{Connectivity, ConnectivityControl};
pub use coordinator::{CoordinatorBuilder, RequestCoordinator};
pub use handle::{ApiHandle, ItemHandle};
pub use identity::{IdentityProvider, StaticIdentity};
pub use notifications::{
    ChannelNotifier, NoopNotifier, Notification, NotificationAction, NotificationLevel, Notifier, TracingNotifier,
    UiSignal,
};
pub use pending::{CallKind, PendingCall, PendingQueue};
pub use reactive::Reactive;
pub use request::{FetchOptions, Request, RequestSnapshot};
pub use scope::ReactiveScope;
