//! Current-user identity injected into outgoing requests.

use tokio::sync::watch;

pub trait IdentityProvider: Send + Sync {
    /// Identifier of the authenticated user, if any.
    fn current_user_id(&self) -> Option<String>;
}

/// Identity that never changes.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<String>);

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Identity that follows login/logout through a watch channel.
impl IdentityProvider for watch::Receiver<Option<String>> {
    fn current_user_id(&self) -> Option<String> {
        self.borrow().clone()
    }
}
