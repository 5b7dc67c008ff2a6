//! Loading signal for a single coordinated request.

use serde::{Deserialize, Serialize};

/// Tri-state loading signal.
///
/// `Failed` is distinct from both `Idle` and `InFlight`: it means the last
/// attempt was rejected and nothing newer has started since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadingState {
    #[default]
    Idle,
    InFlight,
    Failed,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Boolean view where the failure sentinel maps to `None`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Idle => Some(false),
            Self::InFlight => Some(true),
            Self::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_is_neither_true_nor_false() {
        assert_eq!(LoadingState::Failed.as_flag(), None);
        assert_eq!(LoadingState::Idle.as_flag(), Some(false));
        assert_eq!(LoadingState::InFlight.as_flag(), Some(true));
    }
}
