//! Receiving lifecycle of a single target

use serde::{Deserialize, Serialize};

/// State of one target's subscriptions with a dispatcher
///
/// State transitions:
/// ```text
/// Idle → Starting → Receiving → Stopped
///           │                      │
///           └──────→ Stopped       └──→ Starting (restart)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverState {
    /// Start has never been requested for the target
    #[default]
    Idle,
    /// Subscriptions are being registered with the event source
    Starting,
    /// All subscriptions are live
    Receiving,
    /// Stop was requested; no subscription may remain live
    Stopped,
}

impl ReceiverState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: ReceiverState) -> bool {
        use ReceiverState::*;
        matches!(
            (self, target),
            (Idle, Starting)
                | (Starting, Receiving)
                | (Starting, Stopped)
                | (Receiving, Stopped)
                // Restart
                | (Receiving, Starting)
                | (Stopped, Starting)
        )
    }

    /// Check if events are currently being delivered
    pub fn is_receiving(&self) -> bool {
        matches!(self, ReceiverState::Receiving)
    }
}

impl std::fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReceiverState::Idle => write!(f, "Idle"),
            ReceiverState::Starting => write!(f, "Starting"),
            ReceiverState::Receiving => write!(f, "Receiving"),
            ReceiverState::Stopped => write!(f, "Stopped"),
        }
    }
}
