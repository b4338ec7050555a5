//! Booking lifecycle states.

use serde::{Deserialize, Serialize};

/// The state of a booking from the engine's point of view.
///
/// State transitions:
/// ```text
/// Draft ──► AwaitingPayment ──► Submitted ──┬──► Active ──► Cancelled
///   ▲              │                │  ▲    └──► Rejected
///   └──────────────┘ (edit)         └──┘ (transport failure, retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LifecycleState {
    /// Dates and room being chosen locally.
    #[default]
    Draft,

    /// Payment method and reference chosen, not yet sent.
    AwaitingPayment,

    /// Sent to the store; outcome not yet known.
    Submitted,

    /// Accepted by the store; the booking exists.
    Active,

    /// Declined by the store (terminal state).
    Rejected,

    /// Cancelled after being active (terminal state).
    Cancelled,
}

impl LifecycleState {
    /// Returns true if the stay or room may still be edited.
    pub fn can_edit(&self) -> bool {
        matches!(self, LifecycleState::Draft | LifecycleState::AwaitingPayment)
    }

    /// Returns true if the payment step can be entered.
    pub fn can_begin_payment(&self) -> bool {
        matches!(self, LifecycleState::Draft)
    }

    /// Returns true if the payment method can be switched.
    pub fn can_change_method(&self) -> bool {
        matches!(self, LifecycleState::AwaitingPayment)
    }

    /// Returns true if a self-service submission can be sent.
    pub fn can_submit(&self) -> bool {
        matches!(self, LifecycleState::AwaitingPayment)
    }

    /// Returns true if a staff submission (no payment step) can be sent.
    pub fn can_submit_on_behalf(&self) -> bool {
        matches!(self, LifecycleState::Draft)
    }

    /// Returns true if a store response is expected.
    pub fn can_record_outcome(&self) -> bool {
        matches!(self, LifecycleState::Submitted)
    }

    /// Returns true if the booking can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Rejected | LifecycleState::Cancelled)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Draft => "Draft",
            LifecycleState::AwaitingPayment => "AwaitingPayment",
            LifecycleState::Submitted => "Submitted",
            LifecycleState::Active => "Active",
            LifecycleState::Rejected => "Rejected",
            LifecycleState::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
