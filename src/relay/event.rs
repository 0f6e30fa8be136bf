//! Device events.

use tokio::sync::broadcast;

use super::register::{Pin, RelayBankState};
use crate::error::{Error, ErrorKind};

/// Events buffered per subscriber before the slowest one starts lagging.
pub const EVENT_CAPACITY: usize = 64;

/// Operation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Operation {
    GetState,
    SetState,
    SetPin,
    ToggleRelay,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetState => write!(f, "get_state"),
            Self::SetState => write!(f, "set_state"),
            Self::SetPin => write!(f, "set_pin"),
            Self::ToggleRelay => write!(f, "toggle_relay"),
        }
    }
}

/// A failed operation, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorEvent {
    pub fn new(operation: Operation, error: &Error) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Something the controller observed on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Full register read.
    StateRead(RelayBankState),
    /// Full register written; carries the echoed state.
    StateSet(RelayBankState),
    /// One pin written; carries the echoed value.
    PinSet { pin: Pin, value: bool },
    /// An operation failed.
    Error(ErrorEvent),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateRead(_) => "state_read",
            Self::StateSet(_) => "state_set",
            Self::PinSet { .. } => "pin_set",
            Self::Error(_) => "error",
        }
    }
}

/// Broadcast fan-out of [`Event`]s.
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, event: Event) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            tracing::debug!(target: "daenet::relay", { event = name }, "event dropped, no subscribers");
        }
    }
}
