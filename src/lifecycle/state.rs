//! Process lifecycle state machine.
//!
//! # States
//! ```text
//! Initializing → Running → ShuttingDown → Stopped
//!       │           │            │
//!       └───────────┴────────────┴──────→ Failed
//! Running → Stopped   (run loop returned on its own)
//! ```

use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
    /// Error exit.
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Initializing => "initializing",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Stopped | LifecycleState::Failed)
    }

    /// Whether `self → next` is an edge of the state machine.
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Initializing, Running) => true,
            (Running, ShuttingDown) | (Running, Stopped) => true,
            (ShuttingDown, Stopped) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publishes the current state to any number of observers.
#[derive(Debug)]
pub struct StateTracker {
    tx: watch::Sender<LifecycleState>,
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Initializing);
        Self { tx }
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Move to `next` if the edge exists. Illegal edges are logged and ignored.
    pub fn transition(&self, next: LifecycleState) -> bool {
        let mut from = self.current();
        let moved = self.tx.send_if_modified(|state| {
            from = *state;
            if state.can_transition_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });

        if moved {
            tracing::info!(from = %from, to = %next, "Lifecycle transition");
            metrics::record_transition(next.as_str());
        } else {
            tracing::warn!(from = %from, to = %next, "Ignoring illegal lifecycle transition");
        }
        moved
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
