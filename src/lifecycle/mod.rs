//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve the termination future
//!
//! Startup (startup.rs):
//!     Validate config → Build service → Logger → Metrics exporter
//!
//! Coordinator (coordinator.rs):
//!     Spawn run loop → wait for termination → trigger Shutdown
//!     → wait for run loop, bounded by the shutdown deadline
//!
//! State (state.rs):
//!     Initializing → Running → ShuttingDown → Stopped
//!     any non-terminal state → Failed
//! ```
//!
//! # Design Decisions
//! - Signal handlers are installed before initialization; an early signal is
//!   honoured as soon as the service is running
//! - Cancellation is a latched flag, so late subscribers still observe it
//! - A timed-out shutdown abandons the run loop and still exits cleanly

pub mod coordinator;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use coordinator::{Coordinator, LifecycleError, ShutdownReport, Termination};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::TerminationSignals;
pub use state::{LifecycleState, StateTracker};
