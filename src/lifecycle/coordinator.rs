//! Lifecycle coordinator.
//!
//! Drives one process from configuration to exit:
//!
//! ```text
//! install signal handlers
//!     → Initializing: build service, logger, exporter     (error → Failed)
//!     → Running: spawn run loop, notify ready hook
//!     → first of { run loop returns, termination signal }
//!     → ShuttingDown: trigger cancellation, race run loop against deadline
//!     → Stopped (or Failed if the run loop errored)
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinError;
use tracing::Instrument;

use crate::config::{ConfigurationError, LoadError, Role};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::TerminationSignals;
use crate::lifecycle::startup::{self, Initialized};
use crate::lifecycle::state::{LifecycleState, StateTracker};
use crate::observability::LoggingError;
use crate::service::{Service, ServiceBuilder, ServiceError};

/// Future that resolves when the process should shut down.
pub type Termination = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Fatal lifecycle errors. Every variant maps to a non-zero exit status.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("cannot load configuration: {0}")]
    Load(#[from] LoadError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("metrics exporter failed: {0}")]
    Metrics(String),

    #[error("cannot install signal handlers: {0}")]
    Signals(std::io::Error),

    #[error("run loop failed: {0}")]
    RunLoop(#[from] ServiceError),

    #[error("run loop panicked: {0}")]
    RunLoopPanicked(String),
}

impl LifecycleError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// A termination signal started the shutdown.
    pub signaled: bool,
    /// The service did not unwind before the deadline.
    pub timed_out: bool,
}

/// Runs a service from initialization to a bounded graceful shutdown.
pub struct Coordinator {
    role: Role,
    shutdown_timeout: Option<Duration>,
    ready: Option<oneshot::Sender<()>>,
    termination: Option<Termination>,
    state: StateTracker,
}

impl Coordinator {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            shutdown_timeout: None,
            ready: None,
            termination: None,
            state: StateTracker::new(),
        }
    }

    /// Override the configured shutdown deadline.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Signalled exactly once when the service enters `Running`.
    pub fn with_ready_notifier(mut self, ready: oneshot::Sender<()>) -> Self {
        self.ready = Some(ready);
        self
    }

    /// Use `termination` instead of OS signals to start the shutdown.
    pub fn with_termination<F>(mut self, termination: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.termination = Some(Box::pin(termination));
        self
    }

    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Run until the service stops.
    pub async fn run(mut self, builder: ServiceBuilder) -> Result<ShutdownReport, LifecycleError> {
        if builder.role() != self.role {
            tracing::warn!(
                coordinator = %self.role,
                builder = %builder.role(),
                "Builder role differs from coordinator role"
            );
        }

        // Handlers go in before anything else so an early signal is latched.
        let termination: Termination = match self.termination.take() {
            Some(termination) => termination,
            None => match TerminationSignals::install() {
                Ok(signals) => Box::pin(async move {
                    let name = signals.recv().await;
                    tracing::info!(signal = name, "Termination signal received");
                }),
                Err(e) => {
                    self.state.transition(LifecycleState::Failed);
                    return Err(LifecycleError::Signals(e));
                }
            },
        };

        let Initialized { service, logger } = match startup::initialize(builder) {
            Ok(initialized) => initialized,
            Err(e) => {
                self.state.transition(LifecycleState::Failed);
                return Err(e);
            }
        };

        let span = logger.span().clone();
        let result = self.drive(service, termination).instrument(span).await;

        // Flushes file output.
        drop(logger);
        result
    }

    async fn drive(
        mut self,
        service: Service,
        mut termination: Termination,
    ) -> Result<ShutdownReport, LifecycleError> {
        let deadline = self.shutdown_timeout.unwrap_or_else(|| service.shutdown_timeout());
        let shutdown = Shutdown::new();

        self.state.transition(LifecycleState::Running);
        let mut run = tokio::spawn(
            service
                .run(shutdown.subscribe(), self.state.subscribe())
                .in_current_span(),
        );
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(());
        }

        tokio::select! {
            joined = &mut run => {
                tracing::info!("Run loop returned without a termination signal");
                return self.finish(joined, false);
            }
            _ = &mut termination => {}
        }
        drop(termination);

        self.state.transition(LifecycleState::ShuttingDown);
        let started = Instant::now();
        shutdown.trigger();

        match tokio::time::timeout(deadline, &mut run).await {
            Ok(joined) => {
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Service unwound before the deadline"
                );
                self.finish(joined, true)
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = deadline.as_secs_f64(),
                    "Shutdown deadline elapsed, no longer waiting for the service"
                );
                run.abort();
                self.state.transition(LifecycleState::Stopped);
                Ok(ShutdownReport {
                    signaled: true,
                    timed_out: true,
                })
            }
        }
    }

    fn finish(
        &self,
        joined: Result<Result<(), ServiceError>, JoinError>,
        signaled: bool,
    ) -> Result<ShutdownReport, LifecycleError> {
        match joined {
            Ok(Ok(())) => {
                self.state.transition(LifecycleState::Stopped);
                tracing::info!("Shutdown complete");
                Ok(ShutdownReport {
                    signaled,
                    timed_out: false,
                })
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Run loop failed");
                self.state.transition(LifecycleState::Failed);
                Err(LifecycleError::RunLoop(e))
            }
            Err(e) => {
                tracing::error!(error = %e, "Run loop panicked");
                self.state.transition(LifecycleState::Failed);
                Err(LifecycleError::RunLoopPanicked(e.to_string()))
            }
        }
    }
}
