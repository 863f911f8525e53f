//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the JSON log subscriber (stdout or file)
//! - Own the process span that tags every record with component and boot time
//!   (emitted through the `spans` list of each JSON line)
//! - Flush buffered file output on teardown
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level
//! - The global subscriber is installed at most once per process; later
//!   loggers (tests) reuse it

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogLevel;
use crate::registry::types::unix_millis;

/// Error type for logger construction.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path:?}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Logging context for one process lifetime.
///
/// Dropping it flushes any buffered file output.
pub struct Logger {
    component: &'static str,
    boot_time: SystemTime,
    span: Span,
    _file_guard: Option<WorkerGuard>,
}

impl Logger {
    /// Install the JSON subscriber and open the process span.
    pub fn init(
        component: &'static str,
        level: LogLevel,
        log_file: Option<&Path>,
    ) -> Result<Self, LoggingError> {
        let (writer, file_guard) = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| LoggingError::File {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(non_blocking), Some(guard))
            }
            None => (BoxMakeWriter::new(std::io::stdout), None),
        };

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(writer);

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .is_ok();

        let boot_time = SystemTime::now();
        let span = tracing::info_span!(
            "process",
            component = component,
            boot_ts = unix_millis::to_millis(&boot_time)
        );

        if !installed {
            tracing::debug!(component, "Log subscriber already installed, reusing it");
        }

        Ok(Self {
            component,
            boot_time,
            span,
            _file_guard: file_guard,
        })
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn boot_time(&self) -> SystemTime {
        self.boot_time
    }

    /// Span every record of this process should be emitted in.
    pub fn span(&self) -> &Span {
        &self.span
    }
}
