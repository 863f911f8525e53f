//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration and assemble the service
//! - Construct the logger from the validated settings
//! - Start the optional metrics exporter
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Configuration is checked before anything with side effects happens

use std::net::SocketAddr;

use crate::lifecycle::coordinator::LifecycleError;
use crate::observability::{metrics, Logger};
use crate::service::{Service, ServiceBuilder};

/// Everything the Running phase needs.
pub struct Initialized {
    pub service: Service,
    pub logger: Logger,
}

/// Run the Initializing phase.
pub fn initialize(builder: ServiceBuilder) -> Result<Initialized, LifecycleError> {
    let service = builder.build()?;

    let logger = Logger::init(
        service.role().component(),
        service.log_level(),
        service.config().log_file.as_deref(),
    )?;

    let entered = logger.span().enter();

    for pair in service.rejected_tags() {
        tracing::warn!(pair = %pair, "Dropping malformed tag, expected key=value");
    }

    if let Some(address) = &service.config().metrics_address {
        // Parsed during validation.
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| LifecycleError::Metrics(format!("bad address {}", address)))?;
        metrics::install_exporter(addr).map_err(LifecycleError::Metrics)?;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = service.port(),
        data_dir = %service.data_dir().display(),
        log_level = %service.log_level(),
        shutdown_timeout_secs = service.config().shutdown_timeout_secs,
        "Configuration loaded"
    );
    if let Ok(json) = serde_json::to_string(service.config()) {
        tracing::debug!(config = %json, "Effective configuration");
    }

    drop(entered);
    Ok(Initialized { service, logger })
}
