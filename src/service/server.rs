//! Runnable service.
//!
//! # Responsibilities
//! - Own the validated configuration snapshot and the registry store
//! - Prepare the data directory on first use
//! - Bind the listener and serve the HTTP API
//! - Register the device and keep its record fresh (device role)
//! - Unwind every task it started once cancellation is requested

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::Instrument;

use crate::api::{self, ApiState};
use crate::config::{LogLevel, Role, ServiceConfig};
use crate::lifecycle::{LifecycleState, ShutdownSignal};
use crate::registry::{DeviceRecord, RegistryStore, StoreError};
use crate::service::heartbeat::Heartbeat;

/// Errors that end the serving loop.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("cannot prepare data directory {path:?}: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },

    #[error("server error: {0}")]
    Serve(std::io::Error),

    #[error("device registration failed: {0}")]
    Registration(StoreError),
}

/// A fully assembled, not yet running service.
pub struct Service {
    role: Role,
    config: ServiceConfig,
    port: u16,
    data_dir: PathBuf,
    log_level: LogLevel,
    store: Arc<dyn RegistryStore>,
    rejected_tags: Vec<String>,
}

impl Service {
    pub(crate) fn new(
        role: Role,
        config: ServiceConfig,
        port: u16,
        data_dir: PathBuf,
        log_level: LogLevel,
        store: Arc<dyn RegistryStore>,
        rejected_tags: Vec<String>,
    ) -> Self {
        Self {
            role,
            config,
            port,
            data_dir,
            log_level,
            store,
            rejected_tags,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Absolute data directory. May not exist until the service runs.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.config.shutdown_timeout_secs)
    }

    /// Tag pairs dropped while parsing the tag list.
    pub fn rejected_tags(&self) -> &[String] {
        &self.rejected_tags
    }

    /// Shared handle to the registry; only its documented operations are exposed.
    pub fn store(&self) -> Arc<dyn RegistryStore> {
        self.store.clone()
    }

    /// The record this device agent registers for itself.
    pub fn device_record(&self) -> Option<DeviceRecord> {
        if self.role != Role::Device {
            return None;
        }
        let name = self.config.name.clone()?;
        let mut record =
            DeviceRecord::new(self.config.tenant.clone(), name).with_tags(self.config.tags.clone());
        if let Some(address) = &self.config.control_plane {
            record = record.with_control_plane(address.clone());
        }
        Some(record)
    }

    fn prepare_data_dir(&self) -> Result<(), ServiceError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| ServiceError::DataDir {
            path: self.data_dir.clone(),
            source,
        })
    }

    async fn register(&self, record: DeviceRecord) -> Result<DeviceRecord, ServiceError> {
        let registered = match self.store.create(record.clone()).await {
            Ok(created) => created,
            Err(StoreError::AlreadyExists(_)) => self
                .store
                .update(record)
                .await
                .map_err(ServiceError::Registration)?,
            Err(e) => return Err(ServiceError::Registration(e)),
        };
        tracing::info!(
            device = %registered.key(),
            tags = registered.tags.len(),
            control_plane = registered.control_plane.as_deref().unwrap_or("-"),
            "Device registered"
        );
        Ok(registered)
    }

    /// Serve until `shutdown` fires, then unwind and return.
    pub async fn run(
        self,
        shutdown: ShutdownSignal,
        state: watch::Receiver<LifecycleState>,
    ) -> Result<(), ServiceError> {
        self.prepare_data_dir()?;

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], self.port)))
            .await
            .map_err(|source| ServiceError::Bind {
                port: self.port,
                source,
            })?;
        let local_addr = listener.local_addr().map_err(ServiceError::Serve)?;

        tracing::info!(
            address = %local_addr,
            data_dir = %self.data_dir.display(),
            "Listening for connections"
        );

        let heartbeat = match self.device_record() {
            Some(record) => {
                let registered = self.register(record).await?;
                let beat = Heartbeat::new(
                    self.store.clone(),
                    registered,
                    Duration::from_secs(self.config.heartbeat_interval_secs),
                );
                Some(tokio::spawn(beat.run(shutdown.clone()).in_current_span()))
            }
            None => None,
        };

        let app = api::router(ApiState {
            store: self.store.clone(),
            component: self.role.component(),
            state,
            span: tracing::Span::current(),
        });

        let mut graceful = shutdown.clone();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move { graceful.wait().await })
            .await
            .map_err(ServiceError::Serve);

        if let Some(handle) = heartbeat {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Heartbeat task ended abnormally");
            }
        }

        served?;
        tracing::info!("Service stopped");
        Ok(())
    }
}
