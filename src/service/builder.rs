//! Service assembler.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::validation::{parse_port, resolve_data_dir};
use crate::config::{
    parse_tags, validate_config, ConfigFile, ConfigurationError, LogLevel, Role, ServiceConfig,
};
use crate::registry::{MemoryStore, RegistryStore};
use crate::service::server::Service;

/// Builds a [`Service`] from role defaults plus any number of options.
///
/// Options are applied in call order and the last one wins, so the order
/// of unrelated options never matters.
pub struct ServiceBuilder {
    role: Role,
    config: ServiceConfig,
    store: Option<Arc<dyn RegistryStore>>,
    rejected_tags: Vec<String>,
}

impl ServiceBuilder {
    /// Start from the defaults of `role`.
    pub fn new(role: Role) -> Self {
        Self::from_config(role, ServiceConfig::for_role(role))
    }

    /// Start from an existing configuration snapshot.
    pub fn from_config(role: Role, config: ServiceConfig) -> Self {
        Self {
            role,
            config,
            store: None,
            rejected_tags: Vec::new(),
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.config.port = port.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = data_dir.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = level.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn with_control_plane(mut self, address: impl Into<String>) -> Self {
        self.config.control_plane = Some(address.into());
        self
    }

    /// Replace the tag set.
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.config.tags = tags;
        self.rejected_tags.clear();
        self
    }

    /// Replace the tag set from a `k=v,k=v` list, dropping malformed pairs.
    pub fn with_tag_list(mut self, list: &str) -> Self {
        let parsed = parse_tags(list);
        self.config.tags = parsed.tags;
        self.rejected_tags = parsed.rejected;
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.config.tenant = tenant.into();
        self
    }

    pub fn with_shutdown_timeout_secs(mut self, secs: u64) -> Self {
        self.config.shutdown_timeout_secs = secs;
        self
    }

    pub fn with_heartbeat_interval_secs(mut self, secs: u64) -> Self {
        self.config.heartbeat_interval_secs = secs;
        self
    }

    pub fn with_metrics_address(mut self, address: impl Into<String>) -> Self {
        self.config.metrics_address = Some(address.into());
        self
    }

    /// Use a caller-supplied store instead of a fresh [`MemoryStore`].
    pub fn with_store(mut self, store: Arc<dyn RegistryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Apply every key present in a config file.
    pub fn with_file(self, file: ConfigFile) -> Self {
        let ConfigFile {
            port,
            data_dir,
            log_level,
            log_file,
            name,
            control_plane,
            tags,
            tenant,
            shutdown_timeout_secs,
            heartbeat_interval_secs,
            metrics_address,
        } = file;

        let mut builder = self;
        if let Some(v) = port {
            builder = builder.with_port(v);
        }
        if let Some(v) = data_dir {
            builder = builder.with_data_dir(v);
        }
        if let Some(v) = log_level {
            builder = builder.with_log_level(v);
        }
        if let Some(v) = log_file {
            builder = builder.with_log_file(v);
        }
        if let Some(v) = name {
            builder = builder.with_name(v);
        }
        if let Some(v) = control_plane {
            builder = builder.with_control_plane(v);
        }
        if let Some(v) = tags {
            builder = builder.with_tags(v);
        }
        if let Some(v) = tenant {
            builder = builder.with_tenant(v);
        }
        if let Some(v) = shutdown_timeout_secs {
            builder = builder.with_shutdown_timeout_secs(v);
        }
        if let Some(v) = heartbeat_interval_secs {
            builder = builder.with_heartbeat_interval_secs(v);
        }
        if let Some(v) = metrics_address {
            builder = builder.with_metrics_address(v);
        }
        builder
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The configuration as it stands before validation.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate and assemble. Reports every violated constraint at once.
    pub fn build(self) -> Result<Service, ConfigurationError> {
        validate_config(self.role, &self.config)
            .map_err(|violations| ConfigurationError { violations })?;

        // Both were just validated.
        let port = parse_port(&self.config.port).unwrap_or_default();
        let data_dir = resolve_data_dir(&self.config.data_dir)
            .map_err(|e| ConfigurationError { violations: vec![e] })?;
        let log_level = self.config.log_level.parse::<LogLevel>().unwrap_or_default();

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        Ok(Service::new(
            self.role,
            self.config,
            port,
            data_dir,
            log_level,
            store,
            self.rejected_tags,
        ))
    }
}
