//! Command-line surface shared by `wfcentral` and `wfdevice`.
//!
//! Precedence, lowest first: role defaults, `--config` file, flags.

use clap::{Args, Parser};
use std::path::PathBuf;

use crate::config::{load_config, LoadError, Role};
use crate::service::ServiceBuilder;

/// Flags understood by both processes.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// TCP port to listen on
    #[arg(short, long)]
    pub port: Option<String>,

    /// Directory for local state
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// One of debug, info, warn, error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write JSON logs to this file instead of stdout
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Serve Prometheus metrics on this host:port
    #[arg(long)]
    pub metrics_address: Option<String>,

    /// Upper bound on graceful shutdown, in seconds
    #[arg(long)]
    pub shutdown_timeout_secs: Option<u64>,
}

impl CommonArgs {
    fn into_builder(self, role: Role) -> Result<ServiceBuilder, LoadError> {
        let mut builder = ServiceBuilder::new(role);
        if let Some(path) = &self.config {
            builder = builder.with_file(load_config(path)?);
        }
        if let Some(v) = self.port {
            builder = builder.with_port(v);
        }
        if let Some(v) = self.data_dir {
            builder = builder.with_data_dir(v);
        }
        if let Some(v) = self.log_level {
            builder = builder.with_log_level(v);
        }
        if let Some(v) = self.log_file {
            builder = builder.with_log_file(v);
        }
        if let Some(v) = self.metrics_address {
            builder = builder.with_metrics_address(v);
        }
        if let Some(v) = self.shutdown_timeout_secs {
            builder = builder.with_shutdown_timeout_secs(v);
        }
        Ok(builder)
    }
}

#[derive(Debug, Parser)]
#[command(name = "wfcentral")]
#[command(about = "Wavefleet control plane", version, long_about = None)]
pub struct CentralArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl CentralArgs {
    pub fn into_builder(self) -> Result<ServiceBuilder, LoadError> {
        self.common.into_builder(Role::Central)
    }
}

#[derive(Debug, Parser)]
#[command(name = "wfdevice")]
#[command(about = "Wavefleet device agent", version, long_about = None)]
pub struct DeviceArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Device name, unique within the tenant
    #[arg(short, long)]
    pub name: Option<String>,

    /// Control plane address (host:port)
    #[arg(long)]
    pub control_plane: Option<String>,

    /// Comma-separated key=value tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Tenant to register under
    #[arg(long)]
    pub tenant: Option<String>,

    /// Seconds between heartbeats
    #[arg(long)]
    pub heartbeat_interval_secs: Option<u64>,
}

impl DeviceArgs {
    pub fn into_builder(self) -> Result<ServiceBuilder, LoadError> {
        let mut builder = self.common.into_builder(Role::Device)?;
        if let Some(v) = self.name {
            builder = builder.with_name(v);
        }
        if let Some(v) = self.control_plane {
            builder = builder.with_control_plane(v);
        }
        if let Some(v) = self.tags {
            builder = builder.with_tag_list(&v);
        }
        if let Some(v) = self.tenant {
            builder = builder.with_tenant(v);
        }
        if let Some(v) = self.heartbeat_interval_secs {
            builder = builder.with_heartbeat_interval_secs(v);
        }
        Ok(builder)
    }
}

/// Exit status for a flag parsing failure.
///
/// `--help` and `--version` are not failures and exit 0; every other
/// parse error is a configuration error and exits 1.
pub fn parse_error_exit_code(e: &clap::Error) -> u8 {
    if e.use_stderr() {
        1
    } else {
        0
    }
}
