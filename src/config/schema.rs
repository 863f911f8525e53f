//! Configuration schema definitions.
//!
//! Both processes share one [`ServiceConfig`] shape; the [`Role`] decides the
//! defaults and which fields are required.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which process is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Central control plane (`wfcentral`).
    Central,
    /// Per-device agent (`wfdevice`).
    Device,
}

impl Role {
    /// Component name used in logs and the default data directory.
    pub fn component(&self) -> &'static str {
        match self {
            Role::Central => "wfcentral",
            Role::Device => "wfdevice",
        }
    }

    pub fn default_port(&self) -> &'static str {
        match self {
            Role::Central => "8080",
            Role::Device => "9090",
        }
    }

    pub fn default_data_dir(&self) -> PathBuf {
        PathBuf::from(format!("/var/lib/{}", self.component()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component())
    }
}

/// Accepted log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration for either process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// TCP port to listen on, as given by the operator.
    pub port: String,

    /// Directory for local state. Created on first use.
    pub data_dir: PathBuf,

    /// One of debug, info, warn, error.
    pub log_level: String,

    /// Write JSON logs here instead of stdout.
    pub log_file: Option<PathBuf>,

    /// Device name (required for the device agent).
    pub name: Option<String>,

    /// Address of the control plane the device reports to.
    pub control_plane: Option<String>,

    /// Free-form device tags.
    pub tags: BTreeMap<String, String>,

    /// Tenant the device registers under.
    pub tenant: String,

    /// Upper bound on graceful shutdown.
    pub shutdown_timeout_secs: u64,

    /// How often the device agent refreshes its own record.
    pub heartbeat_interval_secs: u64,

    /// Prometheus exporter bind address, disabled when unset.
    pub metrics_address: Option<String>,
}

impl ServiceConfig {
    /// Defaults for the given process.
    pub fn for_role(role: Role) -> Self {
        Self {
            port: role.default_port().to_string(),
            data_dir: role.default_data_dir(),
            log_level: LogLevel::default().as_str().to_string(),
            log_file: None,
            name: None,
            control_plane: None,
            tags: BTreeMap::new(),
            tenant: "default".to_string(),
            shutdown_timeout_secs: 5,
            heartbeat_interval_secs: 30,
            metrics_address: None,
        }
    }
}
