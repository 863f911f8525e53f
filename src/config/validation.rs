//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntactic)
//! - Validate value ranges (ports, durations, addresses)
//! - Enforce role-specific requirements (device name)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: (Role, &ServiceConfig) → Result<(), Vec<ValidationError>>
//! - No filesystem access; the data directory only has to be resolvable

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::{LogLevel, Role, ServiceConfig};

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port {0:?} is not a valid TCP port")]
    InvalidPort(String),

    #[error("data directory must not be empty")]
    EmptyDataDir,

    #[error("data directory {path:?} cannot be resolved: {reason}")]
    UnresolvableDataDir { path: PathBuf, reason: String },

    #[error("log level {0:?} is not one of debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("device name is required")]
    MissingName,

    #[error("control-plane address {0:?} must be host:port")]
    InvalidControlPlane(String),

    #[error("tenant must not be empty")]
    EmptyTenant,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Every constraint a configuration violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub violations: Vec<ValidationError>,
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration: ")?;
        for (i, err) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationError {}

/// Parse a TCP port string. `0` is accepted and means "any free port".
pub fn parse_port(port: &str) -> Option<u16> {
    let port = port.trim();
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok()
}

/// Resolve the data directory to an absolute path without touching the filesystem.
pub fn resolve_data_dir(path: &Path) -> Result<PathBuf, ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDataDir);
    }
    std::path::absolute(path).map_err(|e| ValidationError::UnresolvableDataDir {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn is_host_port(address: &str) -> bool {
    match address.trim().rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && parse_port(port).is_some_and(|p| p != 0),
        None => false,
    }
}

/// Check a configuration for the given role.
pub fn validate_config(role: Role, config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if parse_port(&config.port).is_none() {
        errors.push(ValidationError::InvalidPort(config.port.clone()));
    }

    if let Err(e) = resolve_data_dir(&config.data_dir) {
        errors.push(e);
    }

    if config.log_level.parse::<LogLevel>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.log_level.clone()));
    }

    if role == Role::Device {
        let named = config.name.as_deref().is_some_and(|n| !n.trim().is_empty());
        if !named {
            errors.push(ValidationError::MissingName);
        }
        if config.tenant.trim().is_empty() {
            errors.push(ValidationError::EmptyTenant);
        }
    }

    if let Some(address) = &config.control_plane {
        if !is_host_port(address) {
            errors.push(ValidationError::InvalidControlPlane(address.clone()));
        }
    }

    if config.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("shutdown_timeout_secs"));
    }
    if config.heartbeat_interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("heartbeat_interval_secs"));
    }

    if let Some(address) = &config.metrics_address {
        if address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(address.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_config() -> ServiceConfig {
        let mut config = ServiceConfig::for_role(Role::Device);
        config.name = Some("sensor-1".into());
        config
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(Role::Central, &ServiceConfig::for_role(Role::Central)).is_ok());
        assert!(validate_config(Role::Device, &device_config()).is_ok());
    }

    #[test]
    fn test_port_syntax() {
        assert_eq!(parse_port("8080"), Some(8080));
        assert_eq!(parse_port("0"), Some(0));
        assert_eq!(parse_port("65535"), Some(65535));
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("+80"), None);
        assert_eq!(parse_port("http"), None);
        assert_eq!(parse_port(""), None);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = ServiceConfig::for_role(Role::Central);
        config.log_level = "verbose".into();

        let errors = validate_config(Role::Central, &config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidLogLevel("verbose".into())]);
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = ServiceConfig::for_role(Role::Device);
        config.port = "80a".into();
        config.data_dir = PathBuf::new();
        config.log_level = "loud".into();
        config.control_plane = Some("no-port".into());
        config.shutdown_timeout_secs = 0;
        config.metrics_address = Some("nowhere".into());

        let errors = validate_config(Role::Device, &config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidPort("80a".into()),
                ValidationError::EmptyDataDir,
                ValidationError::InvalidLogLevel("loud".into()),
                ValidationError::MissingName,
                ValidationError::InvalidControlPlane("no-port".into()),
                ValidationError::ZeroDuration("shutdown_timeout_secs"),
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );

        let message = ConfigurationError { violations: errors }.to_string();
        assert!(message.contains("80a"));
        assert!(message.contains("device name is required"));
    }

    #[test]
    fn test_name_only_required_for_device() {
        let central = ServiceConfig::for_role(Role::Central);
        assert!(central.name.is_none());
        assert!(validate_config(Role::Central, &central).is_ok());

        let mut device = device_config();
        device.name = Some("   ".into());
        assert_eq!(
            validate_config(Role::Device, &device).unwrap_err(),
            vec![ValidationError::MissingName]
        );
    }

    #[test]
    fn test_control_plane_addresses() {
        assert!(is_host_port("central.local:8080"));
        assert!(is_host_port("10.0.0.1:8080"));
        assert!(is_host_port("[::1]:8080"));
        assert!(!is_host_port("central.local"));
        assert!(!is_host_port(":8080"));
        assert!(!is_host_port("central:0"));
    }

    #[test]
    fn test_relative_data_dir_resolves() {
        let resolved = resolve_data_dir(Path::new("state")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("state"));
    }
}
