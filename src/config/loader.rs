//! Configuration loading from disk.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings read from a TOML file. Absent keys leave the role defaults alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(deserialize_with = "port_value")]
    pub port: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub name: Option<String>,
    pub control_plane: Option<String>,
    pub tags: Option<BTreeMap<String, String>>,
    pub tenant: Option<String>,
    pub shutdown_timeout_secs: Option<u64>,
    pub heartbeat_interval_secs: Option<u64>,
    pub metrics_address: Option<String>,
}

/// Accept `port = 8080` as well as `port = "8080"`.
fn port_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Text(String),
        Number(u64),
    }

    Ok(Option::<PortValue>::deserialize(deserializer)?.map(|value| match value {
        PortValue::Text(text) => text,
        PortValue::Number(number) => number.to_string(),
    }))
}

/// Parse configuration text.
pub fn parse_config(path: &Path, content: &str) -> Result<ConfigFile, LoadError> {
    toml::from_str(content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load configuration from a TOML file. Semantic validation happens when the service is built.
pub fn load_config(path: &Path) -> Result<ConfigFile, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &content)
}
