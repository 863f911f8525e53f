//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! role defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → explicit CLI flags (applied as builder options, last write wins)
//!     → validation.rs (every violated constraint collected)
//!     → ServiceConfig (validated, immutable, owned by the Service)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the service is built
//! - Every field has a per-role default so an empty file is valid
//! - Validation separates syntactic (serde/clap) from semantic checks
//! - Filesystem checks on the data directory are deferred to first use

pub mod loader;
pub mod schema;
pub mod tags;
pub mod validation;

pub use loader::{load_config, ConfigFile, LoadError};
pub use schema::{LogLevel, Role, ServiceConfig};
pub use tags::{parse_tags, ParsedTags};
pub use validation::{validate_config, ConfigurationError, ValidationError};
