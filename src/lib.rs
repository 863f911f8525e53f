//! Wavefleet process scaffolding.
//!
//! # Architecture Overview
//!
//! ```text
//!   wfcentral / wfdevice
//!          │
//!          ▼
//!   ┌─────────────┐    ┌──────────────┐    ┌──────────────────────┐
//!   │     cli     │───▶│   service    │───▶│      lifecycle       │
//!   │ flags + toml│    │ ServiceBuilder│   │ Coordinator: init →  │
//!   └─────────────┘    └──────┬───────┘    │ run → shutdown → exit│
//!                             │            └──────────┬───────────┘
//!                             ▼                       │
//!                      ┌──────────────┐               ▼
//!                      │   registry   │◀──────┐  ┌───────────┐
//!                      │ MemoryStore  │       └──│    api    │
//!                      │ per tenant   │          │ axum HTTP │
//!                      └──────────────┘          └───────────┘
//!
//!   Cross-cutting: config (schema, validation, tags), observability
//!   (JSON logging, Prometheus metrics)
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod service;

pub use config::{Role, ServiceConfig};
pub use lifecycle::{Coordinator, LifecycleError, LifecycleState, Shutdown, ShutdownReport};
pub use registry::{DeviceKey, DeviceRecord, MemoryStore, RegistryStore, StoreError};
pub use service::{Service, ServiceBuilder};
