//! Service assembly and the serving loop.
//!
//! # Data Flow
//! ```text
//! ServiceBuilder (builder.rs)
//!     role defaults → with_* options (last write wins) → validate
//!     → Service (server.rs) owning the config snapshot and the RegistryStore
//!
//! Service::run
//!     create data dir → bind listener → [device: register + heartbeat.rs]
//!     → serve HTTP API until the shutdown signal → unwind tasks → return
//! ```
//!
//! # Design Decisions
//! - Building is side-effect free; filesystem and network work starts in `run`
//! - The store is only reachable through the `RegistryStore` operations

pub mod builder;
pub mod heartbeat;
pub mod server;

pub use builder::ServiceBuilder;
pub use heartbeat::Heartbeat;
pub use server::{Service, ServiceError};
