//! Multi-tenant device registry.
//!
//! # Data Flow
//! ```text
//! Caller (service, heartbeat, HTTP API)
//!     → store.rs (RegistryStore contract)
//!     → memory.rs (MemoryStore backend, tenant-sharded)
//!     → types.rs (DeviceRecord copies handed back, never references)
//!
//! Listing:
//!     pager.rs → RegistryStore::list → Page { records, next_page_token }
//! ```
//!
//! # Design Decisions
//! - The store exclusively owns every record; callers only see clones
//! - Timestamps are stamped by the store, caller-supplied values are ignored
//! - Listing is snapshot-at-read, ordered by device name
//! - The in-memory backend keeps nothing across restarts; this is intended

pub mod error;
pub mod memory;
pub mod pager;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pager::Pager;
pub use store::RegistryStore;
pub use types::{DeviceKey, DeviceRecord, Page, PageToken};
