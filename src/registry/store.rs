//! Registry store contract.

use async_trait::async_trait;

use crate::registry::error::StoreResult;
use crate::registry::types::{DeviceRecord, Page, PageToken};

/// Default page size when a caller passes `0`.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound applied to caller page sizes.
pub const MAX_PAGE_SIZE: usize = 1_000;

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn effective_page_size(requested: usize) -> usize {
    match requested {
        0 => DEFAULT_PAGE_SIZE,
        n => n.min(MAX_PAGE_SIZE),
    }
}

/// Tenant-scoped device registry.
///
/// Every operation is atomic with respect to every other: a read never
/// observes a partially written record. Records go in and come out by value.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Insert a new record, stamping both timestamps.
    ///
    /// Fails with `AlreadyExists` if the (tenant, name) key is taken.
    async fn create(&self, record: DeviceRecord) -> StoreResult<DeviceRecord>;

    /// Fetch the current record or fail with `NotFound`.
    async fn get(&self, tenant: &str, name: &str) -> StoreResult<DeviceRecord>;

    /// Replace the mutable attributes of an existing record and refresh `modified_at`.
    async fn update(&self, record: DeviceRecord) -> StoreResult<DeviceRecord>;

    /// Remove a record, failing with `NotFound` if absent.
    async fn delete(&self, tenant: &str, name: &str) -> StoreResult<()>;

    /// One page of a tenant's records, ordered by name.
    async fn list(
        &self,
        tenant: &str,
        page_token: Option<&PageToken>,
        page_size: usize,
    ) -> StoreResult<Page>;
}
