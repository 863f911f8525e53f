//! In-memory registry backend.
//!
//! # Responsibilities
//! - Hold device records in process memory, sharded by tenant
//! - Serve as the bootstrap store and the standard test double
//!
//! # Design Decisions
//! - One `DashMap` shard lock per tenant: readers share it, writers hold it exclusively
//! - Records are ordered by name inside a tenant (`BTreeMap`) so listing needs no sort
//! - No durability: everything is gone when the process exits

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::observability::metrics;
use crate::registry::error::{StoreError, StoreResult};
use crate::registry::store::{effective_page_size, RegistryStore};
use crate::registry::types::{DeviceKey, DeviceRecord, Page, PageToken};

type TenantShard = BTreeMap<String, DeviceRecord>;

/// A thread-safe, process-local registry store.
///
/// Cloning is cheap and every clone sees the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tenants: Arc<DashMap<String, TenantShard>>,
    devices: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all tenants.
    pub fn len(&self) -> usize {
        self.devices.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tenants currently holding at least one record.
    pub fn tenant_count(&self) -> usize {
        self.tenants.len()
    }

    fn finish<T>(&self, op: &'static str, result: StoreResult<T>) -> StoreResult<T> {
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_store_op(op, outcome);
        result
    }

    fn validate_tenant(tenant: &str) -> StoreResult<()> {
        if tenant.trim().is_empty() {
            return Err(StoreError::InvalidKey("tenant must not be empty".to_string()));
        }
        Ok(())
    }

    fn insert(&self, mut record: DeviceRecord) -> StoreResult<DeviceRecord> {
        let key = record.key();
        key.validate()?;

        let now = SystemTime::now();
        record.created_at = now;
        record.modified_at = now;

        let mut shard = self.tenants.entry(record.tenant.clone()).or_default();
        match shard.entry(record.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(key)),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                let total = self.devices.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::record_device_count(total);
                Ok(record)
            }
        }
    }

    fn replace(&self, record: DeviceRecord) -> StoreResult<DeviceRecord> {
        let key = record.key();
        key.validate()?;

        let mut shard = self
            .tenants
            .get_mut(&record.tenant)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let existing = shard
            .get_mut(&record.name)
            .ok_or(StoreError::NotFound(key))?;

        existing.tags = record.tags;
        existing.control_plane = record.control_plane;
        existing.modified_at = SystemTime::now().max(existing.modified_at);
        Ok(existing.clone())
    }

    fn remove(&self, tenant: &str, name: &str) -> StoreResult<()> {
        let key = DeviceKey::new(tenant, name);
        key.validate()?;

        let removed = match self.tenants.get_mut(tenant) {
            Some(mut shard) => shard.remove(name).is_some(),
            None => false,
        };
        if !removed {
            return Err(StoreError::NotFound(key));
        }

        // Checked again under the shard lock, a concurrent create may have refilled it.
        self.tenants.remove_if(tenant, |_, shard| shard.is_empty());
        let total = self.devices.fetch_sub(1, Ordering::Relaxed) - 1;
        metrics::record_device_count(total);
        Ok(())
    }

    fn page(&self, tenant: &str, page_token: Option<&PageToken>, page_size: usize) -> StoreResult<Page> {
        Self::validate_tenant(tenant)?;
        let after = page_token.map(PageToken::last_name).transpose()?;
        let size = effective_page_size(page_size);

        let mut records: Vec<DeviceRecord> = match self.tenants.get(tenant) {
            Some(shard) => {
                let lower = match after.as_deref() {
                    Some(name) => Bound::Excluded(name),
                    None => Bound::Unbounded,
                };
                shard
                    .range::<str, _>((lower, Bound::Unbounded))
                    .take(size + 1)
                    .map(|(_, record)| record.clone())
                    .collect()
            }
            None => Vec::new(),
        };

        let next_page_token = if records.len() > size {
            records.truncate(size);
            records.last().map(|record| PageToken::after(&record.name))
        } else {
            None
        };

        Ok(Page {
            records,
            next_page_token,
        })
    }
}

#[async_trait]
impl RegistryStore for MemoryStore {
    async fn create(&self, record: DeviceRecord) -> StoreResult<DeviceRecord> {
        let result = self.insert(record);
        if let Ok(created) = &result {
            tracing::debug!(device = %created.key(), "Device created");
        }
        self.finish("create", result)
    }

    async fn get(&self, tenant: &str, name: &str) -> StoreResult<DeviceRecord> {
        let key = DeviceKey::new(tenant, name);
        let result = key.validate().and_then(|_| {
            self.tenants
                .get(tenant)
                .and_then(|shard| shard.get(name).cloned())
                .ok_or(StoreError::NotFound(key))
        });
        self.finish("get", result)
    }

    async fn update(&self, record: DeviceRecord) -> StoreResult<DeviceRecord> {
        let result = self.replace(record);
        self.finish("update", result)
    }

    async fn delete(&self, tenant: &str, name: &str) -> StoreResult<()> {
        let result = self.remove(tenant, name);
        if result.is_ok() {
            tracing::debug!(tenant = %tenant, device = %name, "Device deleted");
        }
        self.finish("delete", result)
    }

    async fn list(
        &self,
        tenant: &str,
        page_token: Option<&PageToken>,
        page_size: usize,
    ) -> StoreResult<Page> {
        let result = self.page(tenant, page_token, page_size);
        self.finish("list", result)
    }
}
