//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

use wavefleet::config::Role;
use wavefleet::registry::error::StoreResult;
use wavefleet::registry::{DeviceRecord, MemoryStore, Page, PageToken, RegistryStore};
use wavefleet::ServiceBuilder;

/// Builder on an ephemeral port with its data directory inside `dir`.
pub fn builder(role: Role, dir: &TempDir) -> ServiceBuilder {
    let builder = ServiceBuilder::new(role)
        .with_port("0")
        .with_data_dir(dir.path().join("data"))
        .with_log_level("debug");
    match role {
        Role::Central => builder,
        Role::Device => builder.with_name("gw-1").with_tag_list("site=lab"),
    }
}

/// A termination future plus the sender that resolves it.
pub fn termination() -> (oneshot::Sender<()>, impl std::future::Future<Output = ()> + Send) {
    let (tx, rx) = oneshot::channel::<()>();
    (tx, async move {
        let _ = rx.await;
    })
}

/// Poll `check` until it holds or `limit` elapses.
pub async fn eventually<F>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Store whose writes never complete, so the run loop cannot unwind.
#[derive(Default)]
pub struct StuckStore {
    inner: MemoryStore,
}

#[async_trait]
impl RegistryStore for StuckStore {
    async fn create(&self, _record: DeviceRecord) -> StoreResult<DeviceRecord> {
        std::future::pending().await
    }

    async fn get(&self, tenant: &str, name: &str) -> StoreResult<DeviceRecord> {
        self.inner.get(tenant, name).await
    }

    async fn update(&self, _record: DeviceRecord) -> StoreResult<DeviceRecord> {
        std::future::pending().await
    }

    async fn delete(&self, tenant: &str, name: &str) -> StoreResult<()> {
        self.inner.delete(tenant, name).await
    }

    async fn list(
        &self,
        tenant: &str,
        page_token: Option<&PageToken>,
        page_size: usize,
    ) -> StoreResult<Page> {
        self.inner.list(tenant, page_token, page_size).await
    }
}
