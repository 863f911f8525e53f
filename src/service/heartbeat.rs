//! Device heartbeat.
//!
//! # Responsibilities
//! - Periodically refresh the device's own record
//! - Re-create the record if something deleted it meanwhile

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::registry::{DeviceRecord, RegistryStore, StoreError};

pub struct Heartbeat {
    store: Arc<dyn RegistryStore>,
    record: DeviceRecord,
    interval: Duration,
}

impl Heartbeat {
    pub fn new(store: Arc<dyn RegistryStore>, record: DeviceRecord, interval: Duration) -> Self {
        Self {
            store,
            record,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::debug!(
            device = %self.record.key(),
            interval_secs = self.interval.as_secs_f64(),
            "Heartbeat starting"
        );

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.beat().await;
                }
                _ = shutdown.wait() => {
                    tracing::debug!("Heartbeat received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Refresh the record once.
    pub async fn beat(&self) {
        let outcome = match self.store.update(self.record.clone()).await {
            Ok(_) => "ok",
            Err(StoreError::NotFound(_)) => match self.store.create(self.record.clone()).await {
                Ok(_) => {
                    tracing::warn!(device = %self.record.key(), "Device record was missing, re-registered");
                    "recreated"
                }
                Err(e) => {
                    tracing::warn!(device = %self.record.key(), error = %e, "Heartbeat re-registration failed");
                    "error"
                }
            },
            Err(e) => {
                tracing::warn!(device = %self.record.key(), error = %e, "Heartbeat failed");
                "error"
            }
        };
        metrics::record_heartbeat(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::registry::MemoryStore;

    #[tokio::test]
    async fn test_beat_refreshes_modified_at() {
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
        let record = store.create(DeviceRecord::new("acme", "gw")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let heartbeat = Heartbeat::new(store.clone(), record.clone(), Duration::from_secs(1));
        heartbeat.beat().await;

        let after = store.get("acme", "gw").await.unwrap();
        assert!(after.modified_at > record.modified_at);
        assert_eq!(after.created_at, record.created_at);
    }

    #[tokio::test]
    async fn test_beat_recreates_deleted_record() {
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
        let record = store.create(DeviceRecord::new("acme", "gw")).await.unwrap();
        store.delete("acme", "gw").await.unwrap();

        Heartbeat::new(store.clone(), record, Duration::from_secs(1)).beat().await;
        assert!(store.get("acme", "gw").await.is_ok());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store: Arc<dyn RegistryStore> = Arc::new(MemoryStore::new());
        let record = store.create(DeviceRecord::new("acme", "gw")).await.unwrap();
        let shutdown = Shutdown::new();

        let handle = tokio::spawn(
            Heartbeat::new(store, record, Duration::from_millis(10)).run(shutdown.subscribe()),
        );
        tokio::time::sleep(Duration::from_millis(35)).await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
