//! Background expiry sweep.
//!
//! Each pass lists the store, then examines every name on its own under that
//! name's write lock: unreadable or corrupt records are left in place, stale
//! ones are deleted. Errors never end a pass or the sweeper; the next tick
//! retries whatever is still stale.

use crate::registry::Registry;
use crate::{Result, RosterError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Names returned by the store listing.
    pub scanned: usize,
    /// Stale records deleted.
    pub evicted: usize,
    /// Names that could not be read or deleted.
    pub skipped: usize,
}

impl Registry {
    /// Run one sweep pass against the current time.
    pub fn sweep_once(&self) -> SweepReport {
        self.sweep_at(Utc::now())
    }

    /// Run one sweep pass, judging staleness against `now`.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let names = match self.store.list() {
            Ok(names) => names,
            Err(e) => {
                warn!("Sweep could not list records: {}", e);
                return report;
            }
        };

        for name in names {
            report.scanned += 1;
            match self.evict_if_stale(&name, now) {
                Ok(true) => report.evicted += 1,
                Ok(false) => {}
                Err(e) => {
                    debug!("Sweep skipped {}: {}", name, e);
                    report.skipped += 1;
                }
            }
        }

        report
    }

    fn evict_if_stale(&self, name: &str, now: DateTime<Utc>) -> Result<bool> {
        let _guard = self.locks.write(name);
        let record = self.store.get(name)?;
        if !record.is_stale(self.config.ttl, now) {
            return Ok(false);
        }

        self.store.delete(name)?;
        info!(
            "Evicted stale service {} (last seen {})",
            name,
            record.last_seen.to_rfc3339()
        );
        Ok(true)
    }

    /// Start the periodic sweeper on the current Tokio runtime.
    ///
    /// The first pass runs one `sweep_interval` after this call.
    pub fn spawn_sweeper(self: &Arc<Self>) -> Result<SweeperHandle> {
        self.config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| RosterError::Other(format!("Sweeper needs a Tokio runtime: {}", e)))?;

        let period = self.config.sweep_interval;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task_handle = runtime.spawn(sweep_loop(Arc::clone(self), period, shutdown_rx));

        info!(
            "Started sweeper (interval {:?}, ttl {:?})",
            period, self.config.ttl
        );

        Ok(SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
        })
    }
}

async fn sweep_loop(
    registry: Arc<Registry>,
    period: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Sweeper shutting down");
                break;
            }
            _ = ticker.tick() => {
                let registry = Arc::clone(&registry);
                match tokio::task::spawn_blocking(move || registry.sweep_once()).await {
                    Ok(report) if report.evicted > 0 => info!(
                        "Sweep evicted {} of {} records ({} skipped)",
                        report.evicted, report.scanned, report.skipped
                    ),
                    Ok(report) => debug!("Sweep found no stale records: {:?}", report),
                    Err(e) => error!("Sweep pass failed: {}", e),
                }
            }
        }
    }
}

/// Handle to a running sweeper. Dropping it stops the sweeper.
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the sweeper and wait for it to exit.
    ///
    /// A pass already in progress runs to completion first.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| RosterError::Other(format!("Sweeper task failed: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::record::ServiceRecord;
    use crate::store::{FsRecordStore, MemoryRecordStore, RecordStore};
    use tempfile::TempDir;

    fn registry_with_ttl(ttl_secs: u64) -> Registry {
        Registry::with_store(
            Arc::new(MemoryRecordStore::new()),
            RegistryConfig::new("memory").with_ttl(Duration::from_secs(ttl_secs)),
        )
        .unwrap()
    }

    fn seconds_ago(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        now - chrono::Duration::seconds(secs)
    }

    #[test]
    fn test_sweep_evicts_only_stale() {
        let registry = registry_with_ttl(60);
        let now = Utc::now();

        let store = registry.store();
        store
            .put("old", &ServiceRecord::new("old", "a", seconds_ago(now, 61)))
            .unwrap();
        store
            .put("fresh", &ServiceRecord::new("fresh", "b", seconds_ago(now, 59)))
            .unwrap();
        store
            .put("edge", &ServiceRecord::new("edge", "c", seconds_ago(now, 60)))
            .unwrap();

        let report = registry.sweep_at(now);
        assert_eq!(
            report,
            SweepReport {
                scanned: 3,
                evicted: 1,
                skipped: 0
            }
        );
        assert!(registry.discover("old").unwrap_err().is_not_found());
        assert!(registry.discover("fresh").is_ok());
        assert!(registry.discover("edge").is_ok());
    }

    #[test]
    fn test_sweep_leaves_corrupt_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRecordStore::open(temp_dir.path()).unwrap();
        let corrupt_path = store.record_path("broken");
        std::fs::write(&corrupt_path, "{ not json").unwrap();

        let now = Utc::now();
        store
            .put("old", &ServiceRecord::new("old", "a", seconds_ago(now, 600)))
            .unwrap();

        let registry = Registry::with_store(
            Arc::new(store),
            RegistryConfig::new(temp_dir.path()),
        )
        .unwrap();

        let report = registry.sweep_at(now);
        assert_eq!(report.scanned, 2);
        assert_eq!(report.evicted, 1);
        assert_eq!(report.skipped, 1);
        assert!(corrupt_path.exists());
    }

    #[test]
    fn test_sweep_on_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("registry");
        let registry = Registry::open(RegistryConfig::new(&root)).unwrap();
        std::fs::remove_dir(&root).unwrap();

        assert_eq!(registry.sweep_once(), SweepReport::default());
    }

    #[test]
    fn test_heartbeat_resets_staleness() {
        let registry = registry_with_ttl(60);
        let now = Utc::now();
        registry
            .store()
            .put("svc-a", &ServiceRecord::new("svc-a", "a", seconds_ago(now, 120)))
            .unwrap();

        registry.heartbeat("svc-a").unwrap();

        assert_eq!(registry.sweep_at(Utc::now()).evicted, 0);
        assert!(registry.discover("svc-a").is_ok());
    }

    #[test]
    fn test_heartbeat_after_sweep_does_not_resurrect() {
        let registry = registry_with_ttl(60);
        let now = Utc::now();
        registry
            .store()
            .put("svc-a", &ServiceRecord::new("svc-a", "a", seconds_ago(now, 120)))
            .unwrap();

        assert_eq!(registry.sweep_at(now).evicted, 1);
        assert!(registry.heartbeat("svc-a").unwrap_err().is_not_found());
        assert!(registry.discover("svc-a").unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sweeper_runs_and_stops() {
        let temp_dir = TempDir::new().unwrap();
        let config = RegistryConfig::new(temp_dir.path())
            .with_ttl(Duration::from_secs(60))
            .with_sweep_interval(Duration::from_millis(20));
        let (registry, sweeper) = Registry::start(config).unwrap();
        assert!(sweeper.is_running());

        let stale = ServiceRecord::new("old", "a", seconds_ago(Utc::now(), 600));
        registry.store().put("old", &stale).unwrap();
        registry.register("fresh", "b").unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while registry.discover("old").is_ok() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(registry.discover("old").unwrap_err().is_not_found());
        assert!(registry.discover("fresh").is_ok());

        sweeper.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_sweeper_no_longer_evicts() {
        let interval = Duration::from_millis(20);
        let registry = Arc::new(
            Registry::with_store(
                Arc::new(MemoryRecordStore::new()),
                RegistryConfig::new("memory").with_sweep_interval(interval),
            )
            .unwrap(),
        );

        let sweeper = registry.spawn_sweeper().unwrap();
        sweeper.stop().await.unwrap();

        let stale = ServiceRecord::new("old", "a", seconds_ago(Utc::now(), 600));
        registry.store().put("old", &stale).unwrap();
        tokio::time::sleep(interval * 5).await;

        assert!(registry.discover("old").is_ok());
    }

    #[test]
    fn test_spawn_without_runtime_fails() {
        let registry = Arc::new(registry_with_ttl(60));
        assert!(registry.spawn_sweeper().is_err());
    }
}
