//! Integration tests for the Registry public interface.
//!
//! These run against the filesystem store, the way separate processes share
//! a registry directory.

use chrono::{Duration as ChronoDuration, Utc};
use roster_core::{Registry, RegistryConfig, RosterError, ServiceRecord};
use std::time::Duration;
use tempfile::TempDir;

fn open_registry(temp_dir: &TempDir) -> Registry {
    Registry::open(RegistryConfig::new(temp_dir.path().join("services")))
        .expect("Failed to open registry")
}

#[test]
fn test_registry_lifecycle_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open_registry(&temp_dir);

    registry.register("svc-a", "10.0.0.1:9000").unwrap();
    let t0 = registry.discover("svc-a").unwrap();
    assert_eq!(t0.name, "svc-a");
    assert_eq!(t0.address, "10.0.0.1:9000");

    // Let the record age past the TTL without a heartbeat
    let past_ttl = t0.last_seen + ChronoDuration::seconds(61);
    let report = registry.sweep_at(past_ttl);
    assert_eq!(report.evicted, 1);
    assert!(registry.discover("svc-a").unwrap_err().is_not_found());

    registry.register("svc-a", "10.0.0.1:9000").unwrap();
    std::thread::sleep(Duration::from_millis(5));
    registry.heartbeat("svc-a").unwrap();
    let refreshed = registry.discover("svc-a").unwrap();
    assert!(refreshed.last_seen > t0.last_seen);
    assert_eq!(refreshed.address, "10.0.0.1:9000");
}

#[test]
fn test_two_handles_share_one_directory() {
    let temp_dir = TempDir::new().unwrap();
    let writer = open_registry(&temp_dir);
    let reader = open_registry(&temp_dir);

    writer.register("svc-a", "10.0.0.1:9000").unwrap();
    assert_eq!(reader.discover("svc-a").unwrap().address, "10.0.0.1:9000");

    reader.unregister("svc-a").unwrap();
    assert!(writer.discover("svc-a").unwrap_err().is_not_found());
}

#[test]
fn test_discover_returns_unswept_stale_records() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open_registry(&temp_dir);

    let ancient = ServiceRecord::new("svc-a", "10.0.0.1:9000", Utc::now() - ChronoDuration::hours(1));
    registry.store().put("svc-a", &ancient).unwrap();

    assert_eq!(registry.discover("svc-a").unwrap(), ancient);
}

#[test]
fn test_unregister_absent_leaves_others() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open_registry(&temp_dir);
    registry.register("svc-b", "10.0.0.2:9000").unwrap();

    for _ in 0..3 {
        assert!(matches!(
            registry.unregister("svc-a"),
            Err(RosterError::NotFound { .. })
        ));
    }
    assert_eq!(registry.discover("svc-b").unwrap().address, "10.0.0.2:9000");
}

#[test]
fn test_record_file_layout() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open_registry(&temp_dir);
    registry.register("svc-a", "10.0.0.1:9000").unwrap();

    let path = temp_dir.path().join("services").join("svc-a.json");
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    let object = raw.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["name"], "svc-a");
    assert_eq!(object["address"], "10.0.0.1:9000");
    assert!(object["last_seen"].is_string());
}

#[test]
fn test_concurrent_heartbeats_and_sweeps() {
    let temp_dir = TempDir::new().unwrap();
    let registry = std::sync::Arc::new(open_registry(&temp_dir));
    registry.register("svc-a", "10.0.0.1:9000").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    if i % 2 == 0 {
                        registry.heartbeat("svc-a").unwrap();
                    } else {
                        registry.sweep_once();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.discover("svc-a").unwrap().address, "10.0.0.1:9000");
}

#[tokio::test]
async fn test_started_registry_evicts_in_background() {
    let temp_dir = TempDir::new().unwrap();
    let config = RegistryConfig::new(temp_dir.path())
        .with_ttl(Duration::from_secs(1))
        .with_sweep_interval(Duration::from_millis(50));
    let (registry, sweeper) = Registry::start(config).unwrap();

    let stale = ServiceRecord::new("svc-a", "10.0.0.1:9000", Utc::now() - ChronoDuration::seconds(5));
    registry.store().put("svc-a", &stale).unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while registry.discover("svc-a").is_ok() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(registry.discover("svc-a").unwrap_err().is_not_found());

    sweeper.stop().await.unwrap();
}
