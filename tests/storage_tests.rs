//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

use chrono::NaiveDate;
use modtelemetry::config::DatabaseConfig;
use modtelemetry::errors::TelemetryError;
use modtelemetry::storage::{SeaOrmStorage, StorageFactory, UsageKey};
use std::sync::Arc;
use tempfile::TempDir;

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: Some(format!("sqlite://{}?mode=rwc", db_path.display())),
        ..Default::default()
    };

    let storage = StorageFactory::create(&config)
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

fn key(mod_id: &str, game_version: &str, mod_version: &str, loader: &str) -> UsageKey {
    UsageKey {
        mod_id: mod_id.to_string(),
        game_version: game_version.to_string(),
        mod_version: mod_version.to_string(),
        loader: loader.to_string(),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

// =============================================================================
// Registry
// =============================================================================

#[tokio::test]
async fn test_insert_and_list_mods() {
    let (storage, _dir) = create_temp_storage().await;
    assert_eq!(storage.backend_name(), "sqlite");
    assert!(storage.list_mods().await.unwrap().is_empty());

    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();
    storage.insert_mod("othermod", "Other Mod").await.unwrap();

    let mods = storage.list_mods().await.unwrap();
    let ids: Vec<&str> = mods.iter().map(|m| m.mod_id.as_str()).collect();
    assert_eq!(ids, vec!["coolmod", "othermod"]);
    assert_eq!(storage.count_mods().await.unwrap(), 2);

    let found = storage.find_mod("coolmod").await.unwrap().unwrap();
    assert_eq!(found.mod_name, "Cool Mod");
    assert!(storage.find_mod("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_mod_is_conflict_and_stored_once() {
    let (storage, _dir) = create_temp_storage().await;

    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();
    let err = storage
        .insert_mod("coolmod", "Another Name")
        .await
        .unwrap_err();

    assert!(matches!(err, TelemetryError::Conflict(_)));
    assert_eq!(err.message(), "Mod already exists");
    assert_eq!(storage.count_mods().await.unwrap(), 1);
    assert_eq!(
        storage.find_mod("coolmod").await.unwrap().unwrap().mod_name,
        "Cool Mod"
    );
}

#[tokio::test]
async fn test_concurrent_duplicate_inserts_yield_one_mod() {
    let (storage, _dir) = create_temp_storage().await;

    for round in 0..10 {
        let mod_id = format!("racemod{}", round);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = storage.clone();
                let mod_id = mod_id.clone();
                tokio::spawn(async move { storage.insert_mod(&mod_id, "Race Mod").await })
            })
            .collect();

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(TelemetryError::Conflict(msg)) => {
                    assert_eq!(msg, "Mod already exists");
                    conflicts += 1;
                }
                Err(e) => panic!("round {}: unexpected error: {}", round, e),
            }
        }

        assert_eq!(created, 1, "round {}", round);
        assert_eq!(conflicts, 7, "round {}", round);
    }

    assert_eq!(storage.count_mods().await.unwrap(), 10);
}

// =============================================================================
// Usage recording
// =============================================================================

#[tokio::test]
async fn test_repeated_pings_increment_one_record() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();

    let ping = key("coolmod", "1.20", "2.1", "fabric");
    for n in 1..=5 {
        let record = storage.record_usage(&ping, day(n)).await.unwrap();
        assert_eq!(record.count, i64::from(n));
    }

    assert_eq!(storage.count_records().await.unwrap(), 1);
    let usage = storage.load_usage().await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].mod_name, "Cool Mod");
    assert_eq!(usage[0].record.mod_id, "coolmod");
    assert_eq!(usage[0].record.count, 5);
    assert_eq!(usage[0].record.last_used, day(5));
}

#[tokio::test]
async fn test_distinct_keys_get_distinct_records() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();

    storage
        .record_usage(&key("coolmod", "1.20", "2.1", "fabric"), day(1))
        .await
        .unwrap();
    storage
        .record_usage(&key("coolmod", "1.20", "2.1", "forge"), day(1))
        .await
        .unwrap();
    storage
        .record_usage(&key("coolmod", "1.19", "2.1", "fabric"), day(1))
        .await
        .unwrap();

    assert_eq!(storage.count_records().await.unwrap(), 3);
}

#[tokio::test]
async fn test_ping_for_unknown_mod_creates_nothing() {
    let (storage, _dir) = create_temp_storage().await;

    let err = storage
        .record_usage(&key("ghost", "1.20", "1.0", "fabric"), day(1))
        .await
        .unwrap_err();

    assert!(matches!(err, TelemetryError::NotFound(_)));
    assert_eq!(err.message(), "Mod does not exist");
    assert_eq!(storage.count_records().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_pings_lose_no_increment() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();

    let rounds = 10;
    let per_round = 8;
    for round in 0..rounds {
        let handles: Vec<_> = (0..per_round)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .record_usage(&key("coolmod", "1.20", "2.1", "fabric"), day(1))
                        .await
                })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                panic!("round {}: ping rejected: {}", round, e);
            }
        }
    }

    let usage = storage.load_usage().await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].record.count, rounds * per_round);
}

#[tokio::test]
async fn test_concurrent_first_pings_on_distinct_keys() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();

    let loaders = ["fabric", "forge", "quilt", "neoforge"];
    let handles: Vec<_> = loaders
        .iter()
        .flat_map(|loader| std::iter::repeat_n(*loader, 4))
        .map(|loader| {
            let storage = storage.clone();
            tokio::spawn(async move {
                storage
                    .record_usage(&key("coolmod", "1.20", "2.1", loader), day(1))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let usage = storage.load_usage().await.unwrap();
    assert_eq!(usage.len(), loaders.len());
    assert!(usage.iter().all(|entry| entry.record.count == 4));
}

#[tokio::test]
async fn test_counter_grows_past_i32_range() {
    use migration::entities::telemetry;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set};

    let (storage, _dir) = create_temp_storage().await;
    let owner = storage.insert_mod("coolmod", "Cool Mod").await.unwrap();

    telemetry::ActiveModel {
        mod_id: Set(owner.id),
        game_version: Set("1.20".to_string()),
        mod_version: Set("2.1".to_string()),
        loader: Set("fabric".to_string()),
        count: Set(i64::from(i32::MAX)),
        last_used: Set(day(1)),
    }
    .insert(storage.get_db())
    .await
    .unwrap();

    let record = storage
        .record_usage(&key("coolmod", "1.20", "2.1", "fabric"), day(2))
        .await
        .unwrap();
    assert_eq!(record.count, i64::from(i32::MAX) + 1);
    assert_eq!(record.last_used, day(2));
}

#[tokio::test]
async fn test_load_mod_usage_orders_by_count() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();
    storage.insert_mod("othermod", "Other Mod").await.unwrap();

    let low = key("coolmod", "1.19", "2.0", "forge");
    let high = key("coolmod", "1.20", "2.1", "fabric");
    storage.record_usage(&low, day(1)).await.unwrap();
    for _ in 0..3 {
        storage.record_usage(&high, day(2)).await.unwrap();
    }
    storage
        .record_usage(&key("othermod", "1.20", "1.0", "fabric"), day(2))
        .await
        .unwrap();

    let owner = storage.find_mod("coolmod").await.unwrap().unwrap();
    let records = storage.load_mod_usage(&owner).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].mod_version, "2.1");
    assert_eq!(records[0].count, 3);
    assert_eq!(records[1].count, 1);
    assert!(records.iter().all(|r| r.mod_id == "coolmod"));
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn test_delete_mod_cascades_to_telemetry() {
    let (storage, _dir) = create_temp_storage().await;
    storage.insert_mod("coolmod", "Cool Mod").await.unwrap();
    storage.insert_mod("othermod", "Other Mod").await.unwrap();
    storage
        .record_usage(&key("coolmod", "1.20", "2.1", "fabric"), day(1))
        .await
        .unwrap();
    storage
        .record_usage(&key("othermod", "1.20", "1.0", "fabric"), day(1))
        .await
        .unwrap();

    assert!(storage.delete_mod("coolmod").await.unwrap());
    assert!(!storage.delete_mod("coolmod").await.unwrap());

    assert_eq!(storage.count_mods().await.unwrap(), 1);
    let usage = storage.load_usage().await.unwrap();
    assert_eq!(usage.len(), 1);
    assert_eq!(usage[0].record.mod_id, "othermod");
}

#[tokio::test]
async fn test_ping_health() {
    let (storage, _dir) = create_temp_storage().await;
    assert!(storage.ping().await.is_ok());
}
