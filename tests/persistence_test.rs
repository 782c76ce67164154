use spotsync::persistence::FilePriceStore;
use spotsync::store::{PriceStore, StoredPriceRecord};

fn record(date: &str, value: f64) -> StoredPriceRecord {
    StoredPriceRecord {
        date: date.to_string(),
        value,
        unit: "c/kWh".to_string(),
        ..StoredPriceRecord::new()
    }
}

#[tokio::test]
async fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilePriceStore::open(dir.path().join("prices.json"))
        .await
        .unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prices.json");

    let store = FilePriceStore::open(&path).await.unwrap();
    let mut a = record("2024-02-25 13:00:00.000Z", 4.25);
    let mut b = record("2024-02-25 14:00:00.000Z", 5.5);
    store.save(&mut a).await.unwrap();
    store.save(&mut b).await.unwrap();
    a.value = 4.5;
    store.save(&mut a).await.unwrap();
    drop(store);

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = FilePriceStore::open(&path).await.unwrap();
    let records = reopened.records().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], a);
    assert_eq!(records[1], b);
}

#[tokio::test]
async fn file_layout_is_records_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.json");
    let store = FilePriceStore::open(&path).await.unwrap();
    let mut r = record("2024-02-25 13:00:00.000Z", 1.0);
    store.save(&mut r).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let first = &raw["records"][0];
    assert_eq!(first["id"], r.id.as_str());
    assert_eq!(first["date"], "2024-02-25 13:00:00.000Z");
    assert_eq!(first["value"], 1.0);
    assert_eq!(first["unit"], "c/kWh");
}

#[tokio::test]
async fn corrupt_file_fails_to_open() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), "{ not json").unwrap();
    assert!(FilePriceStore::open(tmp.path()).await.is_err());
}

#[tokio::test]
async fn failed_write_keeps_memory_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.json");
    let store = FilePriceStore::open(&path).await.unwrap();

    // a directory in place of the store file makes the final rename fail
    std::fs::create_dir(&path).unwrap();

    let mut r = record("2024-02-25 13:00:00.000Z", 2.0);
    let err = store.save(&mut r).await.unwrap_err();
    assert!(matches!(err, spotsync::SpotSyncError::Store { .. }));
    assert!(r.is_new());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn failed_update_restores_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.json");
    let store = FilePriceStore::open(&path).await.unwrap();

    let mut r = record("2024-02-25 13:00:00.000Z", 2.0);
    store.save(&mut r).await.unwrap();
    let saved = r.clone();

    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    r.value = 9.0;
    assert!(store.save(&mut r).await.is_err());
    assert_eq!(store.records().await, vec![saved]);
}
