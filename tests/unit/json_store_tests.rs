//! Unit tests for the whole-document JSON store.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use nutriscan_dashboard::store::JsonStore;
use nutriscan_dashboard::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Record {
    name: String,
    hits: u64,
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", false);

    let mut records = BTreeMap::new();
    records.insert(
        "a".to_owned(),
        Record {
            name: "first".into(),
            hits: 1,
        },
    );
    store.save(&records).await.expect("save");

    let loaded = store.load().await.expect("load");
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn missing_file_loads_as_empty() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", false);
    assert!(store.load().await.expect("load").is_empty());
}

#[tokio::test]
async fn corrupt_document_fails_strict() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", false);
    std::fs::write(store.path(), b"{ not json").expect("write corrupt");

    let err = store.load().await.expect_err("corrupt must fail");
    assert!(matches!(err, AppError::Store(_)));
}

#[tokio::test]
async fn corrupt_document_loads_empty_permissive() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", true);
    std::fs::write(store.path(), b"{ not json").expect("write corrupt");

    assert!(store.load().await.expect("permissive load").is_empty());
}

#[tokio::test]
async fn failed_update_leaves_document_untouched() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", false);

    store
        .update(|records| {
            records.insert(
                "a".to_owned(),
                Record {
                    name: "kept".into(),
                    hits: 0,
                },
            );
            Ok(())
        })
        .await
        .expect("seed");

    let err = store
        .update(|records| {
            records.clear();
            Err::<(), _>(AppError::NotFound("nope".into()))
        })
        .await
        .expect_err("update must propagate");
    assert!(matches!(err, AppError::NotFound(_)));

    let loaded = store.load().await.expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded["a"].name, "kept");
}

#[tokio::test]
async fn concurrent_updates_are_serialized() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: Arc<JsonStore<Record>> = Arc::new(JsonStore::open(temp.path(), "records", false));

    store
        .update(|records| {
            records.insert(
                "counter".to_owned(),
                Record {
                    name: "counter".into(),
                    hits: 0,
                },
            );
            Ok(())
        })
        .await
        .expect("seed");

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .update(|records| {
                    if let Some(record) = records.get_mut("counter") {
                        record.hits += 1;
                    }
                    Ok(())
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("update");
    }

    let loaded = store.load().await.expect("load");
    assert_eq!(loaded["counter"].hits, 20, "no update may be lost");
}

#[tokio::test]
async fn saved_document_is_valid_json_on_disk() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store: JsonStore<Record> = JsonStore::open(temp.path(), "records", false);

    store
        .update(|records| {
            records.insert(
                "a".to_owned(),
                Record {
                    name: "quoted \"name\" with\nnewline".into(),
                    hits: 7,
                },
            );
            Ok(())
        })
        .await
        .expect("update");

    let raw = std::fs::read_to_string(store.path()).expect("read back");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value["a"]["hits"], 7);
}
