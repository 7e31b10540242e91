use crate::db::*;
use crate::kv::{COLLECTIONS_KEY, KeyValueStore, SUBS_KEY, ensure_initialized};
use serde_json::json;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_read_missing_key_returns_none() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert_eq!(db.read("nothing-here").await.unwrap(), None);

    db.close().await;
}

#[tokio::test]
async fn test_write_then_read_round_trips_json() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let value = json!({"work": {"name": "work", "url": "https://example.com/a", "tag": ["x"]}});
    db.write(SUBS_KEY, value.clone()).await.unwrap();

    assert_eq!(db.read(SUBS_KEY).await.unwrap(), Some(value));

    db.close().await;
}

#[tokio::test]
async fn test_write_overwrites_previous_value() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.write(SUBS_KEY, json!({"a": 1})).await.unwrap();
    db.write(SUBS_KEY, json!({"b": 2})).await.unwrap();

    assert_eq!(db.read(SUBS_KEY).await.unwrap(), Some(json!({"b": 2})));

    db.close().await;
}

#[tokio::test]
async fn test_write_batch_commits_all_entries() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    db.write_batch(vec![
        (SUBS_KEY.to_string(), json!({})),
        (
            COLLECTIONS_KEY.to_string(),
            json!({"daily": {"name": "daily", "subscriptions": ["home"]}}),
        ),
    ])
    .await
    .unwrap();

    assert_eq!(db.read(SUBS_KEY).await.unwrap(), Some(json!({})));
    assert_eq!(
        db.read(COLLECTIONS_KEY).await.unwrap().unwrap()["daily"]["subscriptions"],
        json!(["home"])
    );

    db.close().await;
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let temp_file = NamedTempFile::new().unwrap();

    {
        let db = Database::new(temp_file.path()).await.unwrap();
        ensure_initialized(&db).await.unwrap();
        db.write(SUBS_KEY, json!({"work": {"name": "work", "url": "u"}}))
            .await
            .unwrap();
        db.close().await;
    }

    {
        let db = Database::new(temp_file.path()).await.unwrap();
        // Re-running initialization on startup must not clobber stored data
        ensure_initialized(&db).await.unwrap();
        let subs = db.read(SUBS_KEY).await.unwrap().unwrap();
        assert_eq!(subs["work"]["url"], "u");
        assert_eq!(db.read(COLLECTIONS_KEY).await.unwrap(), Some(json!({})));
        db.close().await;
    }
}

#[tokio::test]
async fn test_corrupt_stored_text_is_reported() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES ('subs', '{not json', 0)")
        .execute(db.pool())
        .await
        .unwrap();

    let err = db.read(SUBS_KEY).await.unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Store(crate::error::StoreError::CorruptValue { .. })
    ));

    db.close().await;
}
