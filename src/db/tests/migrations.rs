use crate::db::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_migrations_create_kv_table() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(count, 1);

    db.close().await;
}

#[tokio::test]
async fn test_migrations_are_idempotent_across_reopen() {
    let temp_file = NamedTempFile::new().unwrap();

    let db = Database::new(temp_file.path()).await.unwrap();
    db.close().await;

    // Second open must not try to re-apply v1
    let db = Database::new(temp_file.path()).await.unwrap();
    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, vec![1]);

    db.close().await;
}

#[tokio::test]
async fn test_new_creates_missing_parent_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("store.db");

    let db = Database::new(&path).await.unwrap();
    assert!(path.exists());

    db.close().await;
}
