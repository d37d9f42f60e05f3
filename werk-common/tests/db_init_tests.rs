//! Tests for database initialization
//!
//! Covers schema creation on first run, idempotent reopen, and the integrity
//! rules the schema itself enforces (foreign keys, natural-key uniqueness,
//! membership cascade).

use sqlx::SqlitePool;
use tempfile::TempDir;
use werk_common::db::init::{init_database, SCHEMA_VERSION};

async fn fresh_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("temp dir");
    let pool = init_database(&temp_dir.path().join("werk.db"))
        .await
        .expect("init database");
    (temp_dir, pool)
}

async fn insert_user(pool: &SqlitePool, guid: &str, username: &str) {
    sqlx::query("INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, 'h', 's')")
        .bind(guid)
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("werk.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("werk.db");

    let pool1 = init_database(&db_path).await.unwrap();
    insert_user(&pool1, "u-1", "bianca").await;
    pool1.close().await;

    // Second init must not wipe data
    let pool2 = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool2)
        .await
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[tokio::test]
async fn test_all_tables_created() {
    let (_dir, pool) = fresh_db().await;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "challenges",
        "collection_contestants",
        "collections",
        "contestants",
        "episodes",
        "schema_version",
        "seasons",
        "sessions",
        "users",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_episode_requires_existing_season() {
    let (_dir, pool) = fresh_db().await;

    let result = sqlx::query("INSERT INTO episodes (season_id, episode_number, title) VALUES (99, 1, 'Orphan')")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "Foreign key on episodes.season_id not enforced");
}

#[tokio::test]
async fn test_challenge_requires_existing_contestant() {
    let (_dir, pool) = fresh_db().await;

    let result = sqlx::query("INSERT INTO challenges (contestant_id, challenge_type) VALUES (42, 'main')")
        .execute(&pool)
        .await;

    assert!(result.is_err(), "Foreign key on challenges.contestant_id not enforced");
}

#[tokio::test]
async fn test_contestant_natural_key_unique() {
    let (_dir, pool) = fresh_db().await;

    sqlx::query("INSERT INTO contestants (contestant_id, name) VALUES (7, 'Jinkx')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate = sqlx::query("INSERT INTO contestants (contestant_id, name) VALUES (7, 'Jinkx')")
        .execute(&pool)
        .await;

    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_collection_name_unique_per_user_only() {
    let (_dir, pool) = fresh_db().await;
    insert_user(&pool, "u-a", "alyssa").await;
    insert_user(&pool, "u-b", "tatianna").await;

    let insert = |guid: &'static str, user: &'static str| {
        let pool = pool.clone();
        async move {
            sqlx::query("INSERT INTO collections (guid, user_guid, name) VALUES (?, ?, 'Faves')")
                .bind(guid)
                .bind(user)
                .execute(&pool)
                .await
        }
    };

    assert!(insert("c-1", "u-a").await.is_ok());
    assert!(insert("c-2", "u-b").await.is_ok(), "Other users may reuse a name");
    assert!(insert("c-3", "u-a").await.is_err(), "Same user may not reuse a name");
}

#[tokio::test]
async fn test_deleting_collection_keeps_contestants() {
    let (_dir, pool) = fresh_db().await;
    insert_user(&pool, "u-a", "alyssa").await;
    sqlx::query("INSERT INTO contestants (contestant_id, name) VALUES (101, 'Alaska')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO collections (guid, user_guid, name) VALUES ('c-1', 'u-a', 'Faves')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO collection_contestants (collection_guid, contestant_id) VALUES ('c-1', 101)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM collections WHERE guid = 'c-1'")
        .execute(&pool)
        .await
        .unwrap();

    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collection_contestants")
        .fetch_one(&pool)
        .await
        .unwrap();
    let contestants: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contestants")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(members, 0, "Membership rows should cascade");
    assert_eq!(contestants, 1, "Contestants must survive collection deletion");
}
