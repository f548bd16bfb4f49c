//! Tests for database initialization
//!
//! - Database file created automatically on first run
//! - Existing database reopened without error
//! - Default settings present, NULL settings reset

use tempfile::TempDir;
use vigie_common::db::init::{init_database, init_schema, CURRENT_SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("vigie.db");

    let pool = init_database(&db_path).await;

    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("vigie.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_tables_created() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("vigie.db")).await.unwrap();

    for table in [
        "schema_version",
        "settings",
        "politicians",
        "affairs",
        "affair_sources",
        "press_articles",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Missing table: {}", table);
    }

    let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("vigie.db")).await.unwrap();

    let min_score: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'duplicate_min_score'")
            .fetch_optional(&pool)
            .await
            .unwrap();
    assert_eq!(min_score.as_deref(), Some("40"));

    let tolerance: Option<String> = sqlx::query_scalar(
        "SELECT value FROM settings WHERE key = 'duplicate_date_tolerance_days'",
    )
    .fetch_optional(&pool)
    .await
    .unwrap();
    assert_eq!(tolerance.as_deref(), Some("30"));
}

#[tokio::test]
async fn test_null_setting_reset_and_custom_value_kept() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("vigie.db")).await.unwrap();

    sqlx::query("UPDATE settings SET value = NULL WHERE key = 'duplicate_min_score'")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE settings SET value = '14' WHERE key = 'duplicate_date_tolerance_days'")
        .execute(&pool)
        .await
        .unwrap();

    init_schema(&pool).await.unwrap();

    let min_score: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'duplicate_min_score'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(min_score.as_deref(), Some("40"));

    let tolerance: String = sqlx::query_scalar(
        "SELECT value FROM settings WHERE key = 'duplicate_date_tolerance_days'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(tolerance, "14");
}

#[tokio::test]
async fn test_foreign_keys_cascade_affair_sources() {
    let pool = vigie_common::db::init_in_memory().await.unwrap();

    sqlx::query("INSERT INTO politicians (guid, slug, full_name) VALUES ('p1', 'jean-dupont', 'Jean Dupont')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO affairs (guid, politician_id, title, status, category) VALUES ('a1', 'p1', 'Affaire', 'trial', 'fraud')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO affair_sources (guid, affair_id, url) VALUES ('s1', 'a1', 'https://example.org')")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("DELETE FROM affairs WHERE guid = 'a1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM affair_sources")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
