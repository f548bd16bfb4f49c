//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up to date.
//! Every statement is idempotent, so startup can run it unconditionally.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Open (creating if needed) the database at `db_path` and initialize the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the admin UI read while a merge is being written
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Each SQLite in-memory connection is its own database, hence the pool size of 1.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and default settings
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;
    create_politicians_table(pool).await?;
    create_affairs_table(pool).await?;
    create_affair_sources_table(pool).await?;
    create_press_articles_table(pool).await?;

    record_schema_version(pool).await?;
    init_default_settings(pool).await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_politicians_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS politicians (
            guid TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            party TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_affairs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS affairs (
            guid TEXT PRIMARY KEY,
            politician_id TEXT NOT NULL REFERENCES politicians(guid) ON DELETE CASCADE,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            category TEXT NOT NULL,
            involvement TEXT NOT NULL DEFAULT 'implicated',
            ecli TEXT,
            pourvoi_number TEXT,
            facts_date TEXT,
            start_date TEXT,
            verdict_date TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_affairs_politician ON affairs(politician_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_affair_sources_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS affair_sources (
            guid TEXT PRIMARY KEY,
            affair_id TEXT NOT NULL REFERENCES affairs(guid) ON DELETE CASCADE,
            url TEXT NOT NULL,
            title TEXT,
            publisher TEXT,
            published_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_affair_sources_affair ON affair_sources(affair_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_press_articles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS press_articles (
            guid TEXT PRIMARY KEY,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT,
            published_at TEXT,
            tier TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn record_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(CURRENT_SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

/// Initialize default settings
///
/// Missing keys are created; NULL values are reset to their default.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "duplicate_min_score", "40").await?;
    ensure_setting(pool, "duplicate_date_tolerance_days", "30").await?;

    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let existing: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match existing {
        None => {
            // INSERT OR IGNORE: concurrent startups may race past the lookup
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;

            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;

            info!("Reset NULL setting '{}' to default value: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}
