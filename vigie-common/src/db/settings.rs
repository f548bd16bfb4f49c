//! Typed access to the `settings` table

use crate::affairs::DuplicateDetector;
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::warn;

/// Read a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Insert or replace a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Read an integer setting, falling back to `default` when absent
///
/// A present but unparsable value is a configuration error.
pub async fn get_i64_setting(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    match get_setting(pool, key).await? {
        Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
            Error::Config(format!("Setting '{}' is not an integer ({:?}): {}", key, raw, e))
        }),
        None => Ok(default),
    }
}

/// Build a duplicate detector from the stored thresholds
///
/// Out-of-range values are clamped and logged.
pub async fn load_duplicate_detector(pool: &SqlitePool) -> Result<DuplicateDetector> {
    let defaults = DuplicateDetector::default();

    let min_score = get_i64_setting(pool, "duplicate_min_score", defaults.min_score as i64).await?;
    let tolerance = get_i64_setting(
        pool,
        "duplicate_date_tolerance_days",
        defaults.date_tolerance_days,
    )
    .await?;

    let clamped_score = min_score.clamp(0, 100);
    if clamped_score != min_score {
        warn!("duplicate_min_score {} out of range, using {}", min_score, clamped_score);
    }
    let clamped_tolerance = tolerance.max(0);
    if clamped_tolerance != tolerance {
        warn!(
            "duplicate_date_tolerance_days {} is negative, using {}",
            tolerance, clamped_tolerance
        );
    }

    Ok(DuplicateDetector {
        min_score: clamped_score as u8,
        date_tolerance_days: clamped_tolerance,
    })
}
