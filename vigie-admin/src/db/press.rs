//! Press article queries and stored-tier updates

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;
use vigie_common::db::PressArticle;
use vigie_common::press::classify_article;
use vigie_common::{PressTier, Result};

/// Tier counts produced by a reclassification pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReclassifyCounts {
    pub processed: i64,
    pub high_precision: i64,
    pub low_precision: i64,
}

pub async fn count_articles(pool: &SqlitePool, tier: Option<PressTier>) -> Result<i64> {
    let total: i64 = match tier {
        Some(tier) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM press_articles WHERE tier = ?")
                .bind(tier.as_str())
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM press_articles")
                .fetch_one(pool)
                .await?
        }
    };

    Ok(total)
}

/// One page of articles, newest first
pub async fn list_articles(
    pool: &SqlitePool,
    tier: Option<PressTier>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PressArticle>> {
    let base = "SELECT guid, url, title, description, published_at, tier FROM press_articles";
    let order = "ORDER BY published_at IS NULL, published_at DESC, guid LIMIT ? OFFSET ?";

    let rows = match tier {
        Some(tier) => {
            sqlx::query(&format!("{} WHERE tier = ? {}", base, order))
                .bind(tier.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query(&format!("{} {}", base, order))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(article_from_row).collect()
}

/// Classify stored articles and persist their tier
///
/// Only unclassified rows are touched unless `all` is set. Updates run in one
/// transaction.
pub async fn reclassify_articles(pool: &SqlitePool, all: bool) -> Result<ReclassifyCounts> {
    let sql = if all {
        "SELECT guid, title, description FROM press_articles"
    } else {
        "SELECT guid, title, description FROM press_articles WHERE tier IS NULL"
    };

    let mut tx = pool.begin().await?;
    let rows = sqlx::query(sql).fetch_all(&mut *tx).await?;

    let mut counts = ReclassifyCounts::default();
    for row in &rows {
        let guid: String = row.try_get("guid")?;
        let title: String = row.try_get("title")?;
        let description: Option<String> = row.try_get("description")?;

        let tier = classify_article(&title, description.as_deref());
        sqlx::query("UPDATE press_articles SET tier = ? WHERE guid = ?")
            .bind(tier.as_str())
            .bind(&guid)
            .execute(&mut *tx)
            .await?;

        counts.processed += 1;
        match tier {
            PressTier::HighPrecision => counts.high_precision += 1,
            PressTier::LowPrecision => counts.low_precision += 1,
        }
    }

    tx.commit().await?;

    info!(
        all,
        processed = counts.processed,
        high_precision = counts.high_precision,
        low_precision = counts.low_precision,
        "Reclassified press articles"
    );

    Ok(counts)
}

fn article_from_row(row: &SqliteRow) -> Result<PressArticle> {
    let tier = row
        .try_get::<Option<String>, _>("tier")?
        .map(|t| t.parse::<PressTier>())
        .transpose()?;

    Ok(PressArticle {
        guid: row.try_get("guid")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        published_at: row.try_get("published_at")?,
        tier,
    })
}
