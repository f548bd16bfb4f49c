//! Affair queries and mutations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::info;
use vigie_common::affairs::normalize_url;
use vigie_common::db::{Affair, AffairSource, Politician};
use vigie_common::{Error, Result};

const AFFAIR_COLUMNS: &str = "guid, politician_id, title, status, category, involvement, \
     ecli, pourvoi_number, facts_date, start_date, verdict_date";

const SOURCE_COLUMNS: &str = "guid, affair_id, url, title, publisher, published_at";

/// Outcome of merging two affairs
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub affair: Affair,
    pub moved_sources: usize,
    pub dropped_sources: usize,
}

pub async fn load_politician(pool: &SqlitePool, id: &str) -> Result<Option<Politician>> {
    let row = sqlx::query("SELECT guid, slug, full_name, party FROM politicians WHERE guid = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|row| -> Result<Politician> {
        Ok(Politician {
            guid: row.try_get("guid")?,
            slug: row.try_get("slug")?,
            full_name: row.try_get("full_name")?,
            party: row.try_get("party")?,
        })
    })
    .transpose()
}

/// All affairs of a politician with their sources, ordered by guid
pub async fn load_affairs(pool: &SqlitePool, politician_id: &str) -> Result<Vec<Affair>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM affairs WHERE politician_id = ? ORDER BY guid",
        AFFAIR_COLUMNS
    ))
    .bind(politician_id)
    .fetch_all(pool)
    .await?;

    let mut affairs = rows.iter().map(affair_from_row).collect::<Result<Vec<_>>>()?;

    let source_rows = sqlx::query(&format!(
        "SELECT {} FROM affair_sources
         WHERE affair_id IN (SELECT guid FROM affairs WHERE politician_id = ?)
         ORDER BY affair_id, guid",
        SOURCE_COLUMNS
    ))
    .bind(politician_id)
    .fetch_all(pool)
    .await?;

    let mut by_affair: HashMap<String, Vec<AffairSource>> = HashMap::new();
    for row in &source_rows {
        let affair_id: String = row.try_get("affair_id")?;
        by_affair
            .entry(affair_id)
            .or_default()
            .push(source_from_row(row)?);
    }

    for affair in &mut affairs {
        affair.sources = by_affair.remove(&affair.guid).unwrap_or_default();
    }

    Ok(affairs)
}

/// Single affair with its sources
pub async fn load_affair(conn: &mut SqliteConnection, id: &str) -> Result<Option<Affair>> {
    let row = sqlx::query(&format!("SELECT {} FROM affairs WHERE guid = ?", AFFAIR_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut affair = affair_from_row(&row)?;

    let source_rows = sqlx::query(&format!(
        "SELECT {} FROM affair_sources WHERE affair_id = ? ORDER BY guid",
        SOURCE_COLUMNS
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    affair.sources = source_rows
        .iter()
        .map(source_from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(affair))
}

/// Fold `remove_id` into `keep_id` inside one transaction
///
/// Sources of the removed affair move over unless the kept affair already cites
/// the same normalized URL. Empty legal references and dates of the kept affair
/// are filled from the removed one. The removed affair is then deleted.
pub async fn merge_affairs(
    pool: &SqlitePool,
    keep_id: &str,
    remove_id: &str,
) -> Result<MergeOutcome> {
    if keep_id == remove_id {
        return Err(Error::InvalidInput(
            "keep_id and remove_id must be different affairs".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let keep = load_affair(&mut *tx, keep_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Affair not found: {}", keep_id)))?;
    let remove = load_affair(&mut *tx, remove_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Affair not found: {}", remove_id)))?;

    if keep.politician_id != remove.politician_id {
        return Err(Error::InvalidInput(format!(
            "Affairs {} and {} belong to different politicians",
            keep_id, remove_id
        )));
    }

    let mut known_urls: HashSet<String> = keep
        .sources
        .iter()
        .filter_map(|s| normalize_url(&s.url))
        .collect();

    let mut moved_sources = 0;
    for source in &remove.sources {
        if let Some(url) = normalize_url(&source.url) {
            if !known_urls.insert(url) {
                continue;
            }
        }

        sqlx::query("UPDATE affair_sources SET affair_id = ? WHERE guid = ?")
            .bind(keep_id)
            .bind(&source.guid)
            .execute(&mut *tx)
            .await?;
        moved_sources += 1;
    }

    sqlx::query(
        "UPDATE affairs
         SET ecli = ?, pourvoi_number = ?, facts_date = ?, start_date = ?, verdict_date = ?,
             updated_at = CURRENT_TIMESTAMP
         WHERE guid = ?",
    )
    .bind(fill_text(&keep.ecli, &remove.ecli))
    .bind(fill_text(&keep.pourvoi_number, &remove.pourvoi_number))
    .bind(keep.facts_date.or(remove.facts_date))
    .bind(keep.start_date.or(remove.start_date))
    .bind(keep.verdict_date.or(remove.verdict_date))
    .bind(keep_id)
    .execute(&mut *tx)
    .await?;

    // Sources left behind cascade with the affair
    sqlx::query("DELETE FROM affairs WHERE guid = ?")
        .bind(remove_id)
        .execute(&mut *tx)
        .await?;

    let affair = load_affair(&mut *tx, keep_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Affair {} vanished during merge", keep_id)))?;

    tx.commit().await?;

    let dropped_sources = remove.sources.len() - moved_sources;
    info!(
        keep = keep_id,
        removed = remove_id,
        moved_sources,
        dropped_sources,
        "Merged duplicate affairs"
    );

    Ok(MergeOutcome {
        affair,
        moved_sources,
        dropped_sources,
    })
}

/// Delete one affair; its sources cascade
pub async fn delete_affair(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM affairs WHERE guid = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Affair not found: {}", id)));
    }

    info!(affair = id, "Deleted affair");
    Ok(())
}

fn fill_text(kept: &Option<String>, fallback: &Option<String>) -> Option<String> {
    let present = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
    present(kept).or_else(|| present(fallback))
}

fn affair_from_row(row: &SqliteRow) -> Result<Affair> {
    Ok(Affair {
        guid: row.try_get("guid")?,
        politician_id: row.try_get("politician_id")?,
        title: row.try_get("title")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        category: row.try_get::<String, _>("category")?.parse()?,
        involvement: row.try_get::<String, _>("involvement")?.parse()?,
        ecli: row.try_get("ecli")?,
        pourvoi_number: row.try_get("pourvoi_number")?,
        facts_date: row.try_get("facts_date")?,
        start_date: row.try_get("start_date")?,
        verdict_date: row.try_get("verdict_date")?,
        sources: Vec::new(),
    })
}

fn source_from_row(row: &SqliteRow) -> Result<AffairSource> {
    Ok(AffairSource {
        guid: row.try_get("guid")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        publisher: row.try_get("publisher")?,
        published_at: row.try_get("published_at")?,
    })
}
