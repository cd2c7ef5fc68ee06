//! Author email cache operations
//!
//! The cache is keyed by author display name. The name is not guaranteed
//! globally unique across distinct people — an accepted collision risk — and
//! the table allows historical rows per name, so every read resolves to the
//! most recently updated row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::types::{CacheRecord, EmailSource};
use crate::{Error, Result};

/// Batch lookup: newest cache record per name, one round trip.
///
/// Names absent from the cache are simply absent from the returned map.
pub async fn lookup_many(
    pool: &SqlitePool,
    names: &[String],
) -> Result<HashMap<String, CacheRecord>> {
    if names.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!(
        r#"
        SELECT author_name, email, source, confidence_score, last_updated
        FROM author_emails
        WHERE author_name IN ({})
        ORDER BY last_updated DESC
        "#,
        placeholders
    );

    let mut query = sqlx::query(&sql);
    for name in names {
        query = query.bind(name);
    }
    let rows = query.fetch_all(pool).await?;

    // Rows arrive newest first; keep only the first row seen per name
    let mut records = HashMap::new();
    for row in rows {
        let record = record_from_row(&row)?;
        records
            .entry(record.author_name.clone())
            .or_insert(record);
    }

    Ok(records)
}

/// Newest cache record for a single name
pub async fn lookup_latest(pool: &SqlitePool, name: &str) -> Result<Option<CacheRecord>> {
    let row = sqlx::query(
        r#"
        SELECT author_name, email, source, confidence_score, last_updated
        FROM author_emails
        WHERE author_name = ?
        ORDER BY last_updated DESC
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Write or overwrite the freshest record for a name.
///
/// Overwrites the newest existing row for the name rather than stacking a
/// new one; inserts when the name has no rows yet. Re-writing the same tuple
/// is a no-op in effect, though it refreshes `last_updated`.
pub async fn upsert(
    pool: &SqlitePool,
    name: &str,
    email: Option<&str>,
    source: EmailSource,
    confidence: Option<f64>,
    now: DateTime<Utc>,
) -> Result<()> {
    let now_str = now.to_rfc3339();

    let updated = sqlx::query(
        r#"
        UPDATE author_emails
        SET email = ?, source = ?, confidence_score = ?, last_updated = ?
        WHERE id = (
            SELECT id FROM author_emails
            WHERE author_name = ?
            ORDER BY last_updated DESC
            LIMIT 1
        )
        "#,
    )
    .bind(email)
    .bind(source.as_str())
    .bind(confidence)
    .bind(&now_str)
    .bind(name)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            r#"
            INSERT INTO author_emails
                (author_name, email, source, confidence_score, created_at, last_updated)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(source.as_str())
        .bind(confidence)
        .bind(&now_str)
        .bind(&now_str)
        .execute(pool)
        .await?;
    }

    Ok(())
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CacheRecord> {
    let source: String = row.try_get("source")?;
    let last_updated: String = row.try_get("last_updated")?;
    let last_updated = DateTime::parse_from_rfc3339(&last_updated)
        .map_err(|e| Error::Internal(format!("Invalid last_updated timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(CacheRecord {
        author_name: row.try_get("author_name")?,
        email: row.try_get("email")?,
        source: EmailSource::from_db(&source),
        confidence: row.try_get("confidence_score")?,
        last_updated,
    })
}
