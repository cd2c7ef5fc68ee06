//! Scrape job tracking
//!
//! One row per enrichment batch, keyed by DOI. The scrape service upserts the
//! row at batch start (`processing`) and finalizes it as `completed` or
//! `failed`; re-scraping a DOI reuses its row.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::types::{JobStatus, ScrapeJob};
use crate::{Error, Result};

/// Open (or reopen) the job row for a batch, resetting its counters
pub async fn start_job(
    pool: &SqlitePool,
    doi: &str,
    author_count: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO scraping_jobs (doi, status, author_count, emails_found, created_at)
        VALUES (?, ?, ?, 0, ?)
        ON CONFLICT(doi) DO UPDATE SET
            status = excluded.status,
            author_count = excluded.author_count,
            emails_found = 0,
            error_message = NULL,
            completed_at = NULL
        "#,
    )
    .bind(doi)
    .bind(JobStatus::Processing.as_str())
    .bind(author_count as i64)
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a batch completed with its resolved email count
pub async fn complete_job(
    pool: &SqlitePool,
    doi: &str,
    emails_found: usize,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE scraping_jobs
        SET status = ?, emails_found = ?, completed_at = ?
        WHERE doi = ?
        "#,
    )
    .bind(JobStatus::Completed.as_str())
    .bind(emails_found as i64)
    .bind(now.to_rfc3339())
    .bind(doi)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a batch failed, recording the error for diagnosis
pub async fn fail_job(
    pool: &SqlitePool,
    doi: &str,
    error_message: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE scraping_jobs
        SET status = ?, error_message = ?, completed_at = ?
        WHERE doi = ?
        "#,
    )
    .bind(JobStatus::Failed.as_str())
    .bind(error_message)
    .bind(now.to_rfc3339())
    .bind(doi)
    .execute(pool)
    .await?;

    Ok(())
}

/// Read the job row for a DOI
pub async fn get_job(pool: &SqlitePool, doi: &str) -> Result<Option<ScrapeJob>> {
    let row = sqlx::query(
        r#"
        SELECT doi, status, author_count, emails_found, error_message,
               created_at, completed_at
        FROM scraping_jobs
        WHERE doi = ?
        "#,
    )
    .bind(doi)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let completed_at: Option<String> = row.try_get("completed_at")?;

    Ok(Some(ScrapeJob {
        doi: row.try_get("doi")?,
        status: JobStatus::from_db(&status),
        author_count: row.try_get("author_count")?,
        emails_found: row.try_get("emails_found")?,
        error_message: row.try_get("error_message")?,
        created_at: parse_timestamp(&created_at)?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
    }))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid job timestamp: {}", e)))
}
