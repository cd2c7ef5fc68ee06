//! Database access for curemail
//!
//! One shared SQLite database holds the author email cache and the scrape
//! job records. Both services connect through this module so the schema is
//! created in exactly one place.

pub mod author_emails;
pub mod scraping_jobs;

use std::path::Path;

use sqlx::SqlitePool;

use crate::Result;

/// Initialize database connection pool
///
/// Connects to the shared curemail database, creating it (and its parent
/// directory) if missing, and runs table migrations.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize curemail tables
///
/// Creates author_emails and scraping_jobs tables if they don't exist.
/// `author_name` is deliberately not unique: historical rows per name are
/// allowed, lookups resolve to the newest by `last_updated`.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS author_emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_name TEXT NOT NULL,
            email TEXT,
            source TEXT NOT NULL,
            confidence_score REAL,
            created_at TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_author_emails_name ON author_emails(author_name)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scraping_jobs (
            doi TEXT PRIMARY KEY,
            status TEXT NOT NULL,
            author_count INTEGER NOT NULL DEFAULT 0,
            emails_found INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            created_at TEXT NOT NULL,
            completed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (author_emails, scraping_jobs)");

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so the in-memory database is shared across queries
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_tables(&pool).await.unwrap();
    pool
}
