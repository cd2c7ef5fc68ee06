//! Authoritative per-author enrichment
//!
//! The service-side mirror of the client resolver, with one difference: this
//! side writes the cache. Every resolved tuple is upserted — generated ones
//! included, so later lookups short-circuit to the cached value instead of
//! re-deriving it.
//!
//! Resolution itself cannot fail an author: a cache read error is a cache
//! miss, and a persistence error returns the resolved tuple unpersisted.
//! The deriver needs no I/O, so every author leaves the batch with an email
//! even when the database is down.
//!
//! Authors are processed strictly sequentially with a fixed delay between
//! them to avoid hammering any live upstream source. The delay is a policy
//! knob (`scrape_delay_ms`), not a correctness property.

use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::{debug, warn};

use curemail_common::db::author_emails;
use curemail_common::synth::{derive_email, GENERATED_CONFIDENCE};
use curemail_common::types::{Author, EmailSource, EnrichedAuthor, CROSSREF_CONFIDENCE};
use curemail_common::Result;

/// Outcome of one scrape batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub authors: Vec<EnrichedAuthor>,
    pub emails_found: usize,
}

/// Resolve and persist an email for every author in the batch
pub async fn run_batch(
    pool: &SqlitePool,
    doi: &str,
    authors: &[Author],
    delay_ms: u64,
) -> BatchOutcome {
    let mut enriched = Vec::with_capacity(authors.len());
    let mut emails_found = 0;

    for (index, author) in authors.iter().enumerate() {
        let resolved = resolve_author(pool, doi, author).await;

        if resolved.email.is_some() {
            emails_found += 1;
        }
        enriched.push(resolved);

        // Rate shaping between sub-lookups, skipped after the last author
        if delay_ms > 0 && index + 1 < authors.len() {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    BatchOutcome {
        authors: enriched,
        emails_found,
    }
}

/// Resolve one author: ground-truth input email, then the newest cache row,
/// then the synthetic deriver. A cache read error degrades to the deriver;
/// the resolved tuple is persisted best-effort.
async fn resolve_author(pool: &SqlitePool, doi: &str, author: &Author) -> EnrichedAuthor {
    let (email, source, confidence) = if let Some(email) = &author.email {
        // Input-supplied email is ground truth on both sides of the pipeline
        (email.clone(), EmailSource::Crossref, CROSSREF_CONFIDENCE)
    } else {
        match cached_email(pool, &author.name).await {
            Ok(Some(hit)) => {
                debug!(author = %author.name, "Cache hit");
                hit
            }
            Ok(None) => synthesized(&author.name),
            Err(e) => {
                warn!(
                    doi = %doi,
                    author = %author.name,
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                synthesized(&author.name)
            }
        }
    };

    if let Err(e) = author_emails::upsert(
        pool,
        &author.name,
        Some(&email),
        source,
        Some(confidence),
        Utc::now(),
    )
    .await
    {
        warn!(
            doi = %doi,
            author = %author.name,
            error = %e,
            "Failed to persist resolution, returning it unpersisted"
        );
    }

    EnrichedAuthor {
        name: author.name.clone(),
        email: Some(email),
        source,
        confidence,
    }
}

/// Deriver fallback tuple for a name
fn synthesized(name: &str) -> (String, EmailSource, f64) {
    (derive_email(name), EmailSource::Generated, GENERATED_CONFIDENCE)
}

/// Newest cache row for the name, if it carries a non-null email
async fn cached_email(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<(String, EmailSource, f64)>> {
    let Some(record) = author_emails::lookup_latest(pool, name).await? else {
        return Ok(None);
    };
    let Some(email) = record.email else {
        return Ok(None);
    };
    Ok(Some((email, record.source, record.confidence.unwrap_or(0.5))))
}
