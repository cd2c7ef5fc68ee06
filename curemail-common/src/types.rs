//! Domain and wire types for the enrichment pipeline
//!
//! Papers arrive from the citation metadata source with raw authors; the
//! pipeline replaces them with enriched authors carrying provenance and
//! confidence. Wire types mirror the scrape service's JSON contract
//! (camelCase field names where the contract requires them).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence assigned to ground-truth emails supplied by the metadata source
pub const CROSSREF_CONFIDENCE: f64 = 1.0;

/// Provenance of a resolved email address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailSource {
    /// Supplied by the citation metadata source (ground truth)
    Crossref,
    /// Found by the scrape service on a live page
    Scraped,
    /// Synthesized by the deterministic deriver
    Generated,
    /// Entered by a human curator
    Manual,
    /// Served from the email cache
    Cached,
    /// Carried over unchanged from the input record after a per-author failure
    Original,
}

impl EmailSource {
    /// Text form stored in the `source` column
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailSource::Crossref => "crossref",
            EmailSource::Scraped => "scraped",
            EmailSource::Generated => "generated",
            EmailSource::Manual => "manual",
            EmailSource::Cached => "cached",
            EmailSource::Original => "original",
        }
    }

    /// Parse the text form read back from the database. Rows written by
    /// other tools may carry unknown tags; those read as `Scraped`.
    pub fn from_db(s: &str) -> Self {
        match s {
            "crossref" => EmailSource::Crossref,
            "generated" => EmailSource::Generated,
            "manual" => EmailSource::Manual,
            "cached" => EmailSource::Cached,
            "original" => EmailSource::Original,
            _ => EmailSource::Scraped,
        }
    }
}

impl std::fmt::Display for EmailSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author as delivered by the citation metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Author after resolution: always carries provenance and confidence.
/// `email` stays optional on the wire (a failed scrape may return null),
/// but resolver output guarantees `Some`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedAuthor {
    pub name: String,
    pub email: Option<String>,
    pub source: EmailSource,
    pub confidence: f64,
}

/// Author entry flowing through the pipeline: either still raw or already
/// enriched. Replaces detection-by-optional-field with an explicit union;
/// untagged so the wire shape stays `{name, email?, source?, confidence?}`.
/// The enriched variant is tried first since it is the stricter shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorEntry {
    Enriched(EnrichedAuthor),
    Raw(Author),
}

impl AuthorEntry {
    pub fn name(&self) -> &str {
        match self {
            AuthorEntry::Enriched(a) => &a.name,
            AuthorEntry::Raw(a) => &a.name,
        }
    }

    /// Input email, whichever variant carries it
    pub fn email(&self) -> Option<&str> {
        match self {
            AuthorEntry::Enriched(a) => a.email.as_deref(),
            AuthorEntry::Raw(a) => a.email.as_deref(),
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, AuthorEntry::Enriched(_))
    }
}

impl From<Author> for AuthorEntry {
    fn from(author: Author) -> Self {
        AuthorEntry::Raw(author)
    }
}

impl From<EnrichedAuthor> for AuthorEntry {
    fn from(author: EnrichedAuthor) -> Self {
        AuthorEntry::Enriched(author)
    }
}

/// Publication year as delivered upstream: some records carry a number,
/// others a free-form string ("2023", "2023 Jun")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationYear {
    Year(i64),
    Text(String),
}

impl std::fmt::Display for PublicationYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublicationYear::Year(y) => write!(f, "{}", y),
            PublicationYear::Text(s) => f.write_str(s),
        }
    }
}

/// Paper record from the citation metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub doi: String,
    pub authors: Vec<AuthorEntry>,
    #[serde(rename = "publicationYear")]
    pub publication_year: PublicationYear,
    pub url: String,
}

/// Paper after enrichment: every author resolved. Ephemeral — recomputed per
/// enrichment call, never persisted as a record of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPaper {
    pub title: String,
    pub doi: String,
    pub authors: Vec<EnrichedAuthor>,
    #[serde(rename = "publicationYear")]
    pub publication_year: PublicationYear,
    pub url: String,
}

impl From<EnrichedPaper> for Paper {
    fn from(paper: EnrichedPaper) -> Self {
        Paper {
            title: paper.title,
            doi: paper.doi,
            authors: paper.authors.into_iter().map(AuthorEntry::from).collect(),
            publication_year: paper.publication_year,
            url: paper.url,
        }
    }
}

/// One row of the `author_emails` cache, newest per name
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    pub author_name: String,
    pub email: Option<String>,
    pub source: EmailSource,
    pub confidence: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

/// Scrape batch job states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Processing,
        }
    }
}

/// One row of the `scraping_jobs` table, keyed by DOI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub doi: String,
    pub status: JobStatus,
    pub author_count: i64,
    pub emails_found: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Scrape service wire types
// ============================================================================

/// Request body for `POST /scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub doi: String,
    pub authors: Vec<Author>,
}

/// Response body for `POST /scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub doi: String,
    pub authors: Vec<EnrichedAuthor>,
    #[serde(rename = "emailsFound")]
    pub emails_found: usize,
    #[serde(rename = "totalAuthors")]
    pub total_authors: usize,
}
