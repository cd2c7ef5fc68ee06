//! Client-side enrichment resolver
//!
//! Resolves an email for every author of a paper using a tiered strategy:
//! ground-truth input email, then cached/scraped result, then the
//! deterministic synthetic deriver. The defining guarantee: after `enhance`,
//! no author is ever left without an email, no matter which collaborators
//! failed along the way.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use curemail_common::synth::{derive_email, GENERATED_CONFIDENCE};
use curemail_common::types::{
    Author, AuthorEntry, EmailSource, EnrichedAuthor, EnrichedPaper, Paper, ScrapeRequest,
    CROSSREF_CONFIDENCE,
};
use curemail_common::Result;

use crate::cache::CacheStore;
use crate::remote::RemoteEnricher;

/// Confidence assumed for cache rows that predate confidence scoring
const DEFAULT_CACHE_CONFIDENCE: f64 = 0.5;

/// Resolved tuple for one author name
#[derive(Debug, Clone)]
struct ResolvedEmail {
    email: String,
    source: EmailSource,
    confidence: f64,
}

/// Per-paper enrichment orchestrator.
///
/// Request-scoped: holds only its collaborators, no mutable state, so any
/// number of papers can be enriched concurrently from the same resolver.
pub struct EnrichmentResolver {
    cache: Arc<dyn CacheStore>,
    remote: Arc<dyn RemoteEnricher>,
}

impl EnrichmentResolver {
    pub fn new(cache: Arc<dyn CacheStore>, remote: Arc<dyn RemoteEnricher>) -> Self {
        Self { cache, remote }
    }

    /// Enrich every author of a paper with an email, provenance and
    /// confidence. Infallible by contract: collaborator failures degrade to
    /// the synthetic fallback rather than surfacing to the caller.
    ///
    /// Calling `enhance` on an already-enriched paper is a no-op, detected
    /// through the `AuthorEntry` union — a prior result is never overwritten
    /// by a fresh synthetic one.
    pub async fn enhance(&self, paper: Paper) -> EnrichedPaper {
        if paper.authors.iter().all(AuthorEntry::is_enriched) {
            debug!(doi = %paper.doi, "Paper already enriched, skipping");
            return finish(paper, |entry| match entry {
                AuthorEntry::Enriched(author) => author,
                AuthorEntry::Raw(_) => unreachable!("all entries checked enriched"),
            });
        }

        info!(doi = %paper.doi, authors = paper.authors.len(), "Enriching paper authors");

        match self.resolve_emails(&paper).await {
            Ok(resolved) => finish(paper, |entry| apply(entry, &resolved)),
            Err(e) => {
                // Total failure of cache and remote: the guarantee still
                // holds via the deriver over the original author list.
                warn!(error = %e, "Enrichment failed, falling back to synthetic emails");
                finish(paper, |entry| apply(entry, &HashMap::new()))
            }
        }
    }

    /// Gather cached and remotely-scraped emails for the paper's authors.
    ///
    /// A failed cache read is a cache miss; a failed remote call means zero
    /// authors resolved remotely this round. Neither aborts resolution.
    async fn resolve_emails(&self, paper: &Paper) -> Result<HashMap<String, ResolvedEmail>> {
        let names: Vec<String> = paper
            .authors
            .iter()
            .map(|a| a.name().to_string())
            .collect();

        let mut resolved = match self.cache.lookup_many(&names).await {
            Ok(records) => {
                debug!(doi = %paper.doi, hits = records.len(), "Cache lookup complete");
                records
                    .into_iter()
                    .filter_map(|(name, record)| {
                        let email = record.email?;
                        Some((
                            name,
                            ResolvedEmail {
                                email,
                                source: record.source,
                                confidence: record.confidence.unwrap_or(DEFAULT_CACHE_CONFIDENCE),
                            },
                        ))
                    })
                    .collect()
            }
            Err(e) => {
                warn!(doi = %paper.doi, error = %e, "Cache lookup failed, treating as miss");
                HashMap::new()
            }
        };

        let unresolved = paper
            .authors
            .iter()
            .filter(|a| a.email().is_none() && !resolved.contains_key(a.name()))
            .count();

        if unresolved > 0 {
            debug!(doi = %paper.doi, unresolved, "Requesting remote enrichment");
            self.merge_remote(paper, &mut resolved).await;
        }

        Ok(resolved)
    }

    /// One remote call with the full author list; merge whatever it resolved
    async fn merge_remote(&self, paper: &Paper, resolved: &mut HashMap<String, ResolvedEmail>) {
        let request = ScrapeRequest {
            doi: paper.doi.clone(),
            authors: paper
                .authors
                .iter()
                .map(|a| Author {
                    name: a.name().to_string(),
                    email: a.email().map(str::to_string),
                })
                .collect(),
        };

        match self.remote.scrape(&request).await {
            Ok(response) if response.success => {
                debug!(
                    doi = %paper.doi,
                    emails_found = response.emails_found,
                    "Scrape service resolved authors"
                );
                for author in response.authors {
                    if let Some(email) = author.email {
                        resolved.insert(
                            author.name,
                            ResolvedEmail {
                                email,
                                source: author.source,
                                confidence: author.confidence,
                            },
                        );
                    }
                }
            }
            Ok(_) => {
                warn!(doi = %paper.doi, "Scrape service reported failure, proceeding without it");
            }
            Err(e) => {
                warn!(doi = %paper.doi, error = %e, "Scrape service unavailable, proceeding without it");
            }
        }
    }
}

/// Final per-author resolution, in priority order: ground-truth input email,
/// then cache/remote result, then the synthetic deriver. Entries already
/// enriched with an email pass through untouched.
fn apply(entry: AuthorEntry, resolved: &HashMap<String, ResolvedEmail>) -> EnrichedAuthor {
    match entry {
        AuthorEntry::Enriched(author) if author.email.is_some() => author,
        entry => {
            let name = entry.name().to_string();
            if let Some(email) = entry.email() {
                return EnrichedAuthor {
                    email: Some(email.to_string()),
                    name,
                    source: EmailSource::Crossref,
                    confidence: CROSSREF_CONFIDENCE,
                };
            }
            if let Some(hit) = resolved.get(&name) {
                return EnrichedAuthor {
                    email: Some(hit.email.clone()),
                    name,
                    source: hit.source,
                    confidence: hit.confidence,
                };
            }
            EnrichedAuthor {
                email: Some(derive_email(&name)),
                name,
                source: EmailSource::Generated,
                confidence: GENERATED_CONFIDENCE,
            }
        }
    }
}

/// Rebuild the paper with its authors replaced in place, preserving order
/// and count
fn finish(paper: Paper, mut f: impl FnMut(AuthorEntry) -> EnrichedAuthor) -> EnrichedPaper {
    EnrichedPaper {
        title: paper.title,
        doi: paper.doi,
        authors: paper.authors.into_iter().map(&mut f).collect(),
        publication_year: paper.publication_year,
        url: paper.url,
    }
}
