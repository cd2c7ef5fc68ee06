//! curemail-ec - Enrichment Client library
//!
//! Client-side author email resolution, used by the search frontend when it
//! displays or exports a paper. Per paper: one batched cache lookup, at most
//! one call to the scrape service for authors the cache cannot answer, and a
//! deterministic synthetic fallback so no author is ever left without an
//! email — even when both the cache and the scrape service are down.
//!
//! The cache and the scrape service sit behind traits so the resolver is
//! testable without a database or network.

pub mod cache;
pub mod remote;
pub mod resolver;

pub use cache::{CacheStore, SqliteCacheStore};
pub use remote::{HttpRemoteEnricher, RemoteEnricher};
pub use resolver::EnrichmentResolver;
