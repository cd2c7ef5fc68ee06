//! Read seam over the author email cache
//!
//! The resolver only reads the cache; authoritative writes happen in the
//! scrape service. The trait keeps the resolver testable without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use curemail_common::db::author_emails;
use curemail_common::types::CacheRecord;
use curemail_common::Result;

/// Batched read access to the author email cache
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Newest cache record per name, one round trip. Unknown names are
    /// absent from the map, not errors.
    async fn lookup_many(&self, names: &[String]) -> Result<HashMap<String, CacheRecord>>;
}

/// Cache store backed by the shared curemail SQLite database
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn lookup_many(&self, names: &[String]) -> Result<HashMap<String, CacheRecord>> {
        author_emails::lookup_many(&self.pool, names).await
    }
}
