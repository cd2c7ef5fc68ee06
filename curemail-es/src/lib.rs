//! curemail-es library interface
//!
//! Exposes the router and state for integration testing.

pub mod api;
pub mod enrichment;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection pool
    pub db: SqlitePool,
    /// Delay between per-author lookups in a scrape batch
    pub scrape_delay_ms: u64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, scrape_delay_ms: u64) -> Self {
        Self {
            db,
            scrape_delay_ms,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::scrape_routes())
        .merge(api::health_routes())
        .with_state(state)
}
