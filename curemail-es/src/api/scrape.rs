//! Scrape batch endpoints
//!
//! `POST /scrape` runs one enrichment batch for a paper and `GET /jobs/*doi`
//! exposes the job record the batch left behind. DOIs contain slashes, so
//! the job route captures the rest of the path as the key.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::{info, warn};

use curemail_common::db::scraping_jobs;
use curemail_common::types::{ScrapeJob, ScrapeRequest, ScrapeResponse};

use crate::error::{ApiError, ApiResult};
use crate::{enrichment, AppState};

/// POST /scrape
///
/// Resolve an email for every author of one paper and persist the results.
/// The batch itself never fails per author; only job bookkeeping errors
/// surface as a non-2xx response.
pub async fn scrape_authors(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> ApiResult<Json<ScrapeResponse>> {
    if request.doi.trim().is_empty() {
        return Err(ApiError::BadRequest("doi must not be empty".to_string()));
    }

    info!(
        doi = %request.doi,
        authors = request.authors.len(),
        "Starting email scrape batch"
    );

    scraping_jobs::start_job(&state.db, &request.doi, request.authors.len(), Utc::now()).await?;

    let outcome = enrichment::run_batch(
        &state.db,
        &request.doi,
        &request.authors,
        state.scrape_delay_ms,
    )
    .await;

    if let Err(e) =
        scraping_jobs::complete_job(&state.db, &request.doi, outcome.emails_found, Utc::now()).await
    {
        warn!(doi = %request.doi, error = %e, "Failed to finalize scrape job");
        let _ = scraping_jobs::fail_job(&state.db, &request.doi, &e.to_string(), Utc::now()).await;
        return Err(ApiError::Common(e));
    }

    info!(
        doi = %request.doi,
        emails_found = outcome.emails_found,
        "Completed email scrape batch"
    );

    Ok(Json(ScrapeResponse {
        success: true,
        doi: request.doi,
        emails_found: outcome.emails_found,
        total_authors: outcome.authors.len(),
        authors: outcome.authors,
    }))
}

/// GET /jobs/*doi
///
/// Read the job record for a previously scraped DOI.
pub async fn get_scrape_job(
    State(state): State<AppState>,
    Path(doi): Path<String>,
) -> ApiResult<Json<ScrapeJob>> {
    let job = scraping_jobs::get_job(&state.db, &doi)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No scrape job for doi {}", doi)))?;

    Ok(Json(job))
}

/// Build scrape routes
pub fn scrape_routes() -> Router<AppState> {
    Router::new()
        .route("/scrape", post(scrape_authors))
        .route("/jobs/*doi", get(get_scrape_job))
}
