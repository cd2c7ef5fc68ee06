//! Scrape service integration tests
//!
//! Drives the axum router directly (no listener) against a throwaway
//! SQLite database, covering the batch contract end to end: response
//! envelope, cache write-through, and job bookkeeping.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use curemail_common::db::{self, author_emails, scraping_jobs};
use curemail_common::types::{EmailSource, JobStatus, ScrapeResponse};
use curemail_es::{build_router, AppState};

async fn test_app() -> (axum::Router, sqlx::SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = db::init_pool(&dir.path().join("curemail.db")).await.unwrap();
    let app = build_router(AppState::new(pool.clone(), 0));
    (app, pool, dir)
}

fn post_scrape(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_scrape_batch_end_to_end() {
    let (app, pool, _dir) = test_app().await;

    let request = post_scrape(serde_json::json!({
        "doi": "10.7759/cureus.12345",
        "authors": [
            { "name": "Jane Doe", "email": "jane@hospital.org" },
            { "name": "John Roe" },
            { "name": "Mary Major" }
        ]
    }));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: ScrapeResponse = json_body(response).await;
    assert!(body.success);
    assert_eq!(body.doi, "10.7759/cureus.12345");
    assert_eq!(body.total_authors, 3);
    assert_eq!(body.emails_found, 3, "Every author must resolve to an email");

    assert_eq!(body.authors[0].source, EmailSource::Crossref);
    assert_eq!(body.authors[0].confidence, 1.0);
    assert_eq!(body.authors[1].source, EmailSource::Generated);
    assert_eq!(
        body.authors[1].email.as_deref(),
        Some("john.roe@cureus-author.com")
    );
    assert_eq!(body.authors[2].source, EmailSource::Generated);
    assert_eq!(body.authors[2].confidence, 0.1);

    // Every resolution is persisted, generated ones included
    for name in ["Jane Doe", "John Roe", "Mary Major"] {
        let record = author_emails::lookup_latest(&pool, name).await.unwrap();
        assert!(record.is_some(), "Expected a cache row for {}", name);
    }

    // Job row completed with the resolved count
    let job = scraping_jobs::get_job(&pool, "10.7759/cureus.12345")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.author_count, 3);
    assert_eq!(job.emails_found, 3);
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn test_scrape_prefers_cached_over_generated() {
    let (app, pool, _dir) = test_app().await;

    author_emails::upsert(
        &pool,
        "John Roe",
        Some("john@clinic.org"),
        EmailSource::Scraped,
        Some(0.6),
        chrono::Utc::now(),
    )
    .await
    .unwrap();

    let request = post_scrape(serde_json::json!({
        "doi": "10.7759/cureus.99",
        "authors": [{ "name": "John Roe" }]
    }));

    let response = app.oneshot(request).await.unwrap();
    let body: ScrapeResponse = json_body(response).await;

    assert_eq!(body.authors[0].email.as_deref(), Some("john@clinic.org"));
    assert_eq!(body.authors[0].source, EmailSource::Scraped);
    assert_eq!(body.authors[0].confidence, 0.6);
}

#[tokio::test]
async fn test_job_endpoint_handles_doi_slashes() {
    let (app, _pool, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_scrape(serde_json::json!({
            "doi": "10.7759/cureus.777",
            "authors": [{ "name": "Jane Doe" }]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs/10.7759/cureus.777")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let job: serde_json::Value = json_body(response).await;
    assert_eq!(job["doi"], "10.7759/cureus.777");
    assert_eq!(job["status"], "completed");
}

#[tokio::test]
async fn test_unknown_job_is_404_with_failure_envelope() {
    let (app, _pool, _dir) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs/10.0/never-scraped")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("never-scraped"));
}

#[tokio::test]
async fn test_empty_doi_rejected() {
    let (app, _pool, _dir) = test_app().await;

    let response = app
        .oneshot(post_scrape(serde_json::json!({
            "doi": "   ",
            "authors": [{ "name": "Jane Doe" }]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _pool, _dir) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "curemail-es");
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_rescrape_reuses_job_row() {
    let (app, pool, _dir) = test_app().await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_scrape(serde_json::json!({
                "doi": "10.7759/cureus.55",
                "authors": [{ "name": "Jane Doe" }, { "name": "John Roe" }]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scraping_jobs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "One job row per DOI, reused across batches");

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM author_emails WHERE author_name = 'Jane Doe'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1, "Re-scraping overwrites the cache row, not stacks it");
}
