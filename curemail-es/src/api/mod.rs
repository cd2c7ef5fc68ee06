//! HTTP API for curemail-es

pub mod health;
pub mod scrape;

pub use health::health_routes;
pub use scrape::scrape_routes;
