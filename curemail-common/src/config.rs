//! Configuration loading for curemail services
//!
//! Two-tier resolution with ENV → TOML → default priority, one knob at a
//! time. Environment variables use the `CUREMAIL_` prefix.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Default bind port for the scrape service
pub const DEFAULT_PORT: u16 = 5731;

/// Default delay between per-author lookups in a scrape batch
pub const DEFAULT_SCRAPE_DELAY_MS: u64 = 100;

/// Default timeout for the client's call to the scrape service
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Optional values read from a TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub scrape_delay_ms: Option<u64>,
    pub scrape_base_url: Option<String>,
    pub remote_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Read a TOML config file; a missing file is not an error (all knobs
    /// have defaults), a malformed file is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }
}

/// Resolved configuration shared by the curemail services
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the shared SQLite database
    pub database_path: PathBuf,
    /// Bind port for the scrape service
    pub port: u16,
    /// Delay between per-author lookups in a scrape batch (rate shaping)
    pub scrape_delay_ms: u64,
    /// Base URL the enrichment client uses to reach the scrape service
    pub scrape_base_url: String,
    /// Timeout for the client's call to the scrape service
    pub remote_timeout_secs: u64,
}

impl Config {
    /// Resolve configuration from a TOML file with environment overrides
    pub fn resolve(toml_path: &Path) -> Result<Self> {
        let toml = TomlConfig::load(toml_path)?;

        let database_path = env_var("CUREMAIL_DATABASE_PATH")
            .map(PathBuf::from)
            .or(toml.database_path)
            .unwrap_or_else(|| PathBuf::from("curemail.db"));

        let port = parse_env("CUREMAIL_PORT")?
            .or(toml.port)
            .unwrap_or(DEFAULT_PORT);

        let scrape_delay_ms = parse_env("CUREMAIL_SCRAPE_DELAY_MS")?
            .or(toml.scrape_delay_ms)
            .unwrap_or(DEFAULT_SCRAPE_DELAY_MS);

        let scrape_base_url = env_var("CUREMAIL_SCRAPE_BASE_URL")
            .or(toml.scrape_base_url)
            .unwrap_or_else(|| format!("http://127.0.0.1:{}", port));

        let remote_timeout_secs = parse_env("CUREMAIL_REMOTE_TIMEOUT_SECS")?
            .or(toml.remote_timeout_secs)
            .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS);

        Ok(Config {
            database_path,
            port,
            scrape_delay_ms,
            scrape_base_url,
            remote_timeout_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("curemail.db"),
            port: DEFAULT_PORT,
            scrape_delay_ms: DEFAULT_SCRAPE_DELAY_MS,
            scrape_base_url: format!("http://127.0.0.1:{}", DEFAULT_PORT),
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, v))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_missing() {
        let config = Config::resolve(Path::new("/nonexistent/curemail.toml")).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.scrape_delay_ms, DEFAULT_SCRAPE_DELAY_MS);
        assert_eq!(config.scrape_base_url, format!("http://127.0.0.1:{}", DEFAULT_PORT));
    }

    #[test]
    fn test_toml_values_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curemail.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "port = 9000").unwrap();
        writeln!(file, "scrape_delay_ms = 25").unwrap();

        let config = Config::resolve(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.scrape_delay_ms, 25);
        assert_eq!(config.scrape_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_unparseable_env_value_rejected() {
        // Dedicated key so parallel tests reading the real knobs are unaffected
        std::env::set_var("CUREMAIL_TEST_BOGUS_PORT", "not-a-number");
        let result = parse_env::<u16>("CUREMAIL_TEST_BOGUS_PORT");
        std::env::remove_var("CUREMAIL_TEST_BOGUS_PORT");

        assert!(result.is_err(), "Unparseable values must fail loudly, not be ignored");
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curemail.toml");
        std::fs::write(&path, "port = \"not a number").unwrap();

        assert!(Config::resolve(&path).is_err());
    }
}
