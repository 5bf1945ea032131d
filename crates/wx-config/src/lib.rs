//! Application configuration
//!
//! Loaded from a TOML file located via the `WX_CONFIG` env var, with every
//! section optional and sensible defaults from the accessor methods.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Upstream archive holding the raw per-station dataset
pub const DEFAULT_DATASET_URL: &str =
    "https://github.com/corteva/code-challenge-template/archive/refs/heads/main.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub data_dir: Option<String>,
    pub dataset_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub tokens: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub ingest: Option<IngestConfig>,
    pub http: Option<HttpConfig>,
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from the WX_CONFIG path (default `wx.toml`)
    /// if present, falling back to defaults otherwise
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WX_CONFIG").unwrap_or_else(|_| "wx.toml".to_string());
        let cfg = if Path::new(&path).exists() {
            toml::from_str::<AppConfig>(&fs::read_to_string(&path)?)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    /// Database connection string; `DATABASE_URL` env takes precedence
    pub fn database_url(&self) -> String {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return url;
        }
        self.database
            .as_ref()
            .and_then(|db| db.url.clone())
            .unwrap_or_else(|| "sqlite://wx.db".to_string())
    }

    /// Directory holding the per-station data files (default `wx_data`)
    pub fn data_dir(&self) -> String {
        self.ingest
            .as_ref()
            .and_then(|ingest| ingest.data_dir.clone())
            .unwrap_or_else(|| "wx_data".to_string())
    }

    /// Archive URL used to populate a missing data directory
    pub fn dataset_url(&self) -> String {
        self.ingest
            .as_ref()
            .and_then(|ingest| ingest.dataset_url.clone())
            .unwrap_or_else(|| DEFAULT_DATASET_URL.to_string())
    }

    /// HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> String {
        self.http
            .as_ref()
            .and_then(|http| http.bind.clone())
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
    }

    /// Accepted API bearer tokens; empty means no client can authenticate
    pub fn auth_tokens(&self) -> Vec<String> {
        self.auth
            .as_ref()
            .and_then(|auth| auth.tokens.clone())
            .unwrap_or_default()
    }
}
