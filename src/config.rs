use std::env;

use tracing::warn;
use url::Url;

/// Local development backend, matching the default the web client ships with.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/";

const API_BASE_VAR: &str = "API_BASE_URL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint path is joined against. Always ends with `/`.
    pub api_base: Url,
}

impl Config {
    /// Reads `API_BASE_URL` from the environment (after `dotenvy` has run),
    /// falling back to the local default.
    pub fn from_env() -> Self {
        match env::var(API_BASE_VAR) {
            Ok(raw) => Self::from_base(&raw),
            Err(_) => Self::from_base(DEFAULT_API_BASE),
        }
    }

    /// Builds a config from an explicit base URL, normalizing trailing slashes
    /// so `Url::join` treats the last segment as a directory.
    pub fn from_base(raw: &str) -> Self {
        let mut normalized = raw.trim_end_matches('/').to_string();
        normalized.push('/');

        let api_base = Url::parse(&normalized).unwrap_or_else(|e| {
            warn!("Invalid {API_BASE_VAR} value {raw:?}: {e}; using {DEFAULT_API_BASE}");
            Url::parse(DEFAULT_API_BASE).expect("default API base must parse")
        });

        Self { api_base }
    }
}
