use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub drift_z_threshold: f64,
    pub drift_min_category_frequency: f64,
    /// Connect timeout handed to the HTTP client. None keeps the transport default.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base(DEFAULT_API_BASE)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            drift_z_threshold: env_parse("DRIFT_Z_THRESHOLD").unwrap_or(3.0),
            drift_min_category_frequency: env_parse("DRIFT_MIN_CATEGORY_FREQUENCY").unwrap_or(0.01),
            connect_timeout_ms: env_parse("HTTP_CONNECT_TIMEOUT_MS"),
        }
    }

    pub fn with_base(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
            drift_z_threshold: 3.0,
            drift_min_category_frequency: 0.01,
            connect_timeout_ms: None,
        }
    }

    /// Parsed base URL. Any path component is kept as a prefix for every endpoint.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(self.api_base.trim())
            .with_context(|| format!("invalid API base URL: {}", self.api_base))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry paths: {}", self.api_base);
        }
        Ok(url)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
