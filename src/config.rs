use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::store::DEFAULT_MAX_CODE_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when building short links, e.g. "https://go.example.com".
    /// Never has a trailing slash.
    pub base_url: String,

    /// Optional JSON snapshot: loaded at startup, written on shutdown.
    pub data_file: Option<PathBuf>,

    /// How many generated codes to try before reporting the code space as exhausted.
    pub max_code_attempts: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = get("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;
        if port == 0 {
            anyhow::bail!("PORT must be a valid port number (1–65535)");
        }

        let max_code_attempts = match get("MAX_CODE_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .context("MAX_CODE_ATTEMPTS must be a positive integer")?,
            None => DEFAULT_MAX_CODE_ATTEMPTS,
        };
        if max_code_attempts == 0 {
            anyhow::bail!("MAX_CODE_ATTEMPTS must be at least 1");
        }

        let base_url = get("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let data_file = get("DATA_FILE")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            data_file,
            max_code_attempts,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
