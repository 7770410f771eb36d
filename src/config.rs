//! Centralized configuration management for billed

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Billed REST API
    pub api_url: String,
    /// Path to the session store file
    pub session_path: PathBuf,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "billed/0.1.0".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("BILLED_API_URL")
            .unwrap_or_else(|_| "http://localhost:5678".to_string());

        let session_path = std::env::var("BILLED_SESSION_PATH")
            .unwrap_or_else(|_| "./billed-session.json".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("BILLED_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("BILLED_USER_AGENT")
                .unwrap_or_else(|_| "billed/0.1.0".to_string()),
        };

        Ok(Config {
            api_url,
            session_path,
            http,
        })
    }

    /// Get session store path as string
    pub fn session_path_str(&self) -> &str {
        self.session_path.to_str().unwrap_or("./billed-session.json")
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "BILLED_API_URL must be an http(s) URL, got: {}",
                self.api_url
            ));
        }

        if let Some(parent) = self.session_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Cannot create session directory: {}", parent.display())
                })?;
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
