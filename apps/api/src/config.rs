use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::jobs::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Nothing is required; every variable has a default or is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// When set, every /api/v1 request must present it in `x-app-password`.
    pub app_password: Option<String>,
    /// Replaces the bundled cover template.
    pub cover_template_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Idle time after which a session is dropped.
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_password: optional_env("APP_PASSWORD"),
            cover_template_path: optional_env("COVER_TEMPLATE_PATH").map(PathBuf::from),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            session_ttl: match optional_env("SESSION_TTL_SECS") {
                Some(v) => Duration::from_secs(
                    v.parse::<u64>()
                        .context("SESSION_TTL_SECS must be a number of seconds")?,
                ),
                None => DEFAULT_SESSION_TTL,
            },
            max_sessions: match optional_env("MAX_SESSIONS") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_SESSIONS must be a positive integer")?,
                None => DEFAULT_MAX_SESSIONS,
            },
        })
    }
}

/// Unset and blank are the same thing here.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            app_password: None,
            cover_template_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}
