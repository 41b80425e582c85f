use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub templates_dir: PathBuf,
    pub session_file: PathBuf,
    pub wkhtmltopdf_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_url: optional_env("API_URL", "http://localhost:4000")
                .trim_end_matches('/')
                .to_string(),
            api_key: require_env("API_KEY")?,
            templates_dir: PathBuf::from(optional_env("TEMPLATES_DIR", "templates")),
            session_file: PathBuf::from(optional_env(
                "SESSION_FILE",
                ".resume-builder/session.json",
            )),
            wkhtmltopdf_path: PathBuf::from(optional_env("WKHTMLTOPDF_PATH", "wkhtmltopdf")),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
