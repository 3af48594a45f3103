use anyhow::{bail, Context, Result};

use crate::template::DEFAULT_MAX_DEPTH;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Deepest directive nesting a template may use.
    pub template_max_depth: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let template_max_depth = match std::env::var("TEMPLATE_MAX_DEPTH") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("TEMPLATE_MAX_DEPTH must be a positive integer")?,
            Err(_) => DEFAULT_MAX_DEPTH,
        };
        if template_max_depth == 0 {
            bail!("TEMPLATE_MAX_DEPTH must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            template_max_depth,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
