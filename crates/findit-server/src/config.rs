use std::path::PathBuf;

use anyhow::{Context, Result};

/// Session secrets that must never reach production.
pub const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "change-me-to-a-random-string"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub users_path: PathBuf,
    pub items_path: PathBuf,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("FINDIT_PORT", "5500")
            .parse()
            .context("FINDIT_PORT must be a port number")?;
        let max_upload_mb: usize = var("FINDIT_MAX_UPLOAD_MB", "16")
            .parse()
            .context("FINDIT_MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Self {
            host: var("FINDIT_HOST", "0.0.0.0"),
            port,
            session_secret: var("FINDIT_SESSION_SECRET", "dev-secret-change-me"),
            users_path: var("FINDIT_USERS_PATH", "users.json").into(),
            items_path: var("FINDIT_ITEMS_PATH", "lost_items.json").into(),
            upload_dir: var("FINDIT_UPLOAD_DIR", "static/uploads").into(),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session_secret.as_str())
    }
}
