use std::env;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

fn get_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn get_env_bool(key: &str, default: bool) -> bool {
    match get_env(key) {
        None => default,
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"),
    }
}

fn get_env_usize(key: &str, default: usize) -> Result<usize> {
    match get_env(key) {
        None => Ok(default),
        Some(v) => Ok(v
            .parse::<usize>()
            .map_err(|e| anyhow!("{key} invalid int: {e}"))?),
    }
}

fn get_env_string(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Storage
    pub sqlite_path: String,

    // Dashboard server
    pub dashboard_host: String,
    pub dashboard_port: u16,
    pub dashboard_open_browser: bool,
    pub enable_cors: bool,

    // Listing
    pub page_size: usize,

    // Admin sessions. Login is refused outright when no password is set.
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub session_ttl_secs: u64,

    // Snapshot cache
    pub snapshot_refresh_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let s = Self {
            sqlite_path: get_env_string("SQLITE_PATH", "./data/uwtrack.sqlite"),
            dashboard_host: get_env_string("DASHBOARD_HOST", "127.0.0.1"),
            dashboard_port: get_env_usize("DASHBOARD_PORT", 8000)? as u16,
            dashboard_open_browser: get_env_bool("DASHBOARD_OPEN_BROWSER", false),
            enable_cors: get_env_bool("DASHBOARD_ENABLE_CORS", true),
            page_size: get_env_usize("ITEMS_PER_PAGE", 10)?,
            admin_email: get_env_string("ADMIN_EMAIL", "admin@uwtrack.local").to_lowercase(),
            admin_password: get_env("ADMIN_PASSWORD"),
            session_ttl_secs: get_env_usize("SESSION_TTL_SECS", 43_200)? as u64,
            snapshot_refresh_secs: get_env_usize("SNAPSHOT_REFRESH_SECS", 60)? as u64,
        };

        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size < 1 {
            return Err(anyhow!("ITEMS_PER_PAGE must be >= 1 (got {})", self.page_size));
        }
        if self.page_size > 500 {
            return Err(anyhow!(
                "ITEMS_PER_PAGE must be <= 500 (got {})",
                self.page_size
            ));
        }
        if self.session_ttl_secs < 60 {
            return Err(anyhow!(
                "SESSION_TTL_SECS must be >= 60 (got {})",
                self.session_ttl_secs
            ));
        }
        if self.snapshot_refresh_secs < 1 {
            return Err(anyhow!(
                "SNAPSHOT_REFRESH_SECS must be >= 1 (got {})",
                self.snapshot_refresh_secs
            ));
        }
        if self.admin_email.is_empty() {
            return Err(anyhow!("ADMIN_EMAIL must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Settings {
        Settings {
            sqlite_path: ":memory:".to_string(),
            dashboard_host: "127.0.0.1".to_string(),
            dashboard_port: 8000,
            dashboard_open_browser: false,
            enable_cors: true,
            page_size: 10,
            admin_email: "admin@uwtrack.local".to_string(),
            admin_password: Some("secret".to_string()),
            session_ttl_secs: 3600,
            snapshot_refresh_secs: 60,
        }
    }

    #[test]
    fn valid_settings_pass() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut s = base();
        s.page_size = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn short_session_ttl_rejected() {
        let mut s = base();
        s.session_ttl_secs = 10;
        assert!(s.validate().is_err());
    }

    #[test]
    fn empty_admin_email_rejected() {
        let mut s = base();
        s.admin_email = String::new();
        assert!(s.validate().is_err());
    }
}
