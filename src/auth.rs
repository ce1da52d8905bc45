use anyhow::Result;
use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::{config::Settings, store::SqliteStore, utils::now_ts};

// Deliberately thin: one admin credential from the environment, bearer
// tokens in SQLite. This is not an identity system.

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub expires_ts: f64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_ts: f64,
}

/// Validate the admin credential and mint a session token. `Ok(None)` means
/// the credentials were wrong (or admin login is disabled entirely because no
/// password is configured) — not an error.
pub fn login(
    settings: &Settings,
    store: &SqliteStore,
    email: &str,
    password: &str,
) -> Result<Option<IssuedToken>> {
    let now = now_ts();
    store.purge_expired_sessions(now).ok();

    let Some(expected) = settings.admin_password.as_deref() else {
        log::warn!("auth.login_refused reason=no_admin_password_configured");
        return Ok(None);
    };
    if !email.trim().eq_ignore_ascii_case(&settings.admin_email) || password != expected {
        return Ok(None);
    }

    let token = Uuid::new_v4().to_string();
    let expires_ts = now + settings.session_ttl_secs as f64;
    store.insert_session(&token, &settings.admin_email, now, expires_ts)?;
    log::info!("auth.login email={}", settings.admin_email);
    Ok(Some(IssuedToken { token, expires_ts }))
}

/// Returns true when a session was actually removed.
pub fn logout(store: &SqliteStore, token: &str) -> Result<bool> {
    let n = store.delete_session(token)?;
    Ok(n > 0)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the bearer token in `headers` to a live session. Expired tokens
/// are deleted on sight and treated as absent.
pub fn session_from_headers(store: &SqliteStore, headers: &HeaderMap) -> Result<Option<Session>> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let Some((email, expires_ts)) = store.fetch_session(&token)? else {
        return Ok(None);
    };
    if expires_ts <= now_ts() {
        store.delete_session(&token).ok();
        return Ok(None);
    }
    Ok(Some(Session { token, email, expires_ts }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> SqliteStore {
        let path = std::env::temp_dir().join(format!("uwtrack-auth-{}.sqlite", Uuid::new_v4()));
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        store.init_db().unwrap();
        store
    }

    fn settings(password: Option<&str>) -> Settings {
        Settings {
            sqlite_path: ":memory:".to_string(),
            dashboard_host: "127.0.0.1".to_string(),
            dashboard_port: 8000,
            dashboard_open_browser: false,
            enable_cors: true,
            page_size: 10,
            admin_email: "admin@uwtrack.local".to_string(),
            admin_password: password.map(str::to_string),
            session_ttl_secs: 3600,
            snapshot_refresh_secs: 60,
        }
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[test]
    fn login_roundtrip() {
        let store = temp_store();
        let settings = settings(Some("secret"));

        let issued = login(&settings, &store, "ADMIN@uwtrack.local", "secret")
            .unwrap()
            .expect("valid credentials");

        let session = session_from_headers(&store, &headers_with(&issued.token))
            .unwrap()
            .expect("live session");
        assert_eq!(session.email, "admin@uwtrack.local");

        assert!(logout(&store, &issued.token).unwrap());
        assert!(session_from_headers(&store, &headers_with(&issued.token))
            .unwrap()
            .is_none());
    }

    #[test]
    fn wrong_password_is_refused() {
        let store = temp_store();
        let settings = settings(Some("secret"));
        assert!(login(&settings, &store, "admin@uwtrack.local", "nope")
            .unwrap()
            .is_none());
    }

    #[test]
    fn login_disabled_without_configured_password() {
        let store = temp_store();
        let settings = settings(None);
        assert!(login(&settings, &store, "admin@uwtrack.local", "")
            .unwrap()
            .is_none());
    }

    #[test]
    fn expired_session_is_dropped() {
        let store = temp_store();
        store
            .insert_session("old", "admin@uwtrack.local", 0.0, 1.0)
            .unwrap();
        assert!(session_from_headers(&store, &headers_with("old"))
            .unwrap()
            .is_none());
        // Deleted on sight.
        assert!(store.fetch_session("old").unwrap().is_none());
    }

    #[test]
    fn missing_or_malformed_header_yields_no_session() {
        let store = temp_store();
        assert!(session_from_headers(&store, &HeaderMap::new())
            .unwrap()
            .is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert!(session_from_headers(&store, &headers).unwrap().is_none());
    }
}
