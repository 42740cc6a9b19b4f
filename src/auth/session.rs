use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Token expiry time in minutes.
/// The auth provider issues JWTs that expire after ~60 minutes.
const TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Buffer time before expiry to trigger refresh (5 minutes)
const TOKEN_REFRESH_BUFFER_MINUTES: i64 = 5;

/// What the auth collaborator hands us after sign-in. The client never sees
/// credentials, only the resulting bearer token and identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn is_expired(&self) -> bool {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        Utc::now() > expiry
    }

    /// Check if the session will expire soon and should be refreshed
    pub fn needs_refresh(&self) -> bool {
        let refresh_at = self.created_at
            + Duration::minutes(TOKEN_EXPIRY_MINUTES - TOKEN_REFRESH_BUFFER_MINUTES);
        Utc::now() > refresh_at
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        let expiry = self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES);
        (expiry - Utc::now()).num_minutes().max(0)
    }
}

/// Persisted session storage. The bearer header on every API request is
/// sourced from here; obtaining and renewing tokens is the auth
/// collaborator's job.
pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns true when a non-expired session was
    /// found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read session file")?;
            let data: SessionData =
                serde_json::from_str(&contents).context("Failed to parse session file")?;

            if !data.is_expired() {
                self.data = Some(data);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data, on disk too
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if session is valid
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Get the user ID if session exists
    pub fn user_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.user_id.as_str())
    }

    /// Check if session is valid (exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.data.as_ref().map(|d| !d.is_expired()).unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(created_at: DateTime<Utc>) -> SessionData {
        SessionData {
            token: "jwt-abc".to_string(),
            user_id: "u-1".to_string(),
            email: "citizen@example.com".to_string(),
            role: Some("user".to_string()),
            created_at,
        }
    }

    #[test]
    fn test_expiry_window() {
        let fresh = sample(Utc::now());
        assert!(!fresh.is_expired());
        assert!(!fresh.needs_refresh());
        assert!(fresh.minutes_until_expiry() > 50);

        let aging = sample(Utc::now() - Duration::minutes(57));
        assert!(!aging.is_expired());
        assert!(aging.needs_refresh());

        let dead = sample(Utc::now() - Duration::minutes(61));
        assert!(dead.is_expired());
        assert_eq!(dead.minutes_until_expiry(), 0);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample(Utc::now()));
        session.save().expect("save session");

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(restored.load().expect("load session"));
        assert_eq!(restored.token(), Some("jwt-abc"));
        assert_eq!(restored.user_id(), Some("u-1"));
        assert!(restored.is_valid());
    }

    #[test]
    fn test_expired_session_not_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample(Utc::now() - Duration::minutes(120)));
        session.save().expect("save session");

        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(!restored.load().expect("load session"));
        assert!(restored.token().is_none());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample(Utc::now()));
        session.save().expect("save session");
        session.clear().expect("clear session");

        assert!(!session.is_valid());
        let mut restored = Session::new(dir.path().to_path_buf());
        assert!(!restored.load().expect("load session"));
    }
}
