//! Session Storage
//!
//! The access token lives in `session.json` under the data directory. The
//! channel reads it through `FileTokenStore` at connect time, so a token
//! replaced by a new `login` is picked up on the next reconnect.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use flipstaq_realtime::TokenStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::CliConfig;

/// Stored login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for the realtime endpoint.
    pub token: String,
    /// Display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Session {
    pub fn new(token: &str) -> Self {
        Session {
            token: token.to_string(),
            username: None,
        }
    }

    /// Loads the session, failing with a login hint when absent.
    pub fn load(config: &CliConfig) -> Result<Self> {
        let path = config.session_path();
        let data = fs::read_to_string(&path).with_context(|| {
            format!(
                "not logged in (no session at {:?}); run: flipstaq-chat login <token>",
                path
            )
        })?;
        serde_json::from_str(&data).with_context(|| format!("corrupt session file {:?}", path))
    }

    /// Writes the session file, creating the data directory if needed.
    pub fn save(&self, config: &CliConfig) -> Result<()> {
        fs::create_dir_all(&config.data_dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(config.session_path(), data)?;
        Ok(())
    }

    /// Deletes the session file. Returns true if one existed.
    pub fn clear(config: &CliConfig) -> Result<bool> {
        let path = config.session_path();
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Token source backed by the session file.
///
/// Reads on every call rather than caching, so every reconnect sees the
/// latest stored token.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(config: &CliConfig) -> Self {
        FileTokenStore {
            path: config.session_path(),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn bearer_token(&self) -> Option<String> {
        // A missing file is the normal logged-out state; stay quiet.
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Session>(&data) {
            Ok(session) => Some(session.token),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "session file is corrupt, treating as logged out");
                None
            }
        }
    }
}

// INLINE_TEST_REQUIRED: Binary crate without lib.rs - tests cannot be external
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> CliConfig {
        CliConfig {
            data_dir: dir.to_path_buf(),
            endpoint: "ws://localhost:4101/ws".to_string(),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());

        Session::new("jwt-abc").save(&config).unwrap();
        let loaded = Session::load(&config).unwrap();

        assert_eq!(loaded.token, "jwt-abc");
        assert_eq!(loaded.username, None);
    }

    #[test]
    fn test_load_without_session_mentions_login() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());

        let err = Session::load(&config).unwrap_err();
        assert!(err.to_string().contains("not logged in"));
    }

    #[test]
    fn test_clear_reports_whether_a_session_existed() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());

        assert!(!Session::clear(&config).unwrap());
        Session::new("jwt-abc").save(&config).unwrap();
        assert!(Session::clear(&config).unwrap());
        assert!(!config.is_logged_in());
    }

    #[test]
    fn test_file_token_store_reads_current_session() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());
        let store = FileTokenStore::new(&config);

        assert_eq!(store.bearer_token(), None);

        Session::new("jwt-abc").save(&config).unwrap();
        assert_eq!(store.bearer_token().as_deref(), Some("jwt-abc"));

        // A token replaced on disk shows up without rebuilding the store.
        Session::new("jwt-def").save(&config).unwrap();
        assert_eq!(store.bearer_token().as_deref(), Some("jwt-def"));
    }

    #[test]
    fn test_file_token_store_ignores_corrupt_session() {
        let temp_dir = tempdir().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::write(config.session_path(), "{not json").unwrap();

        let store = FileTokenStore::new(&config);
        assert_eq!(store.bearer_token(), None);
    }
}
