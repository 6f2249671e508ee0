//! CLI Configuration

use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the session file.
    pub data_dir: PathBuf,
    /// Realtime endpoint URL.
    pub endpoint: String,
}

impl CliConfig {
    /// Returns the session file path.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    /// Returns true if a session file exists.
    pub fn is_logged_in(&self) -> bool {
        self.session_path().exists()
    }
}
