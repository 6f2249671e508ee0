//! Login, Logout, and Status Commands

use anyhow::{bail, Result};

use crate::config::CliConfig;
use crate::display;
use crate::session::Session;

/// Stores the access token for later connections.
pub fn login(config: &CliConfig, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        bail!("token must not be empty");
    }

    Session::new(token).save(config)?;

    display::success("Logged in");
    display::info(&format!("Session stored in {:?}", config.session_path()));
    Ok(())
}

/// Forgets the stored token.
pub fn logout(config: &CliConfig) -> Result<()> {
    if Session::clear(config)? {
        display::success("Logged out");
    } else {
        display::info("No session to clear");
    }
    Ok(())
}

/// Prints session and endpoint details.
pub fn status(config: &CliConfig) -> Result<()> {
    println!("Endpoint:  {}", config.endpoint);
    println!("Data dir:  {:?}", config.data_dir);
    if config.is_logged_in() {
        display::success("Session present");
    } else {
        display::info("Not logged in");
    }
    Ok(())
}
