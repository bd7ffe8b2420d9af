//! Process configuration.
//!
//! All configuration comes from the environment, optionally preloaded from a
//! `.env` file. The resulting [`Config`] is constructed once at startup and
//! passed by reference to whatever needs it; nothing reads the environment
//! after this point.

use anyhow::{Context, Result};

/// Port used when `PORT` is not set.
const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Token for authenticating against the GitHub API. Unauthenticated
    /// requests work but are rate-limited much more aggressively.
    pub github_token: Option<String>,
    /// TCP port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present;
    /// variables already set in the environment win over file entries.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let github_token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT value `{raw}`"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { github_token, port })
    }
}
