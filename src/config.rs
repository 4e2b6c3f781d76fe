use std::path::PathBuf;
use std::time::Duration;

/// Default Slack Web API base URL.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Default timeout for each Slack API request (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be a positive integer")]
    InvalidTimeout(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    /// Overrides the default token file location when set.
    pub token_file: Option<PathBuf>,
    /// Entry to read when the token file holds one token per user.
    pub token_user: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_file: None,
            token_user: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `SLACK_API_URL` (optional, default `https://slack.com/api`)
    /// - `SLACK_TIMEOUT_SECS` (optional, default 30) — max seconds per Slack request
    /// - `SLACK_TOKEN_FILE` (optional) — token file path, see [`crate::credentials`]
    /// - `SLACK_TOKEN_USER` (optional) — user entry in a per-user token file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SLACK_API_URL") {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty("SLACK_API_URL"));
            }
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(val) = lookup("SLACK_TIMEOUT_SECS") {
            let secs = val
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidTimeout("SLACK_TIMEOUT_SECS"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("SLACK_TOKEN_FILE") {
            if path.trim().is_empty() {
                return Err(ConfigError::Empty("SLACK_TOKEN_FILE"));
            }
            config.token_file = Some(PathBuf::from(path));
        }

        config.token_user = lookup("SLACK_TOKEN_USER")
            .map(|user| user.trim().to_string())
            .filter(|user| !user.is_empty());

        Ok(config)
    }
}

