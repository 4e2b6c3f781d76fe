//! Slack token lookup.
//!
//! Tokens come from the `SLACK_TOKEN` environment variable or from a token
//! file under the user's config directory. Blank values count as absent.
//!
//! The token file is either a bare token or the JSON map written by
//! `slack configure`, keyed by user: `{"<user>": "<token>"}`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the Slack token.
pub const TOKEN_ENV: &str = "SLACK_TOKEN";

/// Source of the Slack API token.
pub trait CredentialProvider {
    /// Human-readable origin, used in log lines.
    fn source(&self) -> String;

    fn credential(&self) -> Option<String>;
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads the token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(TOKEN_ENV)
    }
}

impl CredentialProvider for EnvCredential {
    fn source(&self) -> String {
        format!("${}", self.var)
    }

    fn credential(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(non_blank)
    }
}

/// Reads the token from a token file.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
    user: Option<String>,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), user: None }
    }

    /// `<config dir>/slack-cli/token`, e.g. `~/.config/slack-cli/token` on Linux.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("slack-cli").join("token")))
    }

    /// Selects the entry for `user` when the file is a per-user map.
    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn token_from_map(&self, contents: &str) -> Option<String> {
        let tokens: HashMap<String, String> = match serde_json::from_str(contents) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot parse token file");
                return None;
            }
        };

        let token = match &self.user {
            Some(user) => tokens.get(user).cloned(),
            // Without a configured user only an unambiguous map is usable.
            None if tokens.len() == 1 => tokens.into_values().next(),
            None => None,
        };
        if token.is_none() {
            tracing::warn!(
                path = %self.path.display(),
                user = self.user.as_deref().unwrap_or("<unset>"),
                "no token for user in token file"
            );
        }
        token.and_then(non_blank)
    }
}

impl CredentialProvider for TokenFile {
    fn source(&self) -> String {
        self.path.display().to_string()
    }

    fn credential(&self) -> Option<String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read token file");
                return None;
            }
        };

        if contents.trim_start().starts_with('{') {
            self.token_from_map(&contents)
        } else {
            non_blank(contents)
        }
    }
}

/// Tries each provider in order and returns the first token found.
#[derive(Default)]
pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// `$SLACK_TOKEN`, then the token file (`token_file` or its default
    /// location), reading `user`'s entry if the file is a per-user map.
    pub fn standard(token_file: Option<&Path>, user: Option<&str>) -> Self {
        let chain = Self::new().with(EnvCredential::default());
        let file = token_file.map(|p| TokenFile::new(p)).or_else(TokenFile::default_location);
        match (file, user) {
            (Some(file), Some(user)) => chain.with(file.for_user(user)),
            (Some(file), None) => chain.with(file),
            (None, _) => chain,
        }
    }
}

impl CredentialProvider for CredentialChain {
    fn source(&self) -> String {
        self.providers
            .iter()
            .map(|p| p.source())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn credential(&self) -> Option<String> {
        self.providers.iter().find_map(|p| {
            let token = p.credential();
            if token.is_some() {
                tracing::debug!(source = %p.source(), "using Slack token");
            }
            token
        })
    }
}
