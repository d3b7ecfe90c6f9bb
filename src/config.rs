/// Configuration system for git-backdate
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{BackdateError, ConfigError};
use crate::orchestrator::PublishPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Commit identity and signing
    #[serde(default)]
    pub git: GitConfig,

    /// Ledger file location
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Publishing behaviour
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Commit identity and signing configuration
///
/// The identity fields have no defaults; `validate` rejects a config without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// `user.name` (GIT_USER)
    #[serde(default)]
    pub user: Option<String>,

    /// `user.email` (GIT_EMAIL)
    #[serde(default)]
    pub email: Option<String>,

    /// `user.signingkey` (GIT_SIGNING_KEY)
    #[serde(default)]
    pub signing_key: Option<String>,

    /// `commit.gpgsign` (GIT_COMMIT_GPGSIGN)
    #[serde(default = "default_gpgsign")]
    pub commit_gpgsign: bool,

    /// `tag.gpgsign` (GIT_TAG_GPGSIGN)
    #[serde(default = "default_gpgsign")]
    pub tag_gpgsign: bool,

    /// `gpg.program` (GIT_GPG_PROGRAM), left untouched when unset
    #[serde(default)]
    pub gpg_program: Option<String>,
}

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerConfig {
    /// Ledger path; relative paths resolve against the repository root
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// When to push: after every commit or once per batch
    #[serde(default)]
    pub policy: PublishPolicy,

    /// Timeout in seconds for a single push
    #[serde(default = "default_push_timeout")]
    pub timeout_secs: u64,

    /// Remote that must exist before any commit is made
    #[serde(default = "default_remote")]
    pub remote: String,
}

fn default_gpgsign() -> bool {
    true
}

fn default_push_timeout() -> u64 {
    60
}

fn default_remote() -> String {
    "origin".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            user: None,
            email: None,
            signing_key: None,
            commit_gpgsign: default_gpgsign(),
            tag_gpgsign: default_gpgsign(),
            gpg_program: None,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            policy: PublishPolicy::default(),
            timeout_secs: default_push_timeout(),
            remote: default_remote(),
        }
    }
}

impl GitConfig {
    /// Git config key/value pairs to write before committing, in write order
    pub fn settings(&self) -> Vec<(&'static str, String)> {
        let mut settings = Vec::with_capacity(6);
        if let Some(user) = &self.user {
            settings.push(("user.name", user.clone()));
        }
        if let Some(email) = &self.email {
            settings.push(("user.email", email.clone()));
        }
        if let Some(key) = &self.signing_key {
            settings.push(("user.signingkey", key.clone()));
        }
        settings.push(("commit.gpgsign", self.commit_gpgsign.to_string()));
        settings.push(("tag.gpgsign", self.tag_gpgsign.to_string()));
        if let Some(program) = &self.gpg_program {
            settings.push(("gpg.program", program.clone()));
        }
        settings
    }
}

/// Parse a git-style boolean (`true/false`, `yes/no`, `on/off`, `1/0`)
fn parse_git_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, BackdateError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, BackdateError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), BackdateError> {
        let required = [
            ("GIT_USER", &self.git.user),
            ("GIT_EMAIL", &self.git.email),
            ("GIT_SIGNING_KEY", &self.git.signing_key),
        ];
        for (key, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(ConfigError::MissingRequired(key.to_string()).into());
            }
        }

        if self.publish.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "publish.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.publish.remote.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "publish.remote".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in production)
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(user) = lookup("GIT_USER").and_then(non_empty) {
            self.git.user = Some(user);
        }

        if let Some(email) = lookup("GIT_EMAIL").and_then(non_empty) {
            self.git.email = Some(email);
        }

        if let Some(key) = lookup("GIT_SIGNING_KEY").and_then(non_empty) {
            self.git.signing_key = Some(key);
        }

        if let Some(raw) = lookup("GIT_COMMIT_GPGSIGN") {
            match parse_git_bool(&raw) {
                Some(value) => self.git.commit_gpgsign = value,
                None => tracing::warn!("Ignoring GIT_COMMIT_GPGSIGN={:?}: not a boolean", raw),
            }
        }

        if let Some(raw) = lookup("GIT_TAG_GPGSIGN") {
            match parse_git_bool(&raw) {
                Some(value) => self.git.tag_gpgsign = value,
                None => tracing::warn!("Ignoring GIT_TAG_GPGSIGN={:?}: not a boolean", raw),
            }
        }

        if let Some(program) = lookup("GIT_GPG_PROGRAM").and_then(non_empty) {
            self.git.gpg_program = Some(program);
        }

        if let Some(path) = lookup("GIT_BACKDATE_LEDGER").and_then(non_empty) {
            self.ledger.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("GIT_BACKDATE_POLICY") {
            match raw.parse() {
                Ok(policy) => self.publish.policy = policy,
                Err(e) => tracing::warn!("Ignoring GIT_BACKDATE_POLICY={:?}: {}", raw, e),
            }
        }

        if let Some(raw) = lookup("GIT_BACKDATE_PUSH_TIMEOUT") {
            match raw.trim().parse() {
                Ok(secs) => self.publish.timeout_secs = secs,
                Err(e) => tracing::warn!("Ignoring GIT_BACKDATE_PUSH_TIMEOUT={:?}: {}", raw, e),
            }
        }

        if let Some(remote) = lookup("GIT_BACKDATE_REMOTE").and_then(non_empty) {
            self.publish.remote = remote;
        }
    }

    /// Load from an explicit file (or the default location), then apply env overrides
    ///
    /// Validation is left to the caller so CLI flags can be applied first.
    pub fn load(path: Option<&Path>) -> Result<Self, BackdateError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::load_or_default()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }
}
