/// Centralized error types for git-backdate using thiserror
///
/// Each stage of a run owns one error enum; `BackdateError` groups them so the
/// orchestrator and the binary can propagate everything with `?`.
use std::time::Duration;
use thiserror::Error;

/// Main error type for git-backdate
#[derive(Error, Debug)]
pub enum BackdateError {
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Run was cancelled")]
    Cancelled,
}

/// Errors raised while validating the start of the date range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format: '{input}' (expected YYYY-MM-DD)")]
    InvalidFormat { input: String },

    #[error("Start date '{input}' cannot be in the future")]
    FutureStart { input: String },
}

/// Errors related to the commit ledger file
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to initialize ledger '{path}': {reason}")]
    InitFailed { path: String, reason: String },

    #[error("Failed to read ledger '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to update ledger '{path}': {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Errors related to repository operations
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git repository not found at: {0}")]
    RepoNotFound(String),

    #[error("No remote repository named '{0}' found")]
    RemoteNotFound(String),

    #[error("Failed to set git config '{key}': {reason}")]
    ConfigWriteFailed { key: String, reason: String },

    #[error("Signing key verification failed: {0}")]
    SigningFailed(String),

    #[error("Commit {date} failed: {reason}")]
    CommitFailed { date: String, reason: String },

    #[error("Push failed: {0}")]
    PushFailed(String),

    #[error("Push timed out after {0:?}")]
    PublishTimeout(Duration),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}
