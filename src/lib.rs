//! # git-backdate - Randomly Backdated Commit Generation
//!
//! Fabricates a sequence of signed commits whose author dates are sampled at
//! random from a historical window, records every generated timestamp in an
//! append-only JSON ledger, and publishes the commits to a remote.
//!
//! ## Overview
//!
//! A run takes a start date (`YYYY-MM-DD`) and a commit count. The window runs
//! from the start date to "now"; each commit gets a uniformly sampled day in
//! that window and a uniformly sampled time of day, clamped to the window.
//!
//! ## Architecture
//!
//! ```text
//!   start date ──► DateRange ──► TimestampSampler
//!                                      │
//!                                      ▼
//!                               CommitLedger (JSON)
//!                                      │
//!                                      ▼
//!                       RepositoryGateway: commit ──► push
//! ```
//!
//! All steps of one commit finish before the next commit is sampled.
//!
//! ## Modules
//!
//! - [`date_range`]: start-date parsing and window validation
//! - [`sampler`]: random timestamp sampling and canonical text form
//! - [`ledger`]: append-only record of generated timestamps
//! - [`orchestrator`]: the per-commit workflow and publish policies
//! - [`git`]: repository gateway trait and git-backed implementation
//! - [`setup`]: identity/signing preparation before a run
//! - [`config`]: configuration with environment variable support
//! - [`error`]: error types
//! - [`paths`]: platform config and ledger locations
//!
//! ## Usage Example
//!
//! ```no_run
//! use git_backdate::git::GitRepository;
//! use git_backdate::ledger::CommitLedger;
//! use git_backdate::orchestrator::CommitOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = GitRepository::discover(".", "origin")?;
//!     let ledger = CommitLedger::new(gateway.workdir().join("inc/GithubCommits.json"));
//!     ledger.ensure_initialized()?;
//!
//!     let mut orchestrator = CommitOrchestrator::new(gateway, ledger);
//!     let report = orchestrator.run(5, "2024-12-15").await?;
//!     println!("created {} commits", report.commits.len());
//!     Ok(())
//! }
//! ```

/// Configuration management with environment variable overrides
pub mod config;

/// Start-date parsing and historical window validation
pub mod date_range;

/// Error types and utilities
pub mod error;

/// Repository gateway trait and git-backed implementation
pub mod git;

/// Append-only JSON ledger of generated commit timestamps
pub mod ledger;

/// Sequential sample/persist/commit/publish workflow
pub mod orchestrator;

/// Platform-specific config and ledger paths
pub mod paths;

/// Random timestamp sampling within a date range
pub mod sampler;

/// Repository preparation before the first commit
pub mod setup;
