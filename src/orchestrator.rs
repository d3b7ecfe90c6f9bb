//! Per-commit workflow: sample -> persist -> commit -> publish
//!
//! Commits are produced strictly one after another. Each commit walks
//!
//! ```text
//! Sampling -> Persisting -> Committing -> Publishing -> Done
//!         \-> Failed (from any state, terminal for the whole batch)
//! ```
//!
//! and every transition is recorded as a [`TransitionRecord`]. A failure aborts
//! the rest of the batch; commits already created stay in history.

use crate::date_range::DateRange;
use crate::error::{BackdateError, GitError};
use crate::git::RepositoryGateway;
use crate::ledger::CommitLedger;
use crate::sampler::TimestampSampler;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// When commits are pushed to the remote
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PublishPolicy {
    /// Push after every commit
    #[default]
    PerCommit,
    /// Push once after the whole batch
    Batched,
}

impl fmt::Display for PublishPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPolicy::PerCommit => write!(f, "per-commit"),
            PublishPolicy::Batched => write!(f, "batched"),
        }
    }
}

impl FromStr for PublishPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-commit" | "per_commit" | "strict" => Ok(PublishPolicy::PerCommit),
            "batched" | "batch" => Ok(PublishPolicy::Batched),
            other => Err(format!("unknown publish policy '{}'", other)),
        }
    }
}

/// States of a single commit's workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStage {
    Sampling,
    Persisting,
    Committing,
    Publishing,
    Done,
}

impl fmt::Display for CommitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitStage::Sampling => "sampling",
            CommitStage::Persisting => "persisting",
            CommitStage::Committing => "committing",
            CommitStage::Publishing => "publishing",
            CommitStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Succeeded,
    /// Publishing postponed to the end of the batch
    Deferred,
    Failed,
}

/// Structured record emitted for every stage transition
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    /// 1-based position of the commit in the batch
    pub commit: usize,
    pub stage: CommitStage,
    /// Canonical timestamp text, once sampled
    pub timestamp: Option<String>,
    pub outcome: StageOutcome,
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// What a run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Timestamps of commits that made it into history, in creation order
    pub commits: Vec<String>,
    /// Number of successful pushes
    pub pushes: usize,
    pub records: Vec<TransitionRecord>,
}

impl RunReport {
    fn succeeded(&mut self, commit: usize, stage: CommitStage, timestamp: Option<&str>) {
        self.record(commit, stage, timestamp, StageOutcome::Succeeded, None);
    }

    fn failed(
        &mut self,
        commit: usize,
        stage: CommitStage,
        timestamp: Option<&str>,
        error: &BackdateError,
    ) {
        self.record(commit, stage, timestamp, StageOutcome::Failed, Some(error));
    }

    fn record(
        &mut self,
        commit: usize,
        stage: CommitStage,
        timestamp: Option<&str>,
        outcome: StageOutcome,
        error: Option<&BackdateError>,
    ) {
        let record = TransitionRecord {
            commit,
            stage,
            timestamp: timestamp.map(str::to_string),
            outcome,
            error: error.map(|e| e.to_string()),
            recorded_at: Utc::now(),
        };

        match &record.error {
            Some(error) => tracing::error!(
                commit,
                %stage,
                timestamp = record.timestamp.as_deref().unwrap_or("-"),
                ?outcome,
                error = error.as_str(),
                "Stage failed"
            ),
            None => tracing::info!(
                commit,
                %stage,
                timestamp = record.timestamp.as_deref().unwrap_or("-"),
                ?outcome,
                "Stage complete"
            ),
        }

        self.records.push(record);
    }
}

/// A run that stopped before every requested commit was committed and published
#[derive(Error, Debug)]
#[error("{stage} failed after {committed} commit(s)")]
pub struct RunFailure {
    /// Stage that failed
    pub stage: CommitStage,
    /// Commits created before the failure (not rolled back)
    pub committed: usize,
    pub source: BackdateError,
    /// Everything recorded up to the failure
    pub report: RunReport,
}

/// Drives the commit workflow against a [`RepositoryGateway`]
pub struct CommitOrchestrator<G, R = StdRng>
where
    G: RepositoryGateway,
    R: Rng,
{
    gateway: G,
    ledger: CommitLedger,
    sampler: TimestampSampler<R>,
    policy: PublishPolicy,
    push_timeout: Duration,
    cancel_token: CancellationToken,
}

impl<G: RepositoryGateway> CommitOrchestrator<G, StdRng> {
    /// Orchestrator with an entropy-seeded sampler, per-commit pushes and a 60s push timeout
    pub fn new(gateway: G, ledger: CommitLedger) -> Self {
        Self {
            gateway,
            ledger,
            sampler: TimestampSampler::from_entropy(),
            policy: PublishPolicy::default(),
            push_timeout: Duration::from_secs(60),
            cancel_token: CancellationToken::new(),
        }
    }
}

impl<G, R> CommitOrchestrator<G, R>
where
    G: RepositoryGateway,
    R: Rng + Send,
{
    /// Replace the random source
    pub fn with_sampler<R2>(self, sampler: TimestampSampler<R2>) -> CommitOrchestrator<G, R2>
    where
        R2: Rng + Send,
    {
        CommitOrchestrator {
            gateway: self.gateway,
            ledger: self.ledger,
            sampler,
            policy: self.policy,
            push_timeout: self.push_timeout,
            cancel_token: self.cancel_token,
        }
    }

    pub fn with_policy(mut self, policy: PublishPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = timeout;
        self
    }

    /// Token that stops the batch at the next commit boundary
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn ledger(&self) -> &CommitLedger {
        &self.ledger
    }

    /// Validate `raw_start` once, then generate `commit_count` commits
    pub async fn run(
        &mut self,
        commit_count: usize,
        raw_start: &str,
    ) -> Result<RunReport, RunFailure> {
        let range = match DateRange::validate(raw_start) {
            Ok(range) => range,
            Err(e) => {
                let mut report = RunReport::default();
                let source = BackdateError::from(e);
                report.failed(1, CommitStage::Sampling, None, &source);
                return Err(RunFailure {
                    stage: CommitStage::Sampling,
                    committed: 0,
                    source,
                    report,
                });
            }
        };

        self.run_in_range(commit_count, &range).await
    }

    /// Generate `commit_count` commits inside an already validated range
    pub async fn run_in_range(
        &mut self,
        commit_count: usize,
        range: &DateRange,
    ) -> Result<RunReport, RunFailure> {
        tracing::info!(
            "Generating {} commit(s) between {} and {} ({} policy)",
            commit_count,
            range.start(),
            range.end(),
            self.policy
        );

        let mut report = RunReport::default();
        let mut unpublished = 0usize;

        for commit in 1..=commit_count {
            if self.cancel_token.is_cancelled() {
                tracing::info!("Run cancelled before commit {}", commit);
                if unpublished > 0 {
                    self.publish(commit - 1, None, &mut report).await?;
                }
                return Err(fail(CommitStage::Sampling, BackdateError::Cancelled, report));
            }

            // Sampling
            let text = self.sampler.sample(range).canonical();
            let ts = Some(text.as_str());
            report.succeeded(commit, CommitStage::Sampling, ts);

            // Persisting
            let ledger_len = match self.ledger.append(&text) {
                Ok(len) => len,
                Err(e) => {
                    let source = BackdateError::from(e);
                    report.failed(commit, CommitStage::Persisting, ts, &source);
                    return Err(fail(CommitStage::Persisting, source, report));
                }
            };
            report.succeeded(commit, CommitStage::Persisting, ts);

            // Committing
            let paths = [self.ledger.path().to_path_buf()];
            if let Err(e) = self.gateway.stage_and_commit(&paths, &text, &text, true).await {
                let source = BackdateError::from(e);
                report.failed(commit, CommitStage::Committing, ts, &source);
                if let Err(e) = self.ledger.truncate(ledger_len - 1) {
                    tracing::warn!("Could not discard ledger entry of failed commit: {}", e);
                }
                return Err(fail(CommitStage::Committing, source, report));
            }
            report.commits.push(text.clone());
            unpublished += 1;
            report.succeeded(commit, CommitStage::Committing, ts);

            // Publishing
            match self.policy {
                PublishPolicy::PerCommit => {
                    self.publish(commit, ts, &mut report).await?;
                    unpublished = 0;
                }
                PublishPolicy::Batched => {
                    let deferred = StageOutcome::Deferred;
                    report.record(commit, CommitStage::Publishing, ts, deferred, None);
                }
            }

            report.succeeded(commit, CommitStage::Done, ts);
        }

        if unpublished > 0 {
            self.publish(commit_count, None, &mut report).await?;
        }

        tracing::info!(
            "Run complete: {} commit(s), {} push(es)",
            report.commits.len(),
            report.pushes
        );
        Ok(report)
    }

    /// Push under the configured timeout, recording the outcome
    ///
    /// On failure the report is moved into the returned `RunFailure`.
    async fn publish(
        &self,
        commit: usize,
        timestamp: Option<&str>,
        report: &mut RunReport,
    ) -> Result<(), RunFailure> {
        let result = match tokio::time::timeout(self.push_timeout, self.gateway.push()).await {
            Ok(result) => result,
            Err(_) => Err(GitError::PublishTimeout(self.push_timeout)),
        };

        match result {
            Ok(()) => {
                report.pushes += 1;
                report.succeeded(commit, CommitStage::Publishing, timestamp);
                Ok(())
            }
            Err(e) => {
                let source = BackdateError::from(e);
                report.failed(commit, CommitStage::Publishing, timestamp, &source);
                Err(fail(CommitStage::Publishing, source, std::mem::take(report)))
            }
        }
    }
}

fn fail(stage: CommitStage, source: BackdateError, report: RunReport) -> RunFailure {
    RunFailure {
        stage,
        committed: report.commits.len(),
        source,
        report,
    }
}
