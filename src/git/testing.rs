//! In-memory gateway double for setup and orchestrator tests

use super::RepositoryGateway;
use crate::error::GitError;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One observed gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    SetConfig(String, String),
    DryRunSigning,
    Commit { message: String, authored_date: String, sign: bool },
    Push,
}

/// Scriptable gateway that records every call
#[derive(Default)]
pub(crate) struct RecordingGateway {
    pub valid: bool,
    pub remotes: Vec<String>,
    pub signing_error: Option<String>,
    /// 1-based commit attempt that fails
    pub fail_commit_on: Option<usize>,
    /// 1-based push attempt that fails
    pub fail_push_on: Option<usize>,
    pub push_delay: Option<Duration>,
    /// Cancel this token once the given number of commits has succeeded
    pub cancel_after_commits: Option<(usize, CancellationToken)>,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingGateway {
    /// A valid repository with an `origin` remote and a working signing key
    pub fn healthy() -> Self {
        Self {
            valid: true,
            remotes: vec!["origin".to_string()],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Commit { authored_date, .. } => Some(authored_date),
                _ => None,
            })
            .collect()
    }

    pub fn commit_attempts(&self) -> usize {
        self.attempts(|c| matches!(c, Call::Commit { .. }))
    }

    pub fn push_attempts(&self) -> usize {
        self.attempts(|c| matches!(c, Call::Push))
    }

    fn attempts(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let kind = std::mem::discriminant(&call);
        calls.push(call);
        calls
            .iter()
            .filter(|c| std::mem::discriminant(*c) == kind)
            .count()
    }
}

#[async_trait::async_trait]
impl RepositoryGateway for RecordingGateway {
    async fn is_valid_repository(&self) -> bool {
        self.valid
    }

    async fn has_remote(&self, name: &str) -> bool {
        self.remotes.iter().any(|r| r == name)
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), GitError> {
        self.record(Call::SetConfig(key.to_string(), value.to_string()));
        Ok(())
    }

    async fn dry_run_signing(&self) -> Result<(), GitError> {
        self.record(Call::DryRunSigning);
        match &self.signing_error {
            Some(reason) => Err(GitError::SigningFailed(reason.clone())),
            None => Ok(()),
        }
    }

    async fn stage_and_commit(
        &self,
        _paths: &[PathBuf],
        message: &str,
        authored_date: &str,
        sign: bool,
    ) -> Result<(), GitError> {
        let attempt = self.record(Call::Commit {
            message: message.to_string(),
            authored_date: authored_date.to_string(),
            sign,
        });

        if self.fail_commit_on == Some(attempt) {
            return Err(GitError::CommitFailed {
                date: authored_date.to_string(),
                reason: "simulated commit failure".to_string(),
            });
        }

        if let Some((after, token)) = &self.cancel_after_commits
            && *after == attempt
        {
            token.cancel();
        }

        Ok(())
    }

    async fn push(&self) -> Result<(), GitError> {
        let attempt = self.record(Call::Push);

        if let Some(delay) = self.push_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_push_on == Some(attempt) {
            return Err(GitError::PushFailed("simulated push rejection".to_string()));
        }

        Ok(())
    }
}
