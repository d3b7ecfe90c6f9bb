use crate::error::GitError;
use std::path::PathBuf;

/// Version-control operations needed to prepare a repository and publish commits
///
/// Every call is awaited to completion before the next one starts; implementations
/// never see overlapping operations on the same working tree.
#[async_trait::async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Whether the gateway points at a usable (non-bare) working tree
    async fn is_valid_repository(&self) -> bool;

    /// Whether a remote with this name is configured
    async fn has_remote(&self, name: &str) -> bool;

    /// Write a repository-local config value
    async fn set_config(&self, key: &str, value: &str) -> Result<(), GitError>;

    /// Prove the configured signing key can sign, without touching any ref
    async fn dry_run_signing(&self) -> Result<(), GitError>;

    /// Stage `paths` and create one commit with an explicit author date
    async fn stage_and_commit(
        &self,
        paths: &[PathBuf],
        message: &str,
        authored_date: &str,
        sign: bool,
    ) -> Result<(), GitError>;

    /// Push the current branch to the configured remote
    async fn push(&self) -> Result<(), GitError>;
}
