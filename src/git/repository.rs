use super::RepositoryGateway;
use crate::error::GitError;
use anyhow::{Context, Result, anyhow};
use git2::{ConfigLevel, Repository};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Gateway over a real working tree
///
/// Inspection and config writes go through libgit2. Signed commits, the signing
/// probe and pushes shell out to `git` so the user's gpg setup is honoured.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    remote: String,
}

impl GitRepository {
    /// Discover the repository containing `path` (walks up the directory tree)
    pub fn discover<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self, GitError> {
        let path = path.as_ref();

        let repo = Repository::discover(path)
            .map_err(|e| GitError::RepoNotFound(format!("{}: {}", path.display(), e.message())))?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                GitError::RepoNotFound(format!("{} is a bare repository", path.display()))
            })?
            .to_path_buf();

        tracing::info!("Opened git repository at: {}", workdir.display());

        Ok(Self {
            workdir,
            remote: remote.into(),
        })
    }

    /// Root of the working tree
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Remote that `push` publishes to
    pub fn remote(&self) -> &str {
        &self.remote
    }

    fn open(&self) -> Result<Repository, git2::Error> {
        Repository::open(&self.workdir)
    }

    /// Run `git -C <workdir> <args>` and return trimmed stdout
    ///
    /// On unix the child gets its own process group, so a terminal Ctrl-C only
    /// reaches this process and an in-flight commit or push runs to completion.
    async fn run_git<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new("git");
        command
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let output = command.output().await.context("Failed to spawn git")?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if !output.status.success() {
            let detail = if stderr.is_empty() { &stdout } else { &stderr };
            return Err(anyhow!("git exited with {}: {}", output.status, detail));
        }

        Ok(stdout)
    }

    /// Tree to sign during the probe: HEAD's tree, or the empty tree in a fresh repo
    fn probe_tree(&self) -> Result<git2::Oid, git2::Error> {
        let repo = self.open()?;
        match repo.head().and_then(|head| head.peel_to_tree()) {
            Ok(tree) => Ok(tree.id()),
            Err(_) => repo.treebuilder(None)?.write(),
        }
    }
}

#[async_trait::async_trait]
impl RepositoryGateway for GitRepository {
    async fn is_valid_repository(&self) -> bool {
        self.open().map(|repo| !repo.is_bare()).unwrap_or(false)
    }

    async fn has_remote(&self, name: &str) -> bool {
        self.open()
            .and_then(|repo| repo.find_remote(name).map(|_| ()))
            .is_ok()
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), GitError> {
        let write = || -> Result<(), git2::Error> {
            let mut local = self.open()?.config()?.open_level(ConfigLevel::Local)?;
            local.set_str(key, value)
        };

        write().map_err(|e| GitError::ConfigWriteFailed {
            key: key.to_string(),
            reason: e.message().to_string(),
        })?;

        tracing::debug!("Set git config {}", key);
        Ok(())
    }

    async fn dry_run_signing(&self) -> Result<(), GitError> {
        let tree = self
            .probe_tree()
            .map_err(|e| GitError::SigningFailed(e.message().to_string()))?
            .to_string();

        // commit-tree writes a dangling object and moves no ref
        let oid = self
            .run_git([
                "commit-tree",
                "-S",
                "-m",
                "signing probe",
                tree.as_str(),
            ])
            .await
            .map_err(|e| GitError::SigningFailed(format!("{:#}", e)))?;

        tracing::debug!("Signing probe produced dangling commit {}", oid);
        Ok(())
    }

    async fn stage_and_commit(
        &self,
        paths: &[PathBuf],
        message: &str,
        authored_date: &str,
        sign: bool,
    ) -> Result<(), GitError> {
        let commit_error = |e: anyhow::Error| GitError::CommitFailed {
            date: authored_date.to_string(),
            reason: format!("{:#}", e),
        };

        let pathspec = || paths.iter().map(|p| p.as_os_str().to_os_string());

        let mut add_args: Vec<OsString> = vec!["add".into(), "--".into()];
        add_args.extend(pathspec());
        self.run_git(add_args).await.map_err(commit_error)?;

        let date_arg = format!("--date={}", authored_date);
        let sign_arg = if sign { "--gpg-sign" } else { "--no-gpg-sign" };
        if let Err(e) = self
            .run_git(["commit", "-m", message, date_arg.as_str(), sign_arg])
            .await
        {
            // Leave the index matching HEAD for the paths we staged
            let mut reset_args: Vec<OsString> = vec!["reset".into(), "-q".into(), "--".into()];
            reset_args.extend(pathspec());
            if let Err(reset) = self.run_git(reset_args).await {
                tracing::warn!("Could not unstage paths after failed commit: {:#}", reset);
            }
            return Err(commit_error(e));
        }

        tracing::debug!("Committed {} (signed: {})", authored_date, sign);
        Ok(())
    }

    async fn push(&self) -> Result<(), GitError> {
        self.run_git(["push", self.remote.as_str(), "HEAD"])
            .await
            .map_err(|e| GitError::PushFailed(format!("{:#}", e)))?;

        tracing::debug!("Pushed HEAD to {}", self.remote);
        Ok(())
    }
}
