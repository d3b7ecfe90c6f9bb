//! Pre-flight preparation of the repository before any commit is generated
//!
//! Every check here is fatal: nothing is committed unless the identity is
//! complete, the working tree and remote exist, and the signing key works.

use crate::config::Config;
use crate::error::{BackdateError, GitError};
use crate::git::RepositoryGateway;

/// Validate configuration, check the repository and write identity/signing config
pub async fn prepare_repository<G>(gateway: &G, config: &Config) -> Result<(), BackdateError>
where
    G: RepositoryGateway + ?Sized,
{
    config.validate()?;

    if !gateway.is_valid_repository().await {
        let reason = "working tree is not a git repository".to_string();
        return Err(GitError::RepoNotFound(reason).into());
    }

    let remote = config.publish.remote.as_str();
    if !gateway.has_remote(remote).await {
        return Err(GitError::RemoteNotFound(remote.to_string()).into());
    }

    for (key, value) in config.git.settings() {
        gateway.set_config(key, &value).await?;
    }

    gateway.dry_run_signing().await?;

    tracing::info!("Repository prepared: identity configured and signing key verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::git::testing::{Call, RecordingGateway};

    fn config() -> Config {
        let mut config = Config::default();
        config.git.user = Some("Ada".to_string());
        config.git.email = Some("ada@example.com".to_string());
        config.git.signing_key = Some("ABCDEF".to_string());
        config
    }

    #[tokio::test]
    async fn test_prepare_writes_config_then_probes_signing() {
        let gateway = RecordingGateway::healthy();
        prepare_repository(&gateway, &config()).await.unwrap();

        let calls = gateway.calls();
        assert_eq!(
            calls.first(),
            Some(&Call::SetConfig("user.name".to_string(), "Ada".to_string()))
        );
        assert_eq!(calls.last(), Some(&Call::DryRunSigning));
        assert!(calls.contains(&Call::SetConfig(
            "commit.gpgsign".to_string(),
            "true".to_string()
        )));
    }

    #[tokio::test]
    async fn test_missing_identity_touches_nothing() {
        let gateway = RecordingGateway::healthy();
        let mut config = config();
        config.git.email = None;

        let err = prepare_repository(&gateway, &config).await.unwrap_err();
        assert!(matches!(
            err,
            BackdateError::Config(ConfigError::MissingRequired(ref key)) if key == "GIT_EMAIL"
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_repository() {
        let gateway = RecordingGateway::default();
        let err = prepare_repository(&gateway, &config()).await.unwrap_err();
        assert!(matches!(err, BackdateError::Git(GitError::RepoNotFound(_))));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_remote() {
        let gateway = RecordingGateway {
            remotes: vec!["upstream".to_string()],
            ..RecordingGateway::healthy()
        };
        let err = prepare_repository(&gateway, &config()).await.unwrap_err();
        assert!(matches!(
            err,
            BackdateError::Git(GitError::RemoteNotFound(ref name)) if name == "origin"
        ));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_remote() {
        let gateway = RecordingGateway {
            remotes: vec!["mirror".to_string()],
            ..RecordingGateway::healthy()
        };
        let mut config = config();
        config.publish.remote = "mirror".to_string();
        assert!(prepare_repository(&gateway, &config).await.is_ok());
    }

    #[tokio::test]
    async fn test_signing_failure() {
        let gateway = RecordingGateway {
            signing_error: Some("secret key not available".to_string()),
            ..RecordingGateway::healthy()
        };
        let err = prepare_repository(&gateway, &config()).await.unwrap_err();
        assert!(matches!(err, BackdateError::Git(GitError::SigningFailed(_))));
    }
}
