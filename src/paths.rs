/// Centralized platform-specific path computation
///
/// Config lives in the platform config directory (XDG on Unix-like systems);
/// the ledger lives inside the repository because every commit stages it.
use std::path::{Path, PathBuf};

/// Directory name used under the platform config directory
const APP_DIR: &str = "git-backdate";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else if cfg!(target_os = "macos") {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join("Library/Application Support"))
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            // Linux/Unix - follow XDG Base Directory specification
            std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|home| PathBuf::from(home).join(".config")))
                .unwrap_or_else(|_| PathBuf::from("."))
        }
    }

    /// Returns: {config_dir}/git-backdate
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(APP_DIR)
    }

    /// Returns: {config_dir}/git-backdate/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }

    /// Ledger path relative to the repository root
    pub fn default_ledger_relative_path() -> PathBuf {
        PathBuf::from("inc").join("GithubCommits.json")
    }

    /// Resolve the ledger location for a repository
    ///
    /// Relative overrides are taken relative to `repo_root`, absolute ones as-is.
    pub fn ledger_path(repo_root: &Path, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => repo_root.join(path),
            None => repo_root.join(Self::default_ledger_relative_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_not_empty() {
        let dir = PlatformPaths::config_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_default_config_path() {
        let path = PlatformPaths::default_config_path();
        assert!(path.ends_with("git-backdate/config.toml"));
    }

    #[test]
    fn test_ledger_path_default() {
        let path = PlatformPaths::ledger_path(Path::new("/work/repo"), None);
        assert_eq!(path, PathBuf::from("/work/repo/inc/GithubCommits.json"));
    }

    #[test]
    fn test_ledger_path_relative_override() {
        let path = PlatformPaths::ledger_path(
            Path::new("/work/repo"),
            Some(Path::new("data/ledger.json")),
        );
        assert_eq!(path, PathBuf::from("/work/repo/data/ledger.json"));
    }

    #[test]
    #[cfg(unix)]
    fn test_ledger_path_absolute_override() {
        let path = PlatformPaths::ledger_path(
            Path::new("/work/repo"),
            Some(Path::new("/elsewhere/ledger.json")),
        );
        assert_eq!(path, PathBuf::from("/elsewhere/ledger.json"));
    }
}
