use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GhGetError, Result};

/// TOML configuration, keyed by `"owner/repo"`. A config entry pins down
/// the pattern, archive path, output name and platform aliases for a
/// repository so the command line stays short:
///
/// ```toml
/// [repo."hashicorp/terraform"]
/// pattern = "terraform_{{.Ver}}_{{.OS}}_{{.Arch}}.zip"
/// archive-path = "terraform"
/// write-to-bin = "terraform"
///
/// [repo."hashicorp/terraform".arch]
/// arm = "arm6"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub repo: HashMap<String, RepoConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct RepoConfig {
    pub endpoint: Option<String>,
    pub pattern: Option<String>,
    pub archive_path: Option<String>,
    pub write_to_bin: Option<String>,

    /// OS alias overrides, keyed by canonical identifier.
    #[serde(default)]
    pub os: HashMap<String, String>,

    /// CPU architecture alias overrides, keyed by canonical identifier.
    #[serde(default)]
    pub arch: HashMap<String, String>,
}

impl Config {
    /// Load configuration. An explicit path must exist; otherwise the
    /// search order is the current directory, the user config directory,
    /// then `/etc/ghget/`. No file found means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                tracing::debug!("using config file {}", candidate.display());
                return Self::read(&candidate);
            }
        }

        Ok(Config::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GhGetError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| GhGetError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("ghget.toml")];
        if let Some(dirs) = directories::BaseDirs::new() {
            paths.push(dirs.config_dir().join("ghget").join("ghget.toml"));
        }
        paths.push(PathBuf::from("/etc/ghget/ghget.toml"));
        paths
    }

    pub fn repo_config(&self, owner: &str, repo: &str) -> Option<&RepoConfig> {
        self.repo.get(&format!("{owner}/{repo}"))
    }

    /// Apply the repository's config section on top of the parsed flags.
    /// Config values win over flag values for that repository.
    pub fn apply_to(&self, args: &mut crate::cli::GetArgs, owner: &str, repo: &str) {
        let Some(repo_config) = self.repo_config(owner, repo) else {
            return;
        };

        if let Some(endpoint) = &repo_config.endpoint {
            args.endpoint = endpoint.clone();
        }
        if repo_config.pattern.is_some() {
            args.pattern = repo_config.pattern.clone();
        }
        if repo_config.archive_path.is_some() {
            args.archive_path = repo_config.archive_path.clone();
        }
        if repo_config.write_to_bin.is_some() {
            args.write_to_bin = repo_config.write_to_bin.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ghget.toml");

        let config_content = r#"
[repo."hashicorp/terraform"]
pattern = "terraform_{{.Ver}}_{{.OS}}_{{.Arch}}.zip"
archive-path = "terraform"
write-to-bin = "terraform"

[repo."hashicorp/terraform".arch]
arm = "arm6"
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        let repo = config.repo_config("hashicorp", "terraform").unwrap();

        assert_eq!(
            repo.pattern.as_deref(),
            Some("terraform_{{.Ver}}_{{.OS}}_{{.Arch}}.zip")
        );
        assert_eq!(repo.archive_path.as_deref(), Some("terraform"));
        assert_eq!(repo.write_to_bin.as_deref(), Some("terraform"));
        assert_eq!(repo.arch.get("arm").map(String::as_str), Some("arm6"));
        assert!(repo.os.is_empty());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, GhGetError::Config { .. }));
    }

    #[test]
    fn test_unknown_repo_has_no_config() {
        let config = Config::default();
        assert!(config.repo_config("owner", "repo").is_none());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ghget.toml");
        fs::write(&config_path, "this is not [valid toml").unwrap();

        let err = Config::load(Some(&config_path)).unwrap_err();
        assert!(matches!(err, GhGetError::Config { .. }));
    }
}
