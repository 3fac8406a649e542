use crate::error::ConfigError;
use crate::types::RepoKind;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tk_vcs::{Credentials, ToolPaths};

pub const DEFAULT_CONFIG_FILE: &str = "vcs_config.json";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VcsConfig {
    pub repositories: Vec<RepositoryConfig>,
    pub auto_sync: AutoSyncConfig,
    pub svn_executable_path: Option<String>,
    pub git_executable_path: Option<String>,
    pub command_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
    pub path: PathBuf,
    #[serde(default)]
    pub auth: Option<Credentials>,
    #[serde(default)]
    pub auto_sync: Option<RepoSyncConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutoSyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoSyncConfig {
    pub enabled: Option<bool>,
    pub interval_seconds: Option<u64>,
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

impl VcsConfig {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    /// Reads the document at `path`, picking the parser from the extension.
    /// Relative repository paths are resolved against the document's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            message: format!("{}: {err}", path.display()),
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut config = match extension.as_str() {
            "json" => Self::from_json_str(&content)?,
            "toml" => Self::from_toml_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat { extension }),
        };
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Like [`VcsConfig::load`], but any failure yields the empty,
    /// sync-disabled configuration. VCS features go inert instead of
    /// stopping the process.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "vcs configuration unavailable; repository features disabled"
                );
                Self::default()
            }
        }
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for repo in &mut self.repositories {
            if repo.path.is_relative() {
                repo.path = base.join(&repo.path);
            }
        }
    }

    pub fn command_timeout(&self) -> Duration {
        let secs = self
            .command_timeout_seconds
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn tools(&self) -> ToolPaths {
        let defaults = ToolPaths::default();
        ToolPaths {
            git: self.git_executable_path.clone().unwrap_or(defaults.git),
            svn: self.svn_executable_path.clone().unwrap_or(defaults.svn),
        }
    }
}
