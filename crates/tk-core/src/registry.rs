use crate::config::{RepositoryConfig, VcsConfig};
use crate::types::{RepoKind, RepositorySummary};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tk_vcs::Credentials;

/// Effective auto-sync settings for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub enabled: bool,
    pub interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub kind: RepoKind,
    pub path: PathBuf,
    pub auth: Option<Credentials>,
    pub sync: SyncPolicy,
}

impl Repository {
    fn from_config(entry: RepositoryConfig, global: &VcsConfig) -> Self {
        let overrides = entry.auto_sync.unwrap_or_default();
        let enabled = global.auto_sync.enabled && overrides.enabled.unwrap_or(true);
        let secs = overrides
            .interval_seconds
            .unwrap_or(global.auto_sync.interval_seconds)
            .max(1);
        Self {
            name: entry.name,
            kind: entry.kind,
            path: entry.path,
            auth: entry.auth,
            sync: SyncPolicy {
                enabled,
                interval: Duration::from_secs(secs),
            },
        }
    }

    /// Credentials as handed to a backend. Git never receives any.
    pub fn credentials(&self) -> Option<&Credentials> {
        match self.kind {
            RepoKind::Git => None,
            RepoKind::Svn => self.auth.as_ref(),
        }
    }

    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            name: self.name.clone(),
            kind: self.kind,
            path: self.path.display().to_string(),
            has_credentials: self.auth.as_ref().is_some_and(Credentials::is_complete),
            sync_enabled: self.sync.enabled,
            sync_interval_seconds: self.sync.interval.as_secs(),
        }
    }
}

/// Configured repositories in document order. Built once at startup and
/// never mutated.
#[derive(Debug, Clone, Default)]
pub struct RepositoryRegistry {
    repositories: Vec<Repository>,
}

impl RepositoryRegistry {
    pub fn from_config(config: &VcsConfig) -> Self {
        let mut seen = HashSet::new();
        let mut repositories = Vec::with_capacity(config.repositories.len());
        for entry in &config.repositories {
            if !seen.insert(entry.name.clone()) {
                tracing::warn!(repo = %entry.name, "duplicate repository name; keeping the first");
                continue;
            }
            repositories.push(Repository::from_config(entry.clone(), config));
        }
        Self { repositories }
    }

    pub fn list(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn find(&self, name: &str) -> Option<&Repository> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    pub fn summaries(&self) -> Vec<RepositorySummary> {
        self.repositories.iter().map(Repository::summary).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
