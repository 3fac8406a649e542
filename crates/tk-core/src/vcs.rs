use crate::config::VcsConfig;
use crate::error::VcsError;
use crate::registry::{Repository, RepositoryRegistry};
use crate::types::{CommitRecord, IssueId, SyncOutcome, SyncReport};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::join_all;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tk_vcs::{Backend, CommandRunner, ProcessRunner, ToolPaths, VcsBackend};
use tokio::sync::RwLock;

/// Runs commit searches, diffs and syncs against every configured
/// repository.
///
/// Reads of a working copy (search, diff) share its lock; a sync holds it
/// exclusively, so a query never observes a half-applied update.
pub struct VcsService<R = ProcessRunner> {
    registry: Arc<RepositoryRegistry>,
    tools: ToolPaths,
    runner: R,
    locks: HashMap<String, RwLock<()>>,
}

impl VcsService<ProcessRunner> {
    pub fn from_config(config: &VcsConfig) -> Self {
        Self::new(
            Arc::new(RepositoryRegistry::from_config(config)),
            config.tools(),
            ProcessRunner::new(config.command_timeout()),
        )
    }
}

impl<R: CommandRunner> VcsService<R> {
    pub fn new(registry: Arc<RepositoryRegistry>, tools: ToolPaths, runner: R) -> Self {
        let locks = registry
            .list()
            .iter()
            .map(|repo| (repo.name.clone(), RwLock::new(())))
            .collect();
        Self {
            registry,
            tools,
            runner,
            locks,
        }
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn backend(&self, repo: &Repository) -> Backend {
        Backend::for_kind(repo.kind.into(), &self.tools)
    }

    fn lock(&self, repo: &Repository) -> Option<&RwLock<()>> {
        self.locks.get(&repo.name)
    }

    /// Every commit in every repository whose message references `issue`,
    /// newest first. A repository that cannot be searched contributes
    /// nothing.
    pub async fn commits(&self, issue: IssueId) -> Vec<CommitRecord> {
        let searches = self
            .registry
            .list()
            .iter()
            .map(|repo| self.search_repo(repo, issue));
        let mut records: Vec<CommitRecord> = join_all(searches).await.into_iter().flatten().collect();
        records.sort_by_cached_key(|record| Reverse(parse_commit_date(&record.date)));
        records
    }

    async fn search_repo(&self, repo: &Repository, issue: IssueId) -> Vec<CommitRecord> {
        let backend = self.backend(repo);
        let command = backend.search_log(issue.as_u64(), repo.credentials());
        let _guard = match self.lock(repo) {
            Some(lock) => Some(lock.read().await),
            None => None,
        };
        let output = match self.runner.run(&command, &repo.path).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(repo = %repo.name, kind = %repo.kind, issue_id = %issue, error = %err, "commit search failed");
                return Vec::new();
            }
        };
        if !output.success() && !output.stderr.trim().is_empty() {
            tracing::debug!(
                repo = %repo.name,
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "commit search returned no output"
            );
        }
        backend
            .parse_log(&output.stdout, issue.as_u64())
            .into_iter()
            .map(|entry| CommitRecord {
                repo: repo.name.clone(),
                kind: repo.kind,
                revision: entry.revision,
                author: entry.author,
                date: entry.date,
                message: entry.message,
            })
            .collect()
    }

    /// Raw unified diff of one revision. An unknown repository is the only
    /// hard failure; a tool failure yields an empty diff.
    pub async fn diff(&self, repo_name: &str, revision: &str) -> Result<String, VcsError> {
        let repo = self
            .registry
            .find(repo_name)
            .ok_or_else(|| VcsError::RepoNotFound {
                name: repo_name.to_string(),
            })?;
        let command = self
            .backend(repo)
            .show_revision(revision, repo.credentials())?;
        let _guard = match self.lock(repo) {
            Some(lock) => Some(lock.read().await),
            None => None,
        };
        match self.runner.run(&command, &repo.path).await {
            Ok(output) => Ok(output.stdout),
            Err(err) => {
                tracing::warn!(repo = %repo.name, revision, error = %err, "diff failed");
                Ok(String::new())
            }
        }
    }

    /// Pulls (git) or updates (svn) one working copy. Failures are logged
    /// and reported, never raised.
    pub async fn sync_repo(&self, repo: &Repository) -> SyncReport {
        let command = self.backend(repo).update(repo.credentials());
        let _guard = match self.lock(repo) {
            Some(lock) => Some(lock.write().await),
            None => None,
        };
        let outcome = match self.runner.run(&command, &repo.path).await {
            Ok(output) if output.success() => {
                tracing::info!(repo = %repo.name, kind = %repo.kind, "repository synced");
                SyncOutcome::Synced
            }
            Ok(output) => {
                let stderr = output.stderr.trim().to_string();
                tracing::warn!(
                    repo = %repo.name,
                    kind = %repo.kind,
                    exit_code = ?output.exit_code,
                    stderr = %stderr,
                    "repository sync failed"
                );
                SyncOutcome::Failed {
                    reason: if stderr.is_empty() {
                        format!("exit code {:?}", output.exit_code)
                    } else {
                        stderr
                    },
                }
            }
            Err(err) => {
                tracing::warn!(repo = %repo.name, kind = %repo.kind, error = %err, "repository sync failed");
                SyncOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };
        SyncReport {
            repo: repo.name.clone(),
            outcome,
        }
    }

    pub async fn sync_all(&self) -> Vec<SyncReport> {
        join_all(self.registry.list().iter().map(|repo| self.sync_repo(repo))).await
    }
}

/// Git emits strict ISO-8601, SVN emits RFC 3339 with microseconds. The
/// plain `git --date=iso` shape is accepted too. Unparseable dates sort
/// after everything else.
fn parse_commit_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
