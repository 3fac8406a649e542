use crate::command::VcsCommand;
use crate::git::GitBackend;
use crate::svn::SvnBackend;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("invalid revision: {revision}")]
    InvalidRevision { revision: String },
    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("io error: {reason}")]
    Io { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    Svn,
}

/// Explicit credentials for remotes that need them. Only the SVN backend
/// consumes these; git relies on whatever the environment provides.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub git: String,
    pub svn: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            svn: "svn".to_string(),
        }
    }
}

/// One commit as reported by a backend, before it is tagged with the
/// repository it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogEntry {
    pub revision: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

pub trait VcsBackend {
    fn kind(&self) -> VcsKind;

    /// Command listing every commit whose message references `#<issue>`.
    fn search_log(&self, issue: u64, credentials: Option<&Credentials>) -> VcsCommand;

    fn parse_log(&self, stdout: &str, issue: u64) -> Vec<LogEntry>;

    /// Command printing the bare unified diff of a single revision.
    fn show_revision(
        &self,
        revision: &str,
        credentials: Option<&Credentials>,
    ) -> Result<VcsCommand, VcsError>;

    /// Command bringing the working copy up to date with its upstream.
    fn update(&self, credentials: Option<&Credentials>) -> VcsCommand;
}

#[derive(Debug, Clone)]
pub enum Backend {
    Git(GitBackend),
    Svn(SvnBackend),
}

impl Backend {
    pub fn for_kind(kind: VcsKind, tools: &ToolPaths) -> Self {
        match kind {
            VcsKind::Git => Self::Git(GitBackend::new(tools.git.clone())),
            VcsKind::Svn => Self::Svn(SvnBackend::new(tools.svn.clone())),
        }
    }

    fn inner(&self) -> &dyn VcsBackend {
        match self {
            Self::Git(git) => git,
            Self::Svn(svn) => svn,
        }
    }
}

impl VcsBackend for Backend {
    fn kind(&self) -> VcsKind {
        self.inner().kind()
    }

    fn search_log(&self, issue: u64, credentials: Option<&Credentials>) -> VcsCommand {
        self.inner().search_log(issue, credentials)
    }

    fn parse_log(&self, stdout: &str, issue: u64) -> Vec<LogEntry> {
        self.inner().parse_log(stdout, issue)
    }

    fn show_revision(
        &self,
        revision: &str,
        credentials: Option<&Credentials>,
    ) -> Result<VcsCommand, VcsError> {
        self.inner().show_revision(revision, credentials)
    }

    fn update(&self, credentials: Option<&Credentials>) -> VcsCommand {
        self.inner().update(credentials)
    }
}

/// Rejects anything that could be read as an option or that a revision
/// specifier never contains.
pub fn validate_revision(revision: &str) -> Result<(), VcsError> {
    let valid = !revision.is_empty()
        && !revision.starts_with('-')
        && revision
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '^' | '/' | '-'));
    if valid {
        Ok(())
    } else {
        Err(VcsError::InvalidRevision {
            revision: revision.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_validation() {
        assert!(validate_revision("abc123").is_ok());
        assert!(validate_revision("HEAD~2").is_ok());
        assert!(validate_revision("release/1.2").is_ok());
        assert!(validate_revision("").is_err());
        assert!(validate_revision("--output=/tmp/x").is_err());
        assert!(validate_revision("abc def").is_err());
        assert!(validate_revision("abc;rm").is_err());
    }

    #[test]
    fn backend_dispatch_follows_kind() {
        let tools = ToolPaths::default();
        assert_eq!(Backend::for_kind(VcsKind::Git, &tools).kind(), VcsKind::Git);
        assert_eq!(Backend::for_kind(VcsKind::Svn, &tools).kind(), VcsKind::Svn);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "bob".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("bob"));
        assert!(!rendered.contains("hunter2"));
    }
}
