use thiserror::Error;

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("issue not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {message}")]
    Io { message: String },
    #[error("failed to parse config: {message}")]
    Parse { message: String },
    #[error("unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("repository not found: {name}")]
    RepoNotFound { name: String },
    #[error("invalid revision: {revision}")]
    InvalidRevision { revision: String },
    #[error("command failed: {reason}")]
    CommandFailed { reason: String },
}

impl From<tk_vcs::VcsError> for VcsError {
    fn from(value: tk_vcs::VcsError) -> Self {
        match value {
            tk_vcs::VcsError::InvalidRevision { revision } => Self::InvalidRevision { revision },
            other @ (tk_vcs::VcsError::Spawn { .. }
            | tk_vcs::VcsError::Timeout { .. }
            | tk_vcs::VcsError::Io { .. }) => Self::CommandFailed {
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Issue(#[from] IssueError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<tk_vcs::VcsError> for TrackerError {
    fn from(value: tk_vcs::VcsError) -> Self {
        TrackerError::Vcs(VcsError::from(value))
    }
}
