pub mod audit;
pub mod enums;
pub mod ids;
pub mod io;
pub mod issue;
pub mod notification;
pub mod vcs;

pub use audit::{AuditEntry, NewAuditEntry};
pub use enums::{AuditAction, IssueStatus, NotificationKind, RepoKind};
pub use ids::{IdError, IssueId, UserId};
pub use io::{CommitOutcome, WebhookCommitInput};
pub use issue::Issue;
pub use notification::{NewNotification, Notification};
pub use vcs::{CommitRecord, DiffResponse, RepositorySummary, SyncOutcome, SyncReport};
