use crate::audit::AuditRepository;
use crate::error::{IssueError, TrackerError};
use crate::interpreter::interpret;
use crate::issues::IssueRepository;
use crate::notifications::NotificationRepository;
use crate::store::Store;
use crate::types::{
    AuditAction, AuditEntry, CommitOutcome, Issue, IssueId, IssueStatus, NewAuditEntry,
    NewNotification, Notification, NotificationKind, UserId,
};
use chrono::Utc;

pub const DEFAULT_COMMIT_AUTHOR: &str = "System";

pub struct Tracker<S: Store> {
    store: S,
}

impl<S: Store> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn issues(&self) -> IssuesApi<'_, S> {
        IssuesApi { core: self }
    }

    pub fn audit(&self) -> AuditApi<'_, S> {
        AuditApi { core: self }
    }

    pub fn notifications(&self) -> NotificationsApi<'_, S> {
        NotificationsApi { core: self }
    }

    pub fn webhooks(&self) -> WebhooksApi<'_, S> {
        WebhooksApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

pub struct IssuesApi<'a, S: Store> {
    core: &'a Tracker<S>,
}

impl<S: Store> IssuesApi<'_, S> {
    pub fn get(&self, id: &IssueId) -> Result<Issue, TrackerError> {
        self.core
            .store
            .issues()
            .get(id)?
            .ok_or(TrackerError::Issue(IssueError::NotFound))
    }
}

pub struct AuditApi<'a, S: Store> {
    core: &'a Tracker<S>,
}

impl<S: Store> AuditApi<'_, S> {
    pub fn list_for_issue(&self, id: &IssueId) -> Result<Vec<AuditEntry>, TrackerError> {
        Ok(self.core.store.audit().list_for_issue(id)?)
    }
}

pub struct NotificationsApi<'a, S: Store> {
    core: &'a Tracker<S>,
}

impl<S: Store> NotificationsApi<'_, S> {
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, TrackerError> {
        Ok(self.core.store.notifications().list_for_user(user_id)?)
    }
}

pub struct WebhooksApi<'a, S: Store> {
    core: &'a Tracker<S>,
}

enum Transition {
    Applied,
    Missing,
}

impl<S: Store> WebhooksApi<'_, S> {
    /// Moves every issue referenced by `message` to the status its keywords
    /// ask for, leaving an audit entry and a notification for the creator.
    ///
    /// Each reference is handled in its own transaction, repeats included.
    /// Unknown issues are skipped. A failure on one issue is logged and
    /// does not affect the others.
    pub fn process_commit(&self, message: &str, author: &str) -> CommitOutcome {
        let Some(intent) = interpret(message) else {
            tracing::debug!("commit message references no issue");
            return CommitOutcome::default();
        };
        let author = if author.trim().is_empty() {
            DEFAULT_COMMIT_AUTHOR
        } else {
            author
        };

        let mut outcome = CommitOutcome {
            target: Some(intent.target),
            ..CommitOutcome::default()
        };
        for id in intent.issues {
            match self.transition(&id, intent.target, message, author) {
                Ok(Transition::Applied) => {
                    tracing::info!(issue_id = %id, status = %intent.target, author, "issue updated from commit");
                    outcome.transitioned.push(id);
                }
                Ok(Transition::Missing) => {
                    tracing::debug!(issue_id = %id, "commit references unknown issue");
                    outcome.skipped.push(id);
                }
                Err(err) => {
                    tracing::warn!(issue_id = %id, error = %err, "failed to apply commit to issue");
                    outcome.failed.push(id);
                }
            }
        }
        outcome
    }

    fn transition(
        &self,
        id: &IssueId,
        target: IssueStatus,
        message: &str,
        author: &str,
    ) -> Result<Transition, TrackerError> {
        self.core.store.with_tx(|store| {
            if store.issues().get(id)?.is_none() {
                return Ok(Transition::Missing);
            }
            let now = Utc::now();
            let issue = store.issues().set_status(id, target, now)?;
            store.audit().record(
                NewAuditEntry {
                    issue_id: *id,
                    actor_id: UserId::SYSTEM,
                    action: AuditAction::VcsAutoUpdate,
                    old_value: format!("VCS Commit: {message}"),
                    new_value: format!("{author}: {message}"),
                },
                now,
            )?;
            if let Some(creator) = issue.creator_id {
                store.notifications().create(
                    NewNotification {
                        user_id: creator,
                        kind: NotificationKind::IssueUpdate,
                        message: format!("Issue #{id} was moved to {target} by a VCS commit."),
                        issue_id: *id,
                    },
                    now,
                )?;
            }
            Ok(Transition::Applied)
        })
    }
}
