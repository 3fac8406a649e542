use crate::types::{IssueId, IssueStatus};
use tk_vcs::reference::issue_references;

/// Words that mark a commit as finishing the referenced work. Matched as
/// case-insensitive substrings, so "Fixes" and "closed" count too.
pub const CLOSING_KEYWORDS: [&str; 4] = ["fix", "close", "resolve", "complete"];

/// What a commit message asks for: the issues it references, in order and
/// with repeats, and the status they all move to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIntent {
    pub issues: Vec<IssueId>,
    pub target: IssueStatus,
}

pub fn target_status(message: &str) -> IssueStatus {
    let lowered = message.to_lowercase();
    if CLOSING_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        IssueStatus::Closed
    } else {
        IssueStatus::InProgress
    }
}

/// `None` when the message references no issue.
pub fn interpret(message: &str) -> Option<CommitIntent> {
    let issues: Vec<IssueId> = issue_references(message)
        .into_iter()
        .filter_map(|number| IssueId::try_from(number).ok())
        .collect();
    if issues.is_empty() {
        return None;
    }
    Some(CommitIntent {
        issues,
        target: target_status(message),
    })
}
