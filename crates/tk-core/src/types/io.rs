use crate::types::enums::IssueStatus;
use crate::types::ids::IssueId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookCommitInput {
    pub message: Option<String>,
    pub author: Option<String>,
}

/// Per-issue result of interpreting one commit message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommitOutcome {
    pub target: Option<IssueStatus>,
    pub transitioned: Vec<IssueId>,
    pub skipped: Vec<IssueId>,
    pub failed: Vec<IssueId>,
}
