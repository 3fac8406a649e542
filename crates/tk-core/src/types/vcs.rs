use crate::types::enums::RepoKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A commit that references an issue, tagged with the repository it was
/// found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommitRecord {
    pub repo: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
    pub revision: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiffResponse {
    pub diff: String,
}

/// What the API exposes about a configured repository. Credentials are
/// reduced to a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
    pub path: String,
    pub has_credentials: bool,
    pub sync_enabled: bool,
    pub sync_interval_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Synced,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub repo: String,
    #[serde(flatten)]
    pub outcome: SyncOutcome,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Synced)
    }
}
