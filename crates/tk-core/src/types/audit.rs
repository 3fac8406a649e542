use crate::types::enums::AuditAction;
use crate::types::ids::{IssueId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub issue_id: IssueId,
    pub actor_id: UserId,
    pub action: AuditAction,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub issue_id: IssueId,
    pub actor_id: UserId,
    pub action: AuditAction,
    pub old_value: String,
    pub new_value: String,
}
