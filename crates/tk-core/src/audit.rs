use crate::error::AuditError;
use crate::types::{AuditEntry, IssueId, NewAuditEntry};
use chrono::{DateTime, Utc};

pub trait AuditRepository {
    fn record(&self, entry: NewAuditEntry, at: DateTime<Utc>) -> Result<AuditEntry, AuditError>;
    fn list_for_issue(&self, issue_id: &IssueId) -> Result<Vec<AuditEntry>, AuditError>;
}
