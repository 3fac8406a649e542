use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tk_core::audit::AuditRepository;
use tk_core::error::AuditError;
use tk_core::types::{AuditEntry, IssueId, NewAuditEntry, UserId};

use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};

pub struct AuditRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> AuditRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> AuditError {
    AuditError::InvalidInput {
        message: err.to_string(),
    }
}

impl AuditRepository for AuditRepo<'_> {
    fn record(&self, entry: NewAuditEntry, at: DateTime<Utc>) -> Result<AuditEntry, AuditError> {
        self.conn
            .execute(
                "INSERT INTO audit_logs (issue_id, user_id, action, old_value, new_value, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    entry.issue_id.get(),
                    entry.actor_id.get(),
                    encode_enum(&entry.action).map_err(invalid)?,
                    &entry.old_value,
                    &entry.new_value,
                    to_rfc3339(&at),
                ),
            )
            .map_err(invalid)?;
        Ok(AuditEntry {
            id: self.conn.last_insert_rowid(),
            issue_id: entry.issue_id,
            actor_id: entry.actor_id,
            action: entry.action,
            old_value: entry.old_value,
            new_value: entry.new_value,
            created_at: at,
        })
    }

    fn list_for_issue(&self, issue_id: &IssueId) -> Result<Vec<AuditEntry>, AuditError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, issue_id, user_id, action, old_value, new_value, created_at FROM audit_logs WHERE issue_id = ?1 ORDER BY id DESC",
            )
            .map_err(invalid)?;
        let mut rows = stmt.query([issue_id.get()]).map_err(invalid)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().map_err(invalid)? {
            entries.push(map_audit_row(row)?);
        }
        Ok(entries)
    }
}

fn map_audit_row(row: &rusqlite::Row<'_>) -> Result<AuditEntry, AuditError> {
    let issue_id: i64 = row.get(1).map_err(invalid)?;
    let action: String = row.get(3).map_err(invalid)?;
    let created_at: String = row.get(6).map_err(invalid)?;
    Ok(AuditEntry {
        id: row.get(0).map_err(invalid)?,
        issue_id: IssueId::new(issue_id).map_err(invalid)?,
        actor_id: UserId::new(row.get(2).map_err(invalid)?),
        action: decode_enum(&action).map_err(invalid)?,
        old_value: row.get(4).map_err(invalid)?,
        new_value: row.get(5).map_err(invalid)?,
        created_at: from_rfc3339(&created_at).map_err(invalid)?,
    })
}
