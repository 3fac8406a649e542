use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tk_core::error::NotificationError;
use tk_core::notifications::NotificationRepository;
use tk_core::types::{IssueId, NewNotification, Notification, UserId};

use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};

pub struct NotificationRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> NotificationRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

fn invalid(err: impl ToString) -> NotificationError {
    NotificationError::InvalidInput {
        message: err.to_string(),
    }
}

impl NotificationRepository for NotificationRepo<'_> {
    fn create(
        &self,
        input: NewNotification,
        at: DateTime<Utc>,
    ) -> Result<Notification, NotificationError> {
        self.conn
            .execute(
                "INSERT INTO notifications (user_id, type, message, issue_id, is_read, created_at) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                (
                    input.user_id.get(),
                    encode_enum(&input.kind).map_err(invalid)?,
                    &input.message,
                    input.issue_id.get(),
                    to_rfc3339(&at),
                ),
            )
            .map_err(invalid)?;
        Ok(Notification {
            id: self.conn.last_insert_rowid(),
            user_id: input.user_id,
            kind: input.kind,
            message: input.message,
            issue_id: input.issue_id,
            read: false,
            created_at: at,
        })
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, NotificationError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, type, message, issue_id, is_read, created_at FROM notifications WHERE user_id = ?1 ORDER BY id ASC",
            )
            .map_err(invalid)?;
        let mut rows = stmt.query([user_id.get()]).map_err(invalid)?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next().map_err(invalid)? {
            notifications.push(map_notification_row(row)?);
        }
        Ok(notifications)
    }
}

fn map_notification_row(row: &rusqlite::Row<'_>) -> Result<Notification, NotificationError> {
    let kind: String = row.get(2).map_err(invalid)?;
    let issue_id: i64 = row.get(4).map_err(invalid)?;
    let created_at: String = row.get(6).map_err(invalid)?;
    Ok(Notification {
        id: row.get(0).map_err(invalid)?,
        user_id: UserId::new(row.get(1).map_err(invalid)?),
        kind: decode_enum(&kind).map_err(invalid)?,
        message: row.get(3).map_err(invalid)?,
        issue_id: IssueId::new(issue_id).map_err(invalid)?,
        read: row.get(5).map_err(invalid)?,
        created_at: from_rfc3339(&created_at).map_err(invalid)?,
    })
}
