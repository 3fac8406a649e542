use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tk_core::error::IssueError;
use tk_core::issues::IssueRepository;
use tk_core::types::{Issue, IssueId, IssueStatus, UserId};

use crate::util::{decode_enum, encode_enum, from_rfc3339, to_rfc3339};

const COLUMNS: &str = "id, title, status, creator_id, created_at, updated_at";

pub struct IssueRepo<'a> {
    pub conn: &'a Connection,
}

fn invalid(err: impl ToString) -> IssueError {
    IssueError::InvalidInput {
        message: err.to_string(),
    }
}

impl<'a> IssueRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Issues are owned by the wider tracker; this exists for seeding and
    /// tests.
    pub fn create(&self, title: &str, creator_id: Option<UserId>) -> Result<Issue, IssueError> {
        let now = Utc::now();
        let status = encode_enum(&IssueStatus::Open).map_err(invalid)?;
        self.conn
            .execute(
                "INSERT INTO issues (title, status, creator_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    title,
                    status,
                    creator_id.map(UserId::get),
                    to_rfc3339(&now),
                    to_rfc3339(&now),
                ),
            )
            .map_err(invalid)?;
        let id = IssueId::new(self.conn.last_insert_rowid()).map_err(invalid)?;
        self.get(&id)?.ok_or(IssueError::NotFound)
    }
}

impl IssueRepository for IssueRepo<'_> {
    fn get(&self, id: &IssueId) -> Result<Option<Issue>, IssueError> {
        let sql = format!("SELECT {COLUMNS} FROM issues WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql).map_err(invalid)?;
        let row = stmt
            .query_row([id.get()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .optional()
            .map_err(invalid)?;
        let Some((id, title, status, creator_id, created_at, updated_at)) = row else {
            return Ok(None);
        };
        Ok(Some(Issue {
            id: IssueId::new(id).map_err(invalid)?,
            title,
            status: decode_enum(&status).map_err(invalid)?,
            creator_id: creator_id.map(UserId::new),
            created_at: from_rfc3339(&created_at).map_err(invalid)?,
            updated_at: from_rfc3339(&updated_at).map_err(invalid)?,
        }))
    }

    fn set_status(
        &self,
        id: &IssueId,
        status: IssueStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Issue, IssueError> {
        let affected = self
            .conn
            .execute(
                "UPDATE issues SET status = ?1, updated_at = ?2 WHERE id = ?3",
                (
                    encode_enum(&status).map_err(invalid)?,
                    to_rfc3339(&updated_at),
                    id.get(),
                ),
            )
            .map_err(invalid)?;
        if affected == 0 {
            return Err(IssueError::NotFound);
        }
        self.get(id)?.ok_or(IssueError::NotFound)
    }
}
