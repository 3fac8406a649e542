use rusqlite::Connection;
use tk_core::error::TrackerError;
use tk_core::store::Store;

use crate::audit_repo::AuditRepo;
use crate::issue_repo::IssueRepo;
use crate::notification_repo::NotificationRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn internal(err: &rusqlite::Error) -> TrackerError {
    TrackerError::Internal {
        message: err.to_string(),
    }
}

impl Store for DbStore {
    type Issues<'a>
        = IssueRepo<'a>
    where
        Self: 'a;
    type Audit<'a>
        = AuditRepo<'a>
    where
        Self: 'a;
    type Notifications<'a>
        = NotificationRepo<'a>
    where
        Self: 'a;

    fn issues(&self) -> Self::Issues<'_> {
        IssueRepo::new(&self.conn)
    }

    fn audit(&self) -> Self::Audit<'_> {
        AuditRepo::new(&self.conn)
    }

    fn notifications(&self) -> Self::Notifications<'_> {
        NotificationRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&Self) -> Result<T, TrackerError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(|err| internal(&err))?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .map_err(|err| internal(&err))?;
                Ok(value)
            }
            Err(err) => {
                self.conn
                    .execute_batch("ROLLBACK")
                    .map_err(|rollback_err| internal(&rollback_err))?;
                Err(err)
            }
        }
    }
}
