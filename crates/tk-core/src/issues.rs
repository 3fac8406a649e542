use crate::error::IssueError;
use crate::types::{Issue, IssueId, IssueStatus};
use chrono::{DateTime, Utc};

pub trait IssueRepository {
    fn get(&self, id: &IssueId) -> Result<Option<Issue>, IssueError>;
    fn set_status(
        &self,
        id: &IssueId,
        status: IssueStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Issue, IssueError>;
}
