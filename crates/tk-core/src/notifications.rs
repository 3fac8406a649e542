use crate::error::NotificationError;
use crate::types::{NewNotification, Notification, UserId};
use chrono::{DateTime, Utc};

pub trait NotificationRepository {
    fn create(
        &self,
        input: NewNotification,
        at: DateTime<Utc>,
    ) -> Result<Notification, NotificationError>;
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>, NotificationError>;
}
