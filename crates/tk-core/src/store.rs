use crate::audit::AuditRepository;
use crate::issues::IssueRepository;
use crate::notifications::NotificationRepository;
use crate::TrackerError;

pub trait Store {
    type Issues<'a>: IssueRepository
    where
        Self: 'a;
    type Audit<'a>: AuditRepository
    where
        Self: 'a;
    type Notifications<'a>: NotificationRepository
    where
        Self: 'a;

    fn issues(&self) -> Self::Issues<'_>;
    fn audit(&self) -> Self::Audit<'_>;
    fn notifications(&self) -> Self::Notifications<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&Self) -> Result<T, TrackerError>;
}
