pub mod audit;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod issues;
pub mod notifications;
pub mod registry;
pub mod store;
pub mod sync;
pub mod tracker;
pub mod vcs;

pub mod types;

pub use crate::config::VcsConfig;
pub use crate::error::TrackerError;
pub use crate::registry::{Repository, RepositoryRegistry};
pub use crate::store::Store;
pub use crate::sync::{SchedulerState, SyncScheduler};
pub use crate::tracker::Tracker;
pub use crate::vcs::VcsService;
