pub mod audit_repo;
pub mod issue_repo;
pub mod notification_repo;
pub mod schema;
pub mod store;
pub mod util;

pub use crate::store::DbStore;
