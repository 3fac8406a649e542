pub mod backend;
pub mod command;
pub mod git;
pub mod reference;
pub mod svn;

pub use crate::backend::{Backend, Credentials, LogEntry, ToolPaths, VcsBackend, VcsError, VcsKind};
pub use crate::command::{CommandOutput, CommandRunner, ProcessRunner, VcsCommand};
