use crate::backend::VcsError;
use std::fmt;
use std::io::ErrorKind;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt as _;
use tokio::process::{Child, Command};

const STDERR_LIMIT: usize = 64 * 1024;

#[derive(Clone, PartialEq, Eq)]
pub struct VcsCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub stdin: Option<String>,
}

impl VcsCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Shell-quoted command line, safe to log: stdin is never part of it.
    pub fn display(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

impl fmt::Debug for VcsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcsCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &self.env)
            .field("stdin", &self.stdin.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Captured result of one tool invocation.
///
/// A non-zero exit leaves `stdout` empty: a search without matches and a
/// broken tool look the same to callers that only read the output. The exit
/// code and stderr are kept for callers that want to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn from_exit(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let stdout = if exit_code == Some(0) {
            stdout
        } else {
            String::new()
        };
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }

    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::from_exit(Some(0), stdout.into(), String::new())
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::from_exit(Some(exit_code), String::new(), stderr.into())
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        command: &VcsCommand,
        cwd: &Path,
    ) -> impl Future<Output = Result<CommandOutput, VcsError>> + Send;
}

/// Runs commands as child processes, killing any that outlive `timeout`.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        command: &VcsCommand,
        cwd: &Path,
    ) -> impl Future<Output = Result<CommandOutput, VcsError>> + Send {
        let command = command.clone();
        let cwd = cwd.to_path_buf();
        let timeout = self.timeout;
        async move { execute(command, cwd, timeout).await }
    }
}

async fn execute(
    command: VcsCommand,
    cwd: PathBuf,
    timeout: Duration,
) -> Result<CommandOutput, VcsError> {
    tracing::debug!(command = %command.display(), cwd = %cwd.display(), "running vcs command");
    let mut process = Command::new(&command.program);
    process
        .args(&command.args)
        .envs(command.env.iter().cloned())
        .current_dir(&cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if command.stdin.is_some() {
        process.stdin(Stdio::piped());
    } else {
        process.stdin(Stdio::null());
    }

    let child = process.spawn().map_err(|err| VcsError::Spawn {
        program: command.program.clone(),
        reason: err.to_string(),
    })?;

    let interaction = interact(child, command.stdin.clone());
    let output = match tokio::time::timeout(timeout, interaction).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            return Err(VcsError::Io {
                reason: err.to_string(),
            })
        }
        Err(_) => {
            return Err(VcsError::Timeout {
                program: command.program,
                timeout,
            })
        }
    };

    Ok(CommandOutput::from_exit(
        output.status.code(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        limit_output(&output.stderr),
    ))
}

/// Dropping this future before it resolves kills the child.
async fn interact(mut child: Child, input: Option<String>) -> std::io::Result<Output> {
    if let (Some(input), Some(mut pipe)) = (input, child.stdin.take()) {
        let line = format!("{input}\n");
        // Tools may exit before reading stdin; their status and stderr remain.
        if let Err(err) = pipe.write_all(line.as_bytes()).await
            && err.kind() != ErrorKind::BrokenPipe
        {
            return Err(err);
        }
        drop(pipe);
    }
    child.wait_with_output().await
}

fn limit_output(data: &[u8]) -> String {
    let end = data.len().min(STDERR_LIMIT);
    String::from_utf8_lossy(&data[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_drops_stdout() {
        let output = CommandOutput::from_exit(Some(1), "partial".to_string(), "boom".to_string());
        assert!(output.stdout.is_empty());
        assert_eq!(output.stderr, "boom");
        assert_eq!(output.exit_code, Some(1));
        assert!(!output.success());
    }

    #[test]
    fn killed_process_counts_as_failure() {
        let output = CommandOutput::from_exit(None, "partial".to_string(), String::new());
        assert!(output.stdout.is_empty());
        assert!(!output.success());
    }

    #[test]
    fn display_never_includes_stdin() {
        let command = VcsCommand::new("svn")
            .args(["update", "--username", "bob"])
            .stdin("hunter2");
        assert_eq!(command.display(), "svn update --username bob");
        assert!(!format!("{command:?}").contains("hunter2"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let command = VcsCommand::new("sh").args(["-c", "printf hello"]);
        let output = runner.run(&command, dir.path()).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_normalizes_failures() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let command = VcsCommand::new("sh").args(["-c", "echo out; echo err >&2; exit 1"]);
        let output = runner.run(&command, dir.path()).await.unwrap();
        assert_eq!(output.exit_code, Some(1));
        assert!(output.stdout.is_empty());
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_feeds_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let command = VcsCommand::new("sh")
            .args(["-c", "read line; printf '%s' \"$line\""])
            .stdin("secret");
        let output = runner.run(&command, dir.path()).await.unwrap();
        assert_eq!(output.stdout, "secret");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_enforces_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let command = VcsCommand::new("sh").args(["-c", "sleep 5"]);
        let err = runner.run(&command, dir.path()).await.unwrap_err();
        assert!(matches!(err, VcsError::Timeout { .. }));
        assert!(err.to_string().ends_with("timed out after 100ms"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tool_exiting_before_reading_stdin_keeps_its_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let command = VcsCommand::new("sh")
            .args(["-c", "exec 0<&-; echo E155007 >&2; exit 1"])
            .stdin("s3cret");
        for _ in 0..50 {
            let output = runner.run(&command, dir.path()).await.unwrap();
            assert_eq!(output.exit_code, Some(1));
            assert_eq!(output.stderr.trim(), "E155007");
        }
    }

    #[tokio::test]
    async fn missing_working_directory_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let runner = ProcessRunner::new(Duration::from_secs(10));
        let command = VcsCommand::new("git").arg("status");
        let err = runner.run(&command, &missing).await.unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }
}
