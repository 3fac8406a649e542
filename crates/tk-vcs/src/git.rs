use crate::backend::{validate_revision, Credentials, LogEntry, VcsBackend, VcsError, VcsKind};
use crate::command::VcsCommand;
use crate::reference::reference_token;

/// Field separator in `git log` output. The unit separator never shows up
/// in names or subjects, unlike `|`.
const FIELD_SEP: char = '\u{1f}';

#[derive(Debug, Clone)]
pub struct GitBackend {
    program: String,
}

impl GitBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> VcsCommand {
        VcsCommand::new(&self.program).env("GIT_TERMINAL_PROMPT", "0")
    }
}

impl Default for GitBackend {
    fn default() -> Self {
        Self::new("git")
    }
}

impl VcsBackend for GitBackend {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn search_log(&self, issue: u64, _credentials: Option<&Credentials>) -> VcsCommand {
        // `#4` must not match `#42`.
        let pattern = format!("{}([^0-9]|$)", reference_token(issue));
        self.command().args([
            "log".to_string(),
            "--extended-regexp".to_string(),
            format!("--grep={pattern}"),
            "--pretty=format:%h%x1f%an%x1f%ad%x1f%s".to_string(),
            "--date=iso-strict".to_string(),
        ])
    }

    fn parse_log(&self, stdout: &str, _issue: u64) -> Vec<LogEntry> {
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_line)
            .collect()
    }

    fn show_revision(
        &self,
        revision: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<VcsCommand, VcsError> {
        validate_revision(revision)?;
        Ok(self
            .command()
            .args(["show", "--pretty=format:", "--no-color", revision]))
    }

    fn update(&self, _credentials: Option<&Credentials>) -> VcsCommand {
        self.command().arg("pull")
    }
}

fn parse_line(line: &str) -> LogEntry {
    let mut fields = line.splitn(4, FIELD_SEP).map(str::to_string);
    LogEntry {
        revision: fields.next().unwrap_or_default(),
        author: fields.next().unwrap_or_default(),
        date: fields.next().unwrap_or_default(),
        message: fields.next().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_log_greps_for_whole_reference() {
        let command = GitBackend::default().search_log(42, None);
        assert_eq!(command.program, "git");
        assert_eq!(command.args[0], "log");
        assert!(command.args.contains(&"--grep=#42([^0-9]|$)".to_string()));
        assert!(command.args.contains(&"--date=iso-strict".to_string()));
        assert!(command.stdin.is_none());
    }

    #[test]
    fn credentials_are_never_passed_to_git() {
        let creds = Credentials {
            username: "bob".to_string(),
            password: "hunter2".to_string(),
        };
        let backend = GitBackend::default();
        for command in [
            backend.search_log(1, Some(&creds)),
            backend.update(Some(&creds)),
            backend.show_revision("abc123", Some(&creds)).unwrap(),
        ] {
            assert!(!command.args.iter().any(|arg| arg.contains("bob")));
            assert!(command.stdin.is_none());
        }
    }

    #[test]
    fn parses_separated_fields() {
        let stdout = "a1b2c3d\u{1f}Alice\u{1f}2024-03-01T10:00:00+09:00\u{1f}Fix #42 | pipes ok\n\
                      \n\
                      e4f5a6b\u{1f}Bob\u{1f}2024-02-01T09:00:00+00:00\u{1f}Refs #42\n";
        let entries = GitBackend::default().parse_log(stdout, 42);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].revision, "a1b2c3d");
        assert_eq!(entries[0].author, "Alice");
        assert_eq!(entries[0].date, "2024-03-01T10:00:00+09:00");
        assert_eq!(entries[0].message, "Fix #42 | pipes ok");
        assert_eq!(entries[1].author, "Bob");
    }

    #[test]
    fn short_lines_fill_missing_fields_with_empty_strings() {
        let entries = GitBackend::default().parse_log("abc\u{1f}Alice", 1);
        assert_eq!(
            entries,
            vec![LogEntry {
                revision: "abc".to_string(),
                author: "Alice".to_string(),
                date: String::new(),
                message: String::new(),
            }]
        );
    }

    #[test]
    fn show_revision_omits_commit_header() {
        let command = GitBackend::default().show_revision("abc123", None).unwrap();
        assert_eq!(command.args, vec!["show", "--pretty=format:", "--no-color", "abc123"]);
    }

    #[test]
    fn show_revision_rejects_option_like_input() {
        let err = GitBackend::default()
            .show_revision("--output=/etc/passwd", None)
            .unwrap_err();
        assert!(matches!(err, VcsError::InvalidRevision { .. }));
    }

    #[test]
    fn update_pulls() {
        let command = GitBackend::default().update(None);
        assert_eq!(command.args, vec!["pull"]);
        assert!(command
            .env
            .contains(&("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())));
    }
}
