use crate::backend::{validate_revision, Credentials, LogEntry, VcsBackend, VcsError, VcsKind};
use crate::command::VcsCommand;
use crate::reference::{mentions_issue, reference_token};
use regex::Regex;
use std::sync::LazyLock;

static LOG_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<logentry\s+revision="([^"]+)"\s*>(.*?)</logentry>"#)
        .expect("logentry pattern")
});
static AUTHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<author>(.*?)</author>").expect("author pattern"));
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<date>(.*?)</date>").expect("date pattern"));
static MSG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<msg>(.*?)</msg>").expect("msg pattern"));

#[derive(Debug, Clone)]
pub struct SvnBackend {
    program: String,
}

impl SvnBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `svn <args>` with authentication appended when both halves of the
    /// credentials are present. The password travels over stdin so it never
    /// shows up in the process list.
    fn command<I, S>(&self, args: I, credentials: Option<&Credentials>) -> VcsCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = VcsCommand::new(&self.program).args(args);
        match credentials.filter(|creds| creds.is_complete()) {
            Some(creds) => command
                .args([
                    "--username",
                    creds.username.as_str(),
                    "--password-from-stdin",
                    "--no-auth-cache",
                    "--non-interactive",
                ])
                .stdin(creds.password.clone()),
            None => command,
        }
    }
}

impl Default for SvnBackend {
    fn default() -> Self {
        Self::new("svn")
    }
}

impl VcsBackend for SvnBackend {
    fn kind(&self) -> VcsKind {
        VcsKind::Svn
    }

    fn search_log(&self, issue: u64, credentials: Option<&Credentials>) -> VcsCommand {
        let token = reference_token(issue);
        self.command(["log", "--search", token.as_str(), "--xml"], credentials)
    }

    fn parse_log(&self, stdout: &str, issue: u64) -> Vec<LogEntry> {
        parse_xml_log(stdout)
            .into_iter()
            .filter(|entry| mentions_issue(&entry.message, issue))
            .collect()
    }

    fn show_revision(
        &self,
        revision: &str,
        credentials: Option<&Credentials>,
    ) -> Result<VcsCommand, VcsError> {
        let number = revision.strip_prefix('r').unwrap_or(revision);
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(VcsError::InvalidRevision {
                revision: revision.to_string(),
            });
        }
        validate_revision(number)?;
        Ok(self.command(["diff", "-c", number], credentials))
    }

    fn update(&self, credentials: Option<&Credentials>) -> VcsCommand {
        self.command(["update"], credentials)
    }
}

/// Pulls every well-formed `<logentry>` out of `svn log --xml` output.
/// Entries missing an author, date or message are skipped.
pub fn parse_xml_log(xml: &str) -> Vec<LogEntry> {
    LOG_ENTRY
        .captures_iter(xml)
        .filter_map(|caps| {
            let revision = caps.get(1)?.as_str();
            let body = caps.get(2)?.as_str();
            let author = AUTHOR.captures(body)?.get(1)?.as_str();
            let date = DATE.captures(body)?.get(1)?.as_str();
            let message = MSG.captures(body)?.get(1)?.as_str();
            Some(LogEntry {
                revision: unescape(revision),
                author: unescape(author),
                date: unescape(date),
                message: unescape(message.trim()),
            })
        })
        .collect()
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
