use regex::Regex;
use std::sync::LazyLock;

static ISSUE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("issue reference pattern"));

/// The `#<digits>` token a commit uses to point at an issue.
pub fn reference_token(issue: u64) -> String {
    format!("#{issue}")
}

/// Every issue number referenced in `text`, in order of appearance.
/// Repeated references are kept; numbers too large for `u64` are dropped.
pub fn issue_references(text: &str) -> Vec<u64> {
    ISSUE_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|digits| digits.as_str().parse().ok())
        .collect()
}

pub fn mentions_issue(text: &str, issue: u64) -> bool {
    issue_references(text).contains(&issue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_references_in_order() {
        assert_eq!(issue_references("Working on #7 and #8"), vec![7, 8]);
        assert_eq!(issue_references("fix #42, see #42"), vec![42, 42]);
        assert!(issue_references("No issue reference here").is_empty());
        assert!(issue_references("issue # 12 and #abc").is_empty());
    }

    #[test]
    fn mentions_requires_whole_number() {
        assert!(mentions_issue("Fixes #42", 42));
        assert!(!mentions_issue("Fixes #42", 4));
        assert!(!mentions_issue("Fixes #4", 42));
    }
}
