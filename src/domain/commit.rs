use regex::Regex;
use std::sync::LazyLock;

/// Type token given to commits whose subject is not a conventional commit
pub const UNKNOWN_TYPE: &str = "unknown";

/// Conventional commit subject grammar: `type(scope)!: description`.
///
/// - `type` starts with a letter, then letters, digits, `_` or `-`
/// - `scope` is optional and may hold anything but parentheses and newlines
///   (`api/v2`, `@org/pkg`, `ui-kit`)
/// - `!` before the colon marks a breaking change
static SUBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[A-Za-z][A-Za-z0-9_-]*)(?:\((?P<scope>[^()\r\n]*)\))?(?P<bang>!)?:[ \t]*(?P<description>.*)$",
    )
    .expect("Invalid regex")
});

/// Trailing pull-request back-reference, e.g. `... (#123)`
static PR_REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(#(?P<number>\d+)\)\s*$").expect("Invalid regex"));

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
    pub body: String,
    pub hash: Option<String>,
    pub pr_number: Option<String>,
}

impl ParsedCommit {
    /// Parse a full commit message (subject, optional blank line, body).
    ///
    /// Subjects that do not follow the grammar yield type [`UNKNOWN_TYPE`],
    /// the raw subject as description and no breaking flag.
    ///
    /// `breaking_keywords` are matched case-insensitively anywhere in the body.
    pub fn parse(message: &str, hash: Option<&str>, breaking_keywords: &[String]) -> Self {
        let (subject, body) = match message.split_once('\n') {
            Some((subject, body)) => (subject.trim(), body.trim()),
            None => (message.trim(), ""),
        };
        let hash = hash.map(str::to_string);

        let Some(captures) = SUBJECT_REGEX.captures(subject) else {
            return Self::unknown(subject, body, hash);
        };

        let raw_description = captures
            .name("description")
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if raw_description.is_empty() {
            return Self::unknown(subject, body, hash);
        }

        let (description, pr_number) = split_pr_reference(raw_description);
        let scope = captures
            .name("scope")
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let has_bang = captures.name("bang").is_some();
        let is_breaking_change = has_bang || body_mentions_keyword(body, breaking_keywords);

        ParsedCommit {
            r#type: captures["type"].to_lowercase(),
            scope,
            description,
            is_breaking_change,
            body: body.to_string(),
            hash,
            pr_number,
        }
    }

    fn unknown(subject: &str, body: &str, hash: Option<String>) -> Self {
        ParsedCommit {
            r#type: UNKNOWN_TYPE.to_string(),
            scope: None,
            description: subject.to_string(),
            is_breaking_change: false,
            body: body.to_string(),
            hash,
            pr_number: None,
        }
    }

    /// Whether the subject followed the conventional commit grammar
    pub fn is_conventional(&self) -> bool {
        self.r#type != UNKNOWN_TYPE
    }

    /// Description as shown in rendered documents, with ` (scope)` appended
    pub fn display_description(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{} ({})", self.description, scope),
            None => self.description.clone(),
        }
    }

    /// Text following the first breaking keyword found on a body line.
    ///
    /// The keyword and any following colon, dash or whitespace are trimmed.
    /// Returns `None` when no line carries a keyword or nothing follows it.
    pub fn breaking_details(&self, breaking_keywords: &[String]) -> Option<String> {
        for line in self.body.lines() {
            let lowered = line.to_ascii_lowercase();
            for keyword in breaking_keywords.iter().filter(|k| !k.is_empty()) {
                let needle = keyword.to_ascii_lowercase();
                if let Some(idx) = lowered.find(&needle) {
                    let details = line[idx + needle.len()..]
                        .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
                        .trim_end();
                    if details.is_empty() {
                        return None;
                    }
                    return Some(details.to_string());
                }
            }
        }
        None
    }
}

fn body_mentions_keyword(body: &str, breaking_keywords: &[String]) -> bool {
    if body.is_empty() {
        return false;
    }
    let lowered = body.to_ascii_lowercase();
    breaking_keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| lowered.contains(&k.to_ascii_lowercase()))
}

/// Strips the final `(#N)` from a description, returning the PR number.
fn split_pr_reference(description: &str) -> (String, Option<String>) {
    if let Some(captures) = PR_REFERENCE_REGEX.captures(description) {
        let whole = captures.get(0).map(|m| m.start()).unwrap_or(description.len());
        let stripped = description[..whole].trim_end();
        if !stripped.is_empty() {
            return (stripped.to_string(), Some(captures["number"].to_string()));
        }
    }
    (description.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["BREAKING CHANGE".to_string(), "BREAKING-CHANGE".to_string()]
    }

    fn parse(message: &str) -> ParsedCommit {
        ParsedCommit::parse(message, None, &keywords())
    }

    #[test]
    fn test_parse_with_scope() {
        let commit = parse("feat(auth): add login");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, Some("auth".to_string()));
        assert_eq!(commit.description, "add login");
        assert!(!commit.is_breaking_change);
        assert!(commit.is_conventional());
    }

    #[test]
    fn test_parse_without_scope() {
        let commit = parse("fix: handle empty input");
        assert_eq!(commit.r#type, "fix");
        assert_eq!(commit.scope, None);
        assert_eq!(commit.description, "handle empty input");
    }

    #[test]
    fn test_parse_with_breaking_marker() {
        let commit = parse("feat(auth)!: redesign login");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, Some("auth".to_string()));
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_without_scope() {
        let commit = parse("feat!: remove old api");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, None);
        assert_eq!(commit.description, "remove old api");
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_scope_with_special_characters() {
        let commit = parse("fix(api/v2): trim headers");
        assert_eq!(commit.scope, Some("api/v2".to_string()));

        let commit = parse("chore(@org/ui-kit): bump peer deps");
        assert_eq!(commit.scope, Some("@org/ui-kit".to_string()));

        let commit = parse("feat(core.io)!: stream reads");
        assert_eq!(commit.scope, Some("core.io".to_string()));
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_empty_scope_is_none() {
        let commit = parse("docs(): fix typo");
        assert_eq!(commit.r#type, "docs");
        assert_eq!(commit.scope, None);
    }

    #[test]
    fn test_parse_type_is_lowercased() {
        let commit = parse("Feat: shout less");
        assert_eq!(commit.r#type, "feat");
    }

    #[test]
    fn test_parse_non_conventional() {
        let commit = parse("Random commit message");
        assert_eq!(commit.r#type, UNKNOWN_TYPE);
        assert_eq!(commit.description, "Random commit message");
        assert!(!commit.is_breaking_change);
        assert!(!commit.is_conventional());
    }

    #[test]
    fn test_parse_empty_description_is_unknown() {
        assert!(!parse("feat:").is_conventional());
        assert!(!parse("feat:   ").is_conventional());
        assert!(!parse("").is_conventional());
    }

    #[test]
    fn test_parse_missing_colon_is_unknown() {
        assert!(!parse("feat add thing").is_conventional());
        assert!(!parse("feat(scope) add thing").is_conventional());
    }

    #[test]
    fn test_parse_unparseable_ignores_body_keyword() {
        let commit = parse("Merge branch 'main'\n\nBREAKING CHANGE: nope");
        assert!(!commit.is_conventional());
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_change_footer() {
        let commit = parse("fix: something\n\nBREAKING CHANGE: desc");
        assert!(commit.is_breaking_change);
        assert_eq!(commit.body, "BREAKING CHANGE: desc");
    }

    #[test]
    fn test_parse_breaking_keyword_case_insensitive() {
        let commit = parse("fix: something\n\nthis is a breaking change for callers");
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_keyword_in_subject_is_not_breaking() {
        let commit = parse("docs: explain BREAKING CHANGE footers");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_multiline_body() {
        let commit = parse("feat(cli): add flag\n\nFirst paragraph.\n\nSecond paragraph.\n");
        assert_eq!(commit.description, "add flag");
        assert_eq!(commit.body, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_parse_crlf_subject() {
        let commit = parse("fix: windows line endings\r\n\r\nbody");
        assert_eq!(commit.description, "windows line endings");
        assert_eq!(commit.body, "body");
    }

    #[test]
    fn test_parse_pr_reference_stripped() {
        let commit = parse("fix: resolve Y (#42)");
        assert_eq!(commit.description, "resolve Y");
        assert_eq!(commit.pr_number, Some("42".to_string()));
    }

    #[test]
    fn test_parse_only_final_pr_reference_used() {
        let commit = parse("feat: port (#12) to new api (#34)");
        assert_eq!(commit.description, "port (#12) to new api");
        assert_eq!(commit.pr_number, Some("34".to_string()));
    }

    #[test]
    fn test_parse_body_pr_references_ignored() {
        let commit = parse("fix: stop leak\n\nSee (#7) and (#8)");
        assert_eq!(commit.pr_number, None);
        assert_eq!(commit.description, "stop leak");
    }

    #[test]
    fn test_parse_pr_reference_not_trailing() {
        let commit = parse("fix: revert (#9) partially");
        assert_eq!(commit.pr_number, None);
        assert_eq!(commit.description, "revert (#9) partially");
    }

    #[test]
    fn test_parse_keeps_hash() {
        let commit = ParsedCommit::parse("feat: x", Some("abcdef1234567"), &keywords());
        assert_eq!(commit.hash.as_deref(), Some("abcdef1234567"));
    }

    #[test]
    fn test_display_description_scope_suffix() {
        assert_eq!(parse("feat(auth): add login").display_description(), "add login (auth)");
        assert_eq!(parse("feat: add login").display_description(), "add login");
    }

    #[test]
    fn test_breaking_details() {
        let commit = parse("feat!: drop Z\n\nBREAKING CHANGE: Z removed");
        assert_eq!(commit.breaking_details(&keywords()), Some("Z removed".to_string()));

        let commit = parse("feat!: drop Z\n\nSome text.\nBREAKING-CHANGE - use W instead");
        assert_eq!(
            commit.breaking_details(&keywords()),
            Some("use W instead".to_string())
        );
    }

    #[test]
    fn test_breaking_details_absent() {
        let commit = parse("feat!: drop Z");
        assert_eq!(commit.breaking_details(&keywords()), None);

        let commit = parse("feat!: drop Z\n\nBREAKING CHANGE:");
        assert_eq!(commit.breaking_details(&keywords()), None);
    }
}
