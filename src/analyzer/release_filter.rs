use regex::Regex;
use std::sync::LazyLock;

/// Subjects of commits produced by a release itself. Re-analyzing those
/// would make every release trigger the next one.
static RELEASE_ARTIFACT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \[skip\ ci\] | \[ci\ skip\]       # CI skip markers anywhere
        | ^chore\(release\):             # chore(release): 1.2.3
        | ^release:                      # release: 1.2.3
        | ^v?\d+\.\d+\.\d+               # bare version number
        | \bbump(ed)?\ version\b | \bversion\ bump\b
        ",
    )
    .expect("Invalid regex")
});

/// Whether a commit message is a release artifact that must not be analyzed.
///
/// Only the subject line is inspected.
pub fn is_release_artifact(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or_default().trim();
    RELEASE_ARTIFACT_REGEX.is_match(subject)
}
