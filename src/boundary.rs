use std::fmt;

/// Non-fatal conditions met while preparing a release.
/// These are reported to the user instead of failing the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No commits since the latest tag
    NoNewCommits {
        latest_tag: Option<String>,
        current_commit_hash: String,
    },
    /// Every commit since the latest tag is a release artifact
    NoReleasableChanges { skipped: usize },
    /// No commit matches a configured commit type
    NoRecognizedChanges { commit_count: usize },
    /// Commits bump the version but none shows up in the changelog
    OnlyHiddenChanges { bump: String },
    /// Repository identity could not be resolved; items render without links
    RepoInfoUnavailable { remote: String },
    /// No package manifest; the version comes from tags only
    ManifestNotFound { dir: String },
}

impl BoundaryWarning {
    /// Whether the condition leaves nothing to release
    pub fn blocks_release(&self) -> bool {
        matches!(
            self,
            BoundaryWarning::NoNewCommits { .. }
                | BoundaryWarning::NoReleasableChanges { .. }
                | BoundaryWarning::NoRecognizedChanges { .. }
        )
    }
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                let short_hash = if current_commit_hash.len() > 7 {
                    &current_commit_hash[..7]
                } else {
                    current_commit_hash.as_str()
                };
                match latest_tag {
                    Some(tag) => write!(
                        f,
                        "No new commits since tag '{}' (current: {})",
                        tag, short_hash
                    ),
                    None => write!(f, "No commits to release (current: {})", short_hash),
                }
            }
            BoundaryWarning::NoReleasableChanges { skipped } => {
                write!(
                    f,
                    "No releasable changes: all {} commit(s) are release commits",
                    skipped
                )
            }
            BoundaryWarning::NoRecognizedChanges { commit_count } => {
                write!(
                    f,
                    "None of the {} commit(s) match a configured commit type",
                    commit_count
                )
            }
            BoundaryWarning::OnlyHiddenChanges { bump } => {
                write!(
                    f,
                    "Only hidden changes: releasing a {} version with an empty changelog",
                    bump
                )
            }
            BoundaryWarning::RepoInfoUnavailable { remote } => {
                write!(
                    f,
                    "Cannot determine repository from remote '{}': links disabled",
                    remote
                )
            }
            BoundaryWarning::ManifestNotFound { dir } => {
                write!(
                    f,
                    "No Cargo.toml or package.json in '{}': version taken from tags",
                    dir
                )
            }
        }
    }
}
