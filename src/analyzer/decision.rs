use crate::analyzer::classifier::{classify, ChangeSet, RawCommit};
use crate::analyzer::release_filter::is_release_artifact;
use crate::config::{CommitsConfig, Config};
use crate::domain::{bump_version, BranchPolicy, VersionBump};
use crate::error::Result;
use serde::Serialize;
use tracing::{info, instrument};

/// The release computed for one run. Every later step reads this snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseDecision {
    pub current_version: String,
    pub next_version: String,
    pub bump: VersionBump,
    pub prerelease: Option<String>,
    pub change_set: ChangeSet,
    pub branch: String,
    pub commit_count: usize,
    pub subjects: Vec<String>,
}

impl ReleaseDecision {
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

/// Result of analysis: a release, or nothing left after dropping release
/// artifact commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Release(ReleaseDecision),
    NoReleasableChanges { skipped: usize },
}

/// Analyzes commits and the current version into a [`ReleaseOutcome`]
pub struct ReleaseAnalyzer {
    commits: CommitsConfig,
    branches: BranchPolicy,
}

impl ReleaseAnalyzer {
    /// Create a new release analyzer
    pub fn new(commits: CommitsConfig, branches: BranchPolicy) -> Self {
        ReleaseAnalyzer { commits, branches }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(ReleaseAnalyzer::new(
            config.commits.clone(),
            BranchPolicy::from_config(&config.branches)?,
        ))
    }

    /// Decide the next release for `branch`.
    ///
    /// # Errors
    /// * `ReleaseError::Branch` - branch may not release
    /// * `ReleaseError::InvalidVersionFormat` - `current_version` is malformed
    #[instrument(skip(self, commits), fields(commits = commits.len()))]
    pub fn analyze(
        &self,
        current_version: &str,
        branch: &str,
        commits: &[RawCommit],
    ) -> Result<ReleaseOutcome> {
        let prerelease = self.branches.prerelease_tag(branch)?;

        let releasable: Vec<&RawCommit> = commits
            .iter()
            .filter(|c| !is_release_artifact(&c.message))
            .collect();
        if releasable.is_empty() {
            info!(skipped = commits.len(), "no releasable changes");
            return Ok(ReleaseOutcome::NoReleasableChanges {
                skipped: commits.len(),
            });
        }

        let change_set = classify(commits, &self.commits);
        let next_version = bump_version(current_version, change_set.bump, prerelease.as_deref())?;

        info!(
            current = current_version,
            next = %next_version,
            bump = %change_set.bump,
            "release decided"
        );

        Ok(ReleaseOutcome::Release(ReleaseDecision {
            current_version: current_version.to_string(),
            next_version,
            bump: change_set.bump,
            prerelease,
            change_set,
            branch: branch.to_string(),
            commit_count: releasable.len(),
            subjects: releasable.iter().map(|c| c.subject().to_string()).collect(),
        }))
    }
}
