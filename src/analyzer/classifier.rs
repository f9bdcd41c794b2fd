use crate::analyzer::release_filter::is_release_artifact;
use crate::config::CommitsConfig;
use crate::domain::{ParsedCommit, VersionBump};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Reserved section receiving every breaking change
pub const BREAKING_SECTION: &str = "Breaking Changes";

/// One commit as read from history: full message plus optional hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub message: String,
    pub hash: Option<String>,
}

impl RawCommit {
    pub fn new(message: impl Into<String>) -> Self {
        RawCommit {
            message: message.into(),
            hash: None,
        }
    }

    pub fn with_hash(message: impl Into<String>, hash: impl Into<String>) -> Self {
        RawCommit {
            message: message.into(),
            hash: Some(hash.into()),
        }
    }

    /// First line of the message
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }
}

/// Where a rendered change came from, used for link synthesis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<String>,
}

/// Aggregated result of classifying a batch of commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    /// Highest bump seen; `patch` when nothing matched
    pub bump: VersionBump,
    /// Section name -> change descriptions, in first-seen order
    pub changes: IndexMap<String, Vec<String>>,
    /// No visible entry, but at least one hidden change
    pub has_only_hidden_changes: bool,
    /// Rendered description -> originating commit.
    ///
    /// Keyed by the description text: when several commits share a
    /// description, every matching entry links to the latest of them.
    pub commit_meta: HashMap<String, CommitRef>,
}

impl Default for ChangeSet {
    fn default() -> Self {
        ChangeSet {
            bump: VersionBump::Patch,
            changes: IndexMap::new(),
            has_only_hidden_changes: false,
            commit_meta: HashMap::new(),
        }
    }
}

impl ChangeSet {
    /// Whether any section holds an entry
    pub fn has_visible_changes(&self) -> bool {
        self.changes.values().any(|items| !items.is_empty())
    }

    fn push(&mut self, section: &str, description: String, meta: Option<CommitRef>) {
        if let Some(meta) = meta {
            self.commit_meta.insert(description.clone(), meta);
        }
        self.changes
            .entry(section.to_string())
            .or_default()
            .push(description);
    }
}

/// Classifies commits (oldest first) into a [`ChangeSet`].
///
/// Release artifact commits and commits whose subject is not a conventional
/// commit are ignored. Unknown types only contribute when breaking.
#[instrument(skip_all, fields(commits = commits.len()))]
pub fn classify(commits: &[RawCommit], config: &CommitsConfig) -> ChangeSet {
    let mut change_set = ChangeSet::default();
    let mut bump: Option<VersionBump> = None;
    let mut saw_hidden = false;

    for raw in commits {
        if is_release_artifact(&raw.message) {
            trace!(subject = raw.subject(), "skipping release artifact");
            continue;
        }

        let commit = ParsedCommit::parse(
            &raw.message,
            raw.hash.as_deref(),
            &config.breaking_keywords,
        );
        if !commit.is_conventional() {
            trace!(subject = raw.subject(), "ignoring non-conventional commit");
            continue;
        }

        let description = commit.display_description();
        let meta = CommitRef {
            hash: commit.hash.clone(),
            pr_number: commit.pr_number.clone(),
        };

        if commit.is_breaking_change {
            bump = Some(VersionBump::Major);
            change_set.push(BREAKING_SECTION, description.clone(), Some(meta.clone()));
            if let Some(details) = commit.breaking_details(&config.breaking_keywords) {
                change_set.push(BREAKING_SECTION, format!("Details: {}", details), None);
            }
        }

        let Some(rule) = config.types.get(&commit.r#type) else {
            trace!(commit_type = %commit.r#type, "no rule for commit type");
            continue;
        };

        bump = Some(bump.map_or(rule.bump, |current| current.max(rule.bump)));

        let hidden = rule.hidden || config.is_hidden_scope(&commit.r#type, commit.scope.as_deref());
        if hidden {
            trace!(commit_type = %commit.r#type, scope = ?commit.scope, "hidden change");
            saw_hidden = true;
            continue;
        }

        if let Some(section) = &rule.section {
            change_set.push(section, description, Some(meta));
        }
    }

    change_set.bump = bump.unwrap_or(VersionBump::Patch);
    change_set.has_only_hidden_changes = !change_set.has_visible_changes() && saw_hidden;

    debug!(
        bump = %change_set.bump,
        sections = change_set.changes.len(),
        only_hidden = change_set.has_only_hidden_changes,
        "classified commits"
    );
    change_set
}
