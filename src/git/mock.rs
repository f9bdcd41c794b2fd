use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use crate::git::{CommitInfo, Repository};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A write performed against a [`MockRepository`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction {
    Commit {
        paths: Vec<PathBuf>,
        message: String,
    },
    Tag {
        name: String,
        message: String,
    },
    Push {
        remote: String,
        branch: String,
        tag: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    commits: Vec<CommitInfo>,
    /// Tag name and the number of commits it covers
    tags: Vec<(String, usize)>,
    actions: Vec<MockAction>,
}

/// Mock repository for testing without actual git operations.
///
/// History is linear; commits are kept oldest first.
pub struct MockRepository {
    branch: Option<String>,
    remote_url: Option<String>,
    fail_push: bool,
    state: Mutex<MockState>,
}

impl MockRepository {
    /// Create a new empty mock repository on `branch`
    pub fn new(branch: impl Into<String>) -> Self {
        MockRepository {
            branch: Some(branch.into()),
            remote_url: None,
            fail_push: false,
            state: Mutex::new(MockState::default()),
        }
    }

    /// A repository whose HEAD is detached
    pub fn detached() -> Self {
        MockRepository {
            branch: None,
            ..MockRepository::new("")
        }
    }

    /// Append a commit; its hash is derived from its position
    pub fn add_commit(&mut self, message: impl Into<String>) -> &mut Self {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        let hash = mock_hash(state.commits.len() + 1);
        state.commits.push(CommitInfo {
            hash,
            message: message.into(),
            author: "Test Author".to_string(),
        });
        self
    }

    /// Tag the current tip
    pub fn add_tag(&mut self, name: impl Into<String>) -> &mut Self {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        let covered = state.commits.len();
        state.tags.push((name.into(), covered));
        self
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Make every push fail with a remote error
    pub fn with_failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Writes performed so far, in order
    pub fn actions(&self) -> Vec<MockAction> {
        self.lock().actions.clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.lock().tags.iter().map(|(name, _)| name.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn mock_hash(n: usize) -> String {
    format!("{:040x}", n)
}

impl Repository for MockRepository {
    fn head_branch(&self) -> Result<Option<String>> {
        Ok(self.branch.clone())
    }

    fn latest_tag(&self, pattern: &TagPattern) -> Result<Option<String>> {
        let state = self.lock();
        let latest = pattern
            .latest(state.tags.iter().map(|(name, _)| name.as_str()))
            .map(str::to_string);
        Ok(latest)
    }

    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        let state = self.lock();
        let start = match tag {
            Some(tag) => state
                .tags
                .iter()
                .find(|(name, _)| name == tag)
                .map(|(_, covered)| *covered)
                .ok_or_else(|| ReleaseError::tag(format!("Cannot find tag '{}'", tag)))?,
            None => 0,
        };
        Ok(state.commits[start..].to_vec())
    }

    fn head_hash(&self) -> Result<String> {
        self.lock()
            .commits
            .last()
            .map(|c| c.hash.clone())
            .ok_or_else(|| ReleaseError::branch("HEAD has no target"))
    }

    fn remote_url(&self, _remote: &str) -> Result<Option<String>> {
        Ok(self.remote_url.clone())
    }

    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String> {
        let mut state = self.lock();
        let hash = mock_hash(state.commits.len() + 1);
        state.commits.push(CommitInfo {
            hash: hash.clone(),
            message: message.to_string(),
            author: "git-release".to_string(),
        });
        state.actions.push(MockAction::Commit {
            paths: paths.iter().map(|p| p.to_path_buf()).collect(),
            message: message.to_string(),
        });
        Ok(hash)
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.lock();
        if state.tags.iter().any(|(existing, _)| existing == name) {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        let covered = state.commits.len();
        state.tags.push((name.to_string(), covered));
        state.actions.push(MockAction::Tag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()> {
        if self.fail_push {
            return Err(ReleaseError::remote(format!(
                "Failed to push to '{}': connection refused",
                remote
            )));
        }
        self.lock().actions.push(MockAction::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }
}
