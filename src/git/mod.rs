//! Git operations abstraction layer
//!
//! The release workflow talks to version control only through the
//! [Repository] trait:
//!
//! - [repository::Git2Repository]: a real repository opened with `git2`
//! - [mock::MockRepository]: an in-memory repository that records writes
//!
//! ```rust
//! # use git_release::git::Repository;
//! # use git_release::domain::TagPattern;
//! # fn example<R: Repository>(repo: &R) -> git_release::Result<()> {
//! let pattern = TagPattern::new("v{version}")?;
//! let last = repo.latest_tag(&pattern)?;
//! let commits = repo.commits_since(last.as_deref())?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockAction, MockRepository};
pub use repository::Git2Repository;

use crate::analyzer::RawCommit;
use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use std::path::Path;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,
    /// The complete commit message
    pub message: String,
    /// The commit author
    pub author: String,
}

impl From<&CommitInfo> for RawCommit {
    fn from(commit: &CommitInfo) -> Self {
        RawCommit::with_hash(commit.message.clone(), commit.hash.clone())
    }
}

/// Version control operations needed by a release run.
///
/// Implementations map underlying failures to [crate::error::ReleaseError]
/// variants: `Branch` for HEAD problems, `Tag` for tag lookups and creation,
/// `Remote` for pushes.
pub trait Repository {
    /// Branch HEAD points at, `None` when HEAD is detached
    ///
    /// # Errors
    /// * `ReleaseError::Branch` - HEAD is unborn or cannot be resolved
    fn head_branch(&self) -> Result<Option<String>>;

    /// Name of the checked-out branch
    ///
    /// # Errors
    /// * `ReleaseError::Branch` - HEAD is detached or unborn
    fn current_branch(&self) -> Result<String> {
        self.head_branch()?.ok_or_else(|| {
            ReleaseError::branch("HEAD is detached; pass --branch to name the release branch")
        })
    }

    /// Highest-versioned tag matching `pattern` that is reachable from HEAD
    fn latest_tag(&self, pattern: &TagPattern) -> Result<Option<String>>;

    /// Commits reachable from HEAD but not from `tag`, oldest first.
    /// With no tag, the full history.
    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>>;

    /// Full hash of the HEAD commit
    fn head_hash(&self) -> Result<String>;

    /// Fetch URL of `remote`, `None` when the remote is not configured
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    /// Stage `paths` (relative to the working tree) and commit them on HEAD.
    /// Returns the new commit hash.
    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String>;

    /// Create an annotated tag at HEAD
    ///
    /// # Errors
    /// * `ReleaseError::Tag` - the tag already exists or cannot be written
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push HEAD to `branch` and push `tag` on `remote`
    ///
    /// # Errors
    /// * `ReleaseError::Remote` - remote missing, rejected update or network failure
    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()>;
}
