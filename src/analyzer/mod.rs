//! Analysis engine: commits in, release decision out

pub mod classifier;
pub mod decision;
pub mod release_filter;

pub use classifier::{classify, ChangeSet, CommitRef, RawCommit, BREAKING_SECTION};
pub use decision::{ReleaseAnalyzer, ReleaseDecision, ReleaseOutcome};
pub use release_filter::is_release_artifact;
