//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::BranchPolicy;
pub use commit::{ParsedCommit, UNKNOWN_TYPE};
pub use prerelease::PreRelease;
pub use tag::TagPattern;
pub use version::{bump_version, Version, VersionBump};
