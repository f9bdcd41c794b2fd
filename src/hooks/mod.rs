//! Release hooks
//!
//! Shell commands configured under `[hooks]` run at fixed points of the
//! release workflow:
//! - pre_release: before any file or git change
//! - publish: after the tag is pushed
//! - create_release: after publishing, with the release notes at hand
//! - post_release: last; failures only produce warnings

pub mod executor;
pub mod lifecycle;

pub use executor::HookExecutor;
pub use lifecycle::{HookContext, HookType};
