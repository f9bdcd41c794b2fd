//! Semantic-version releases from conventional commits.
//!
//! Commits since the last release tag are parsed and classified into a
//! [`analyzer::ChangeSet`]; the bump they imply gives the next version,
//! and [`render`] turns the change set into a changelog entry and release
//! notes. [`cli::orchestration`] runs the whole release against a
//! [`git::Repository`].

pub mod analyzer;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod hooks;
pub mod manifest;
pub mod render;
pub mod ui;

pub use error::{ReleaseError, Result};
