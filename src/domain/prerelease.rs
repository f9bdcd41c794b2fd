//! Prerelease suffix handling (`<channel>.<N>`)
//!
//! A channel is a non-empty run of ASCII alphanumerics and hyphens, as
//! allowed in semver prerelease identifiers (https://semver.org/#spec-item-9).
//! The counter always follows the last dot.

use crate::error::{ReleaseError, Result};
use std::fmt;

/// Prerelease suffix with its iteration counter
///
/// # Examples
/// - "beta.1" -> PreRelease { channel: "beta", iteration: 1 }
/// - "beta-feature-x.0" -> PreRelease { channel: "beta-feature-x", iteration: 0 }
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreRelease {
    pub channel: String,
    pub iteration: u64,
}

impl PreRelease {
    /// First prerelease of a channel (`<channel>.0`)
    pub fn start(channel: impl Into<String>) -> Self {
        PreRelease {
            channel: channel.into(),
            iteration: 0,
        }
    }

    /// Parse a `<channel>.<N>` suffix
    pub fn parse(s: &str) -> Result<Self> {
        let (channel, counter) = s.rsplit_once('.').ok_or_else(|| {
            ReleaseError::invalid_version(format!("prerelease '{}' has no counter", s))
        })?;

        Self::validate_channel(channel)?;

        if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReleaseError::invalid_version(format!(
                "Invalid prerelease counter: '{}'",
                counter
            )));
        }
        let iteration = counter.parse::<u64>().map_err(|_| {
            ReleaseError::invalid_version(format!("Prerelease counter out of range: '{}'", counter))
        })?;

        Ok(PreRelease {
            channel: channel.to_string(),
            iteration,
        })
    }

    /// Checks that a channel name is a valid prerelease identifier
    pub fn validate_channel(channel: &str) -> Result<()> {
        if channel.is_empty() {
            return Err(ReleaseError::invalid_version("Empty prerelease channel"));
        }
        if !channel
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ReleaseError::invalid_version(format!(
                "Invalid prerelease channel: '{}'",
                channel
            )));
        }
        Ok(())
    }

    /// Same channel, counter + 1
    pub fn next(&self) -> Result<Self> {
        let iteration = self.iteration.checked_add(1).ok_or_else(|| {
            ReleaseError::invalid_version(format!("Prerelease counter overflows after '{}'", self))
        })?;
        Ok(PreRelease {
            channel: self.channel.clone(),
            iteration,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.channel, self.iteration)
    }
}
