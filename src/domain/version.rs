use crate::domain::prerelease::PreRelease;
use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic version core (`X.Y.Z`) without prerelease suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `X.Y.Z` string.
    ///
    /// Each component must be a non-empty run of ASCII digits. Prefixes such
    /// as `v` are not stripped here; tags go through [`crate::domain::TagPattern`].
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::invalid_version(format!(
                "'{}' - expected X.Y.Z",
                input
            )));
        }

        let component = |part: &str, name: &str| -> Result<u64> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ReleaseError::invalid_version(format!(
                    "'{}' - {} component '{}' is not a non-negative integer",
                    input, name, part
                )));
            }
            part.parse::<u64>().map_err(|_| {
                ReleaseError::invalid_version(format!(
                    "'{}' - {} component '{}' is out of range",
                    input, name, part
                ))
            })
        };

        Ok(Version {
            major: component(parts[0], "major")?,
            minor: component(parts[1], "minor")?,
            patch: component(parts[2], "patch")?,
        })
    }

    /// Bump version according to bump type
    ///
    /// # Errors
    /// * `ReleaseError::InvalidVersionFormat` - the bumped component overflows
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let increment = |value: u64| {
            value.checked_add(1).ok_or_else(|| {
                ReleaseError::invalid_version(format!(
                    "'{}' - cannot apply a {} bump",
                    self, bump_type
                ))
            })
        };

        Ok(match bump_type {
            VersionBump::Major => Version::new(increment(self.major)?, 0, 0),
            VersionBump::Minor => Version::new(self.major, increment(self.minor)?, 0),
            VersionBump::Patch => Version::new(self.major, self.minor, increment(self.patch)?),
        })
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Version bump level.
///
/// Variants are declared in ascending severity so the derived `Ord` gives
/// `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    Patch,
    Minor,
    Major,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(ReleaseError::config(format!(
                "Unknown bump level '{}' (expected major, minor or patch)",
                other
            ))),
        }
    }
}

/// Computes the next version string.
///
/// `current` is `X.Y.Z` with an optional `-<prerelease>` suffix.
///
/// - Without `prerelease_tag` the bump applies to the numeric core and any
///   existing prerelease suffix is dropped.
/// - With a tag, a current suffix of exactly `<tag>.<N>` advances to
///   `<tag>.<N+1>` on the same core. Anything else starts a fresh
///   `<bumped core>-<tag>.0`.
///
/// # Example
/// ```
/// use git_release::domain::{bump_version, VersionBump};
///
/// assert_eq!(bump_version("1.4.9", VersionBump::Minor, None).unwrap(), "1.5.0");
/// assert_eq!(
///     bump_version("1.2.3-beta.0", VersionBump::Minor, Some("beta")).unwrap(),
///     "1.2.3-beta.1"
/// );
/// ```
pub fn bump_version(
    current: &str,
    bump: VersionBump,
    prerelease_tag: Option<&str>,
) -> Result<String> {
    let (core, suffix) = match current.split_once('-') {
        Some((core, suffix)) => (core, Some(suffix)),
        None => (current, None),
    };

    let version = Version::parse(core).map_err(|_| {
        ReleaseError::invalid_version(format!("'{}' - expected X.Y.Z[-prerelease]", current))
    })?;

    if suffix == Some("") {
        return Err(ReleaseError::invalid_version(format!(
            "'{}' - empty prerelease suffix",
            current
        )));
    }

    let Some(tag) = prerelease_tag else {
        return Ok(version.bump(bump)?.to_string());
    };

    PreRelease::validate_channel(tag)?;

    if let Some(existing) = suffix.and_then(|s| PreRelease::parse(s).ok()) {
        if existing.channel == tag {
            return Ok(format!("{}-{}", version, existing.next()?));
        }
    }

    Ok(format!("{}-{}", version.bump(bump)?, PreRelease::start(tag)))
}
