use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    prefix: String,
    suffix: String,
    stable_only: bool,
}

impl TagPattern {
    /// Create a tag pattern; it must hold exactly one `{version}` placeholder
    pub fn new(pattern: &str) -> Result<Self> {
        let parts: Vec<&str> = pattern.split("{version}").collect();
        if parts.len() != 2 {
            return Err(ReleaseError::tag(format!(
                "Invalid pattern '{}': should have exactly one {{version}} placeholder",
                pattern
            )));
        }

        Ok(TagPattern {
            prefix: parts[0].to_string(),
            suffix: parts[1].to_string(),
            stable_only: false,
        })
    }

    /// Same pattern, but [`TagPattern::latest`] skips prerelease versions
    pub fn stable_only(mut self) -> Self {
        self.stable_only = true;
        self
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &str) -> String {
        format!("{}{}{}", self.prefix, version, self.suffix)
    }

    /// Version part of a tag if the tag follows this pattern and holds a
    /// semantic version ("v1.2.3-beta.0" -> "1.2.3-beta.0")
    pub fn extract_version<'t>(&self, tag: &'t str) -> Option<&'t str> {
        let version = tag
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        semver::Version::parse(version).ok()?;
        Some(version)
    }

    /// Whether a tag follows this pattern
    pub fn matches(&self, tag: &str) -> bool {
        self.extract_version(tag).is_some()
    }

    /// The highest-versioned tag among `tags` that follows this pattern
    pub fn latest<'t, I>(&self, tags: I) -> Option<&'t str>
    where
        I: IntoIterator<Item = &'t str>,
    {
        tags.into_iter()
            .filter_map(|tag| {
                let version = semver::Version::parse(self.extract_version(tag)?).ok()?;
                if self.stable_only && !version.pre.is_empty() {
                    return None;
                }
                Some((version, tag))
            })
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, tag)| tag)
    }
}
