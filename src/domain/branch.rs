use crate::config::BranchesConfig;
use crate::domain::prerelease::PreRelease;
use crate::error::{ReleaseError, Result};
use regex::Regex;

/// Release policy for branches: one stable branch plus prerelease branches
/// selected by pattern.
#[derive(Debug, Clone)]
pub struct BranchPolicy {
    main: String,
    prerelease_pattern: Option<Regex>,
    prerelease_prefix: String,
}

impl BranchPolicy {
    /// Build a policy from configuration, compiling the prerelease pattern
    pub fn from_config(config: &BranchesConfig) -> Result<Self> {
        let prerelease_pattern = match config.prerelease_pattern.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(Regex::new(pattern).map_err(|e| {
                ReleaseError::config(format!(
                    "Invalid prerelease branch pattern '{}': {}",
                    pattern, e
                ))
            })?),
            _ => None,
        };

        if !config.prerelease_prefix.is_empty() {
            PreRelease::validate_channel(&config.prerelease_prefix).map_err(|_| {
                ReleaseError::config(format!(
                    "Invalid prerelease prefix '{}': use ASCII letters, digits and '-'",
                    config.prerelease_prefix
                ))
            })?;
        }

        Ok(BranchPolicy {
            main: config.main.clone(),
            prerelease_pattern,
            prerelease_prefix: config.prerelease_prefix.clone(),
        })
    }

    /// Check if this is the stable release branch
    pub fn is_main(&self, branch: &str) -> bool {
        branch == self.main
    }

    /// Prerelease tag for a branch.
    ///
    /// - main branch: `Ok(None)`
    /// - prerelease branch: `Ok(Some("<prefix>-<branch>"))` with path
    ///   separators (and any other character not allowed in a prerelease
    ///   identifier) replaced by `-`; just `<prefix>` when the branch is named
    ///   after the prefix
    /// - any other branch: `Err(ReleaseError::Branch)`
    pub fn prerelease_tag(&self, branch: &str) -> Result<Option<String>> {
        if self.is_main(branch) {
            return Ok(None);
        }

        let matches = self
            .prerelease_pattern
            .as_ref()
            .is_some_and(|re| re.is_match(branch));
        if !matches {
            return Err(ReleaseError::branch(format!(
                "Branch '{}' is not configured for releases (main branch is '{}')",
                branch, self.main
            )));
        }

        let sanitized = sanitize_branch(branch);
        if sanitized == self.prerelease_prefix || self.prerelease_prefix.is_empty() {
            return Ok(Some(sanitized));
        }
        Ok(Some(format!("{}-{}", self.prerelease_prefix, sanitized)))
    }
}

fn sanitize_branch(branch: &str) -> String {
    let replaced: String = branch
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();
    replaced.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BranchPolicy {
        BranchPolicy::from_config(&BranchesConfig {
            main: "main".to_string(),
            prerelease_pattern: Some("^(beta|next|feature/.+)$".to_string()),
            prerelease_prefix: "beta".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_main_branch_has_no_prerelease() {
        assert!(policy().is_main("main"));
        assert_eq!(policy().prerelease_tag("main").unwrap(), None);
    }

    #[test]
    fn test_feature_branch_tag() {
        assert_eq!(
            policy().prerelease_tag("feature/login").unwrap(),
            Some("beta-feature-login".to_string())
        );
    }

    #[test]
    fn test_branch_named_like_prefix() {
        assert_eq!(
            policy().prerelease_tag("beta").unwrap(),
            Some("beta".to_string())
        );
        assert_eq!(
            policy().prerelease_tag("next").unwrap(),
            Some("beta-next".to_string())
        );
    }

    #[test]
    fn test_nested_and_odd_characters() {
        assert_eq!(
            policy().prerelease_tag("feature/team\\v1.2_x").unwrap(),
            Some("beta-feature-team-v1-2-x".to_string())
        );
    }

    #[test]
    fn test_unlisted_branch_rejected() {
        let err = policy().prerelease_tag("hotfix/urgent").unwrap_err();
        assert!(matches!(err, ReleaseError::Branch(_)));
        assert!(err.to_string().contains("hotfix/urgent"));
    }

    #[test]
    fn test_no_pattern_only_main_allowed() {
        let policy = BranchPolicy::from_config(&BranchesConfig {
            main: "master".to_string(),
            prerelease_pattern: None,
            prerelease_prefix: "beta".to_string(),
        })
        .unwrap();
        assert_eq!(policy.prerelease_tag("master").unwrap(), None);
        assert!(policy.prerelease_tag("beta").is_err());
    }

    #[test]
    fn test_invalid_pattern() {
        let result = BranchPolicy::from_config(&BranchesConfig {
            main: "main".to_string(),
            prerelease_pattern: Some("(unclosed".to_string()),
            prerelease_prefix: "beta".to_string(),
        });
        assert!(matches!(result, Err(ReleaseError::Config(_))));
    }
}
