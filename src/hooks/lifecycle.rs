use crate::analyzer::ReleaseDecision;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Points of the release workflow where a configured command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookType {
    PreRelease,
    Publish,
    CreateRelease,
    PostRelease,
}

impl HookType {
    /// Get the hook name as a string
    pub fn name(&self) -> &'static str {
        match self {
            HookType::PreRelease => "pre_release",
            HookType::Publish => "publish",
            HookType::CreateRelease => "create_release",
            HookType::PostRelease => "post_release",
        }
    }

    /// Whether a failure of this hook stops the release
    pub fn is_fatal(&self) -> bool {
        !matches!(self, HookType::PostRelease)
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Type of hook being executed
    pub hook_type: HookType,
    /// Version being released
    pub version: String,
    pub previous_version: String,
    /// Tag name being created or pushed
    pub tag: String,
    /// Branch the release is cut from
    pub branch: String,
    /// Remote repository name
    pub remote: String,
    pub bump: String,
    /// Prerelease channel, if any
    pub prerelease: Option<String>,
    pub commit_count: usize,
    /// Rendered release notes
    pub notes: String,
    /// File holding the release notes, once written
    pub notes_file: Option<PathBuf>,
}

impl HookContext {
    pub fn from_decision(
        hook_type: HookType,
        decision: &ReleaseDecision,
        tag: &str,
        remote: &str,
        notes: &str,
    ) -> Self {
        HookContext {
            hook_type,
            version: decision.next_version.clone(),
            previous_version: decision.current_version.clone(),
            tag: tag.to_string(),
            branch: decision.branch.clone(),
            remote: remote.to_string(),
            bump: decision.bump.to_string(),
            prerelease: decision.prerelease.clone(),
            commit_count: decision.commit_count,
            notes: notes.to_string(),
            notes_file: None,
        }
    }

    pub fn with_notes_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.notes_file = Some(path.into());
        self
    }

    /// Convert context to environment variables for the hook command
    ///
    /// Maps context fields to GIT_RELEASE_* environment variables. Optional
    /// fields are omitted when unset.
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("GIT_RELEASE_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert("GIT_RELEASE_VERSION".to_string(), self.version.clone());
        env.insert(
            "GIT_RELEASE_PREVIOUS_VERSION".to_string(),
            self.previous_version.clone(),
        );
        env.insert("GIT_RELEASE_TAG".to_string(), self.tag.clone());
        env.insert("GIT_RELEASE_BRANCH".to_string(), self.branch.clone());
        env.insert("GIT_RELEASE_REMOTE".to_string(), self.remote.clone());
        env.insert("GIT_RELEASE_BUMP".to_string(), self.bump.clone());
        env.insert(
            "GIT_RELEASE_COMMIT_COUNT".to_string(),
            self.commit_count.to_string(),
        );
        env.insert("GIT_RELEASE_NOTES".to_string(), self.notes.clone());

        if let Some(ref prerelease) = self.prerelease {
            env.insert("GIT_RELEASE_PRERELEASE".to_string(), prerelease.clone());
        }

        if let Some(ref path) = self.notes_file {
            env.insert(
                "GIT_RELEASE_NOTES_FILE".to_string(),
                path.display().to_string(),
            );
        }

        env
    }
}
