use crate::domain::{BranchPolicy, TagPattern, VersionBump};
use crate::error::{ReleaseError, Result};
use crate::hooks::HookType;
use crate::render::RenderTemplate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "gitrelease.toml";

/// Represents the complete configuration for git-release.
///
/// Every section is optional. A section given in the file replaces the
/// corresponding default as a whole (for example, a `[commits.types]` table
/// defines the complete rule set).
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub commits: CommitsConfig,

    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub release_notes: ReleaseNotesConfig,

    /// Display names for sections, e.g. `Features = "New Features"`
    #[serde(default)]
    pub section_names: IndexMap<String, String>,

    #[serde(default)]
    pub package: PackageConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

/// How one commit type affects the release
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CommitTypeRule {
    pub bump: VersionBump,

    /// Changelog section; commits of types without a section are never listed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Counts toward the bump but never appears in rendered documents
    #[serde(default)]
    pub hidden: bool,
}

impl CommitTypeRule {
    pub fn new(bump: VersionBump, section: &str) -> Self {
        CommitTypeRule {
            bump,
            section: Some(section.to_string()),
            hidden: false,
        }
    }

    pub fn hidden(bump: VersionBump) -> Self {
        CommitTypeRule {
            bump,
            section: None,
            hidden: true,
        }
    }
}

/// Configuration for conventional commit analysis.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitsConfig {
    /// Case-insensitive keywords that mark a breaking change in a commit body
    #[serde(default = "default_breaking_keywords")]
    pub breaking_keywords: Vec<String>,

    #[serde(default = "default_commit_types")]
    pub types: IndexMap<String, CommitTypeRule>,

    /// Scopes suppressed from rendered output, per commit type
    #[serde(default = "default_hidden_scopes")]
    pub hidden_scopes: IndexMap<String, Vec<String>>,
}

fn default_breaking_keywords() -> Vec<String> {
    vec!["BREAKING CHANGE".to_string(), "BREAKING-CHANGE".to_string()]
}

/// Returns the default commit type rules.
fn default_commit_types() -> IndexMap<String, CommitTypeRule> {
    use VersionBump::{Minor, Patch};

    let mut types = IndexMap::new();
    types.insert("feat".to_string(), CommitTypeRule::new(Minor, "Features"));
    types.insert("fix".to_string(), CommitTypeRule::new(Patch, "Bug Fixes"));
    types.insert(
        "perf".to_string(),
        CommitTypeRule::new(Patch, "Performance Improvements"),
    );
    types.insert("revert".to_string(), CommitTypeRule::new(Patch, "Reverts"));
    types.insert(
        "refactor".to_string(),
        CommitTypeRule::new(Patch, "Code Refactoring"),
    );
    types.insert("docs".to_string(), CommitTypeRule::new(Patch, "Documentation"));
    types.insert("chore".to_string(), CommitTypeRule::new(Patch, "Chores"));
    for hidden in ["style", "test", "build", "ci"] {
        types.insert(hidden.to_string(), CommitTypeRule::hidden(Patch));
    }
    types
}

fn default_hidden_scopes() -> IndexMap<String, Vec<String>> {
    let mut scopes = IndexMap::new();
    scopes.insert("chore".to_string(), vec!["deps".to_string()]);
    scopes
}

impl Default for CommitsConfig {
    fn default() -> Self {
        CommitsConfig {
            breaking_keywords: default_breaking_keywords(),
            types: default_commit_types(),
            hidden_scopes: default_hidden_scopes(),
        }
    }
}

impl CommitsConfig {
    /// Whether `scope` is suppressed for `commit_type`
    pub fn is_hidden_scope(&self, commit_type: &str, scope: Option<&str>) -> bool {
        match (scope, self.hidden_scopes.get(commit_type)) {
            (Some(scope), Some(scopes)) => scopes.iter().any(|s| s == scope),
            _ => false,
        }
    }
}

/// Which branches may release, and how prerelease channels are named
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_main_branch")]
    pub main: String,

    /// Regex selecting prerelease branches; none means only `main` releases
    #[serde(default = "default_prerelease_pattern")]
    pub prerelease_pattern: Option<String>,

    #[serde(default = "default_prerelease_prefix")]
    pub prerelease_prefix: String,
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_prerelease_pattern() -> Option<String> {
    Some("^(beta|next|feature/.+)$".to_string())
}

fn default_prerelease_prefix() -> String {
    "beta".to_string()
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            main: default_main_branch(),
            prerelease_pattern: default_prerelease_pattern(),
            prerelease_prefix: default_prerelease_prefix(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagsConfig {
    #[serde(default = "default_tag_format")]
    pub format: String,
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

impl Default for TagsConfig {
    fn default() -> Self {
        TagsConfig {
            format: default_tag_format(),
        }
    }
}

/// Changelog file location and entry templates
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_changelog_path")]
    pub path: String,

    #[serde(default = "default_changelog_header")]
    pub header: String,

    #[serde(default = "default_section_template")]
    pub section: String,

    #[serde(default = "default_item_template")]
    pub item: String,
}

fn default_changelog_path() -> String {
    "CHANGELOG.md".to_string()
}

fn default_changelog_header() -> String {
    "## [{version}] - {date}\n\n".to_string()
}

fn default_section_template() -> String {
    "### {section}\n\n".to_string()
}

fn default_item_template() -> String {
    "- {item}\n".to_string()
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            path: default_changelog_path(),
            header: default_changelog_header(),
            section: default_section_template(),
            item: default_item_template(),
        }
    }
}

impl ChangelogConfig {
    pub fn template(&self) -> RenderTemplate {
        RenderTemplate {
            header: self.header.clone(),
            section: self.section.clone(),
            item: self.item.clone(),
        }
    }
}

/// Release notes templates; no header (and so no date) by default
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseNotesConfig {
    #[serde(default)]
    pub header: String,

    #[serde(default = "default_section_template")]
    pub section: String,

    #[serde(default = "default_item_template")]
    pub item: String,
}

impl Default for ReleaseNotesConfig {
    fn default() -> Self {
        ReleaseNotesConfig {
            header: String::new(),
            section: default_section_template(),
            item: default_item_template(),
        }
    }
}

impl ReleaseNotesConfig {
    pub fn template(&self) -> RenderTemplate {
        RenderTemplate {
            header: self.header.clone(),
            section: self.section.clone(),
            item: self.item.clone(),
        }
    }
}

/// Package manifest holding the version; auto-detected when unset
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PackageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Release commit subject; `{version}` is substituted
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    "chore(release): {version} [skip ci]".to_string()
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            commit_message: default_commit_message(),
        }
    }
}

/// Shell commands run at points of the release workflow
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_release: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_release: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_release: Option<String>,
}

impl HooksConfig {
    /// Command configured for a hook point
    pub fn command(&self, hook: HookType) -> Option<&str> {
        let command = match hook {
            HookType::PreRelease => &self.pre_release,
            HookType::Publish => &self.publish,
            HookType::CreateRelease => &self.create_release,
            HookType::PostRelease => &self.post_release,
        };
        command.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl Config {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ReleaseError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parts that serde cannot: patterns and tag formats
    pub fn validate(&self) -> Result<()> {
        BranchPolicy::from_config(&self.branches)?;
        TagPattern::new(&self.tags.format)
            .map_err(|e| ReleaseError::config(format!("[tags] format: {}", e)))?;
        if self.commits.breaking_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ReleaseError::config(
                "[commits] breaking_keywords must not contain empty strings",
            ));
        }
        Ok(())
    }

    /// Effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ReleaseError::config(format!("Cannot serialize configuration: {}", e)))
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitrelease.toml` in current directory
/// 3. `<config dir>/.gitrelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        Some(Path::new(path).to_path_buf())
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        Some(Path::new(CONFIG_FILE_NAME).to_path_buf())
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
            .filter(|path| path.exists())
    };

    let Some(path) = path else {
        debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    debug!(path = %path.display(), "loading configuration");
    let content = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;
    Config::from_toml_str(&content)
}
