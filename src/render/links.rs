//! Repository identity and link synthesis for rendered items

use crate::analyzer::CommitRef;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Environment variable overriding the repository identity (`owner/repo`)
pub const REPOSITORY_ENV: &str = "GIT_RELEASE_REPOSITORY";

/// Identity set by GitHub Actions runners
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";

const DEFAULT_HOST: &str = "github.com";

/// Remote URL shapes:
/// - `https://host/owner/repo(.git)`
/// - `git@host:owner/repo(.git)`
/// - `ssh://git@host[:port]/owner/repo(.git)`
static REMOTE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:https?|ssh|git)://(?:[^@/]+@)?(?P<host>[^/:]+)(?::\d+)?/|[^@/]+@(?P<scp_host>[^:/]+):)(?P<owner>[^/]+(?:/[^/]+)*)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    )
    .expect("Invalid regex")
});

/// Hosting location of the repository, used to build links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RepoInfo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoInfo {
            host: DEFAULT_HOST.to_string(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse an `owner/repo` slug
    pub fn from_slug(slug: &str) -> Option<Self> {
        let (owner, repo) = slug.trim().split_once('/')?;
        let repo = repo.trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(RepoInfo::new(owner, repo))
    }

    /// Parse a git remote URL
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let captures = REMOTE_URL_REGEX.captures(url.trim())?;
        let host = captures
            .name("host")
            .or_else(|| captures.name("scp_host"))?
            .as_str();
        Some(RepoInfo {
            host: host.to_string(),
            owner: captures["owner"].to_string(),
            repo: captures["repo"].to_string(),
        })
    }

    /// Resolve identity: `GIT_RELEASE_REPOSITORY`, then `GITHUB_REPOSITORY`,
    /// then the given remote URL.
    pub fn resolve(remote_url: Option<&str>) -> Option<Self> {
        for var in [REPOSITORY_ENV, GITHUB_REPOSITORY_ENV] {
            if let Ok(value) = std::env::var(var) {
                if let Some(info) = RepoInfo::from_slug(&value) {
                    debug!(source = var, owner = %info.owner, repo = %info.repo, "repository identity");
                    return Some(info);
                }
            }
        }

        let info = remote_url.and_then(RepoInfo::from_remote_url);
        if info.is_none() {
            debug!(?remote_url, "repository identity unavailable, links disabled");
        }
        info
    }

    pub fn base_url(&self) -> String {
        format!("https://{}/{}/{}", self.host, self.owner, self.repo)
    }

    pub fn pull_request_url(&self, number: &str) -> String {
        format!("{}/pull/{}", self.base_url(), number)
    }

    pub fn commit_url(&self, hash: &str) -> String {
        format!("{}/commit/{}", self.base_url(), hash)
    }
}

/// Inline link appended to an item (leading space included), or empty
pub fn item_link(meta: Option<&CommitRef>, repo: Option<&RepoInfo>) -> String {
    let (Some(meta), Some(repo)) = (meta, repo) else {
        return String::new();
    };

    if let Some(number) = &meta.pr_number {
        return format!(" ([#{}]({}))", number, repo.pull_request_url(number));
    }
    if let Some(hash) = &meta.hash {
        let short: String = hash.chars().take(7).collect();
        return format!(" ([{}]({}))", short, repo.commit_url(hash));
    }
    String::new()
}
