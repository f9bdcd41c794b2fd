use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use crate::git::CommitInfo;
use git2::{Oid, Repository as Git2Repo, Signature};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("Bare repositories cannot be released"))
    }

    fn head_oid(&self) -> Result<Oid> {
        let head = self
            .repo
            .head()
            .map_err(|e| ReleaseError::branch(format!("Cannot resolve HEAD: {}", e)))?;
        head.target()
            .ok_or_else(|| ReleaseError::branch("HEAD has no target"))
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now("git-release", "git-release@localhost")?),
        }
    }

    fn tag_commit_oid(&self, tag_name: &str) -> Result<Oid> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag_name))
            .map_err(|e| ReleaseError::tag(format!("Cannot find tag '{}': {}", tag_name, e)))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|e| ReleaseError::tag(format!("Cannot peel tag '{}': {}", tag_name, e)))?;
        Ok(commit.id())
    }
}

/// Credentials: SSH keys from ~/.ssh, then the SSH agent, then the
/// credential helper chain.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(config) = git2::Config::open_default() {
                if let Ok(cred) = git2::Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => {
            warn!(refname, status, "remote rejected reference update");
            Err(git2::Error::from_str(&format!(
                "Push rejected for {}: {}",
                refname, status
            )))
        }
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn head_branch(&self) -> Result<Option<String>> {
        let head = self
            .repo
            .head()
            .map_err(|e| ReleaseError::branch(format!("Cannot resolve HEAD: {}", e)))?;

        if !head.is_branch() {
            return Ok(None);
        }

        head.shorthand()
            .map(|name| Some(name.to_string()))
            .ok_or_else(|| ReleaseError::branch("Branch name is not valid UTF-8"))
    }

    #[instrument(skip(self, pattern))]
    fn latest_tag(&self, pattern: &TagPattern) -> Result<Option<String>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(self.head_oid()?)?;
        let reachable: HashSet<Oid> = revwalk.collect::<std::result::Result<_, _>>()?;

        let names = self.repo.tag_names(None)?;
        let candidates: Vec<&str> = names
            .iter()
            .flatten()
            .filter(|name| pattern.matches(name))
            .filter(|name| {
                self.tag_commit_oid(name)
                    .map(|oid| reachable.contains(&oid))
                    .unwrap_or(false)
            })
            .collect();

        let latest = pattern.latest(candidates.iter().copied()).map(str::to_string);
        debug!(candidates = candidates.len(), ?latest, "latest tag");
        Ok(latest)
    }

    #[instrument(skip(self))]
    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;
        revwalk.push(self.head_oid()?)?;

        if let Some(tag) = tag {
            revwalk.hide(self.tag_commit_oid(tag)?)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;

            let message = commit.message().unwrap_or("(empty message)").to_string();
            let author = commit.author().name().unwrap_or("unknown").to_string();

            commits.push(CommitInfo {
                hash: commit.id().to_string(),
                message,
                author,
            });
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    fn head_hash(&self) -> Result<String> {
        Ok(self.head_oid()?.to_string())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, paths), fields(paths = paths.len()))]
    fn commit_paths(&self, paths: &[&Path], message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(path)?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.repo.find_commit(self.head_oid()?)?;
        let signature = self.signature()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        info!(commit = %oid, "created release commit");
        Ok(oid.to_string())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let target = self
            .repo
            .find_object(self.head_oid()?, None)
            .map_err(|e| ReleaseError::tag(format!("Cannot find object: {}", e)))?;
        let signature = self.signature()?;

        self.repo
            .tag(name, &target, &signature, message, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        info!(tag = name, "created tag");
        Ok(())
    }

    #[instrument(skip(self))]
    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()> {
        let mut remote_handle = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote '{}': {}", remote, e)))?;

        // HEAD may be detached in CI checkouts
        let refspecs = [
            format!("HEAD:refs/heads/{}", branch),
            format!("refs/tags/{0}:refs/tags/{0}", tag),
        ];

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        remote_handle
            .push(&refspecs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                }
                git2::ErrorClass::Reference => {
                    ReleaseError::remote(format!("Reference error during push: {}", e))
                }
                _ => ReleaseError::remote(format!("Failed to push to '{}': {}", remote, e)),
            })?;

        info!(remote, branch, tag, "pushed release");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (dir, Git2Repository::from_git2(repo))
    }

    fn commit_file(dir: &TempDir, repo: &Git2Repository, name: &str, message: &str) -> String {
        fs::write(dir.path().join(name), message).unwrap();

        let git = &repo.repo;
        let mut index = git.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = git.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = git.signature().unwrap();
        let parents: Vec<git2::Commit> = git
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| git.find_commit(oid).unwrap())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        git.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_commits_since_tag_oldest_first() {
        let (dir, repo) = init_repo();
        commit_file(&dir, &repo, "a.txt", "feat: first");
        repo.create_tag("v0.1.0", "Release 0.1.0").unwrap();
        commit_file(&dir, &repo, "b.txt", "fix: second");
        commit_file(&dir, &repo, "c.txt", "feat: third");

        let commits = repo.commits_since(Some("v0.1.0")).unwrap();
        let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["fix: second", "feat: third"]);

        let all = repo.commits_since(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "feat: first");
        assert_eq!(all[0].hash.len(), 40);
    }

    #[test]
    fn test_latest_tag_by_version() {
        let (dir, repo) = init_repo();
        commit_file(&dir, &repo, "a.txt", "feat: one");
        repo.create_tag("v0.9.0", "0.9.0").unwrap();
        commit_file(&dir, &repo, "b.txt", "feat: two");
        repo.create_tag("v0.10.0", "0.10.0").unwrap();
        repo.create_tag("not-a-release", "other").unwrap();

        let pattern = TagPattern::new("v{version}").unwrap();
        assert_eq!(repo.latest_tag(&pattern).unwrap().as_deref(), Some("v0.10.0"));
    }

    #[test]
    fn test_latest_tag_none() {
        let (dir, repo) = init_repo();
        commit_file(&dir, &repo, "a.txt", "feat: one");

        let pattern = TagPattern::new("v{version}").unwrap();
        assert_eq!(repo.latest_tag(&pattern).unwrap(), None);
    }

    #[test]
    fn test_commit_paths_and_head() {
        let (dir, repo) = init_repo();
        commit_file(&dir, &repo, "a.txt", "feat: one");

        fs::write(dir.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();
        let hash = repo
            .commit_paths(&[Path::new("CHANGELOG.md")], "chore(release): 0.1.0 [skip ci]")
            .unwrap();

        assert_eq!(repo.head_hash().unwrap(), hash);
        let commits = repo.commits_since(None).unwrap();
        assert_eq!(commits.last().unwrap().message, "chore(release): 0.1.0 [skip ci]");
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let (dir, repo) = init_repo();
        commit_file(&dir, &repo, "a.txt", "feat: one");
        repo.create_tag("v1.0.0", "1.0.0").unwrap();

        let result = repo.create_tag("v1.0.0", "1.0.0");
        assert!(matches!(result, Err(ReleaseError::Tag(_))));
    }

    #[test]
    fn test_remote_url() {
        let (_dir, repo) = init_repo();
        assert_eq!(repo.remote_url("origin").unwrap(), None);

        repo.repo
            .remote("origin", "git@github.com:acme/widgets.git")
            .unwrap();
        assert_eq!(
            repo.remote_url("origin").unwrap().as_deref(),
            Some("git@github.com:acme/widgets.git")
        );
    }

    #[test]
    fn test_head_branch_detached() {
        let (dir, repo) = init_repo();
        let oid = commit_file(&dir, &repo, "a.txt", "feat: one");
        assert!(repo.head_branch().unwrap().is_some());

        repo.repo
            .set_head_detached(Oid::from_str(&oid).unwrap())
            .unwrap();
        assert_eq!(repo.head_branch().unwrap(), None);
        assert!(matches!(repo.current_branch(), Err(ReleaseError::Branch(_))));
    }

    #[test]
    fn test_current_branch_unborn() {
        let (_dir, repo) = init_repo();
        assert!(matches!(repo.current_branch(), Err(ReleaseError::Branch(_))));
    }
}
