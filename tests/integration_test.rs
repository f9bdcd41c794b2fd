use chrono::NaiveDate;
use git2::{Repository as Git2Repo, RepositoryInitOptions};
use git_release::cli::orchestration::{run_release, ReleaseRun, ReleaseWorkflowArgs};
use git_release::config::Config;
use git_release::git::{Git2Repository, Repository};
use git_release::render::RepoInfo;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const REPOSITORY_VARS: [&str; 2] = ["GIT_RELEASE_REPOSITORY", "GITHUB_REPOSITORY"];

/// Restores the repository identity variables when dropped
struct EnvGuard(Vec<(&'static str, Option<String>)>);

impl EnvGuard {
    fn clear() -> Self {
        let saved = REPOSITORY_VARS
            .iter()
            .map(|var| (*var, env::var(var).ok()))
            .collect();
        for var in REPOSITORY_VARS {
            env::remove_var(var);
        }
        EnvGuard(saved)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (var, value) in &self.0 {
            match value {
                Some(value) => env::set_var(var, value),
                None => env::remove_var(var),
            }
        }
    }
}

fn init_repo(path: &Path) -> Git2Repo {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    let repo = Git2Repo::init_opts(path, &options).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

fn commit_all(repo: &Git2Repo, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = repo.signature().unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap();
}

/// A crate at 0.1.0 with one fix committed after the release tag
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());

    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    commit_all(&repo, "feat: initial import");
    Git2Repository::from_git2(repo)
        .create_tag("v0.1.0", "Release 0.1.0")
        .unwrap();

    let repo = Git2Repo::open(dir.path()).unwrap();
    fs::write(dir.path().join("lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();
    commit_all(&repo, "fix: return the right answer (#12)");
    dir
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn test_git_release_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_git-release"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("git-release"));
    for command in ["analyze", "changelog", "notes", "release", "config"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_git_release_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_git-release"))
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
#[serial]
fn test_local_release_end_to_end() {
    let _env = EnvGuard::clear();
    let dir = project();
    let repo = Git2Repository::open(dir.path()).unwrap();

    let args = ReleaseWorkflowArgs {
        force: true,
        no_push: true,
        ..Default::default()
    };
    let run = run_release(&repo, &Config::default(), dir.path(), &args, date(), |plan, _| {
        assert_eq!(plan.previous_tag.as_deref(), Some("v0.1.0"));
        Ok(true)
    })
    .unwrap();
    let ReleaseRun::Completed(result) = run else {
        panic!("expected a completed release");
    };
    assert_eq!(result.tag, "v0.1.1");
    assert!(!result.pushed);

    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert_eq!(
        changelog,
        "# Changelog\n\n## [0.1.1] - 2024-06-01\n\n### Bug Fixes\n\n- return the right answer\n"
    );

    let git = Git2Repo::open(dir.path()).unwrap();
    let head = git.head().unwrap().peel_to_commit().unwrap();
    assert_eq!(head.summary(), Some("chore(release): 0.1.1 [skip ci]"));
    assert!(git.statuses(None).unwrap().is_empty());

    let tag = git
        .revparse_single("refs/tags/v0.1.1")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    assert_eq!(tag.target_id(), head.id());
    assert!(tag.message().unwrap().starts_with("Release 0.1.1"));

    // the release commit is not analyzed again
    assert!(repo.commits_since(Some("v0.1.1")).unwrap().is_empty());
}

#[test]
#[serial]
fn test_release_pushes_to_remote() {
    let _env = EnvGuard::clear();
    let dir = project();
    let remote_dir = TempDir::new().unwrap();
    Git2Repo::init_bare(remote_dir.path()).unwrap();
    Git2Repo::open(dir.path())
        .unwrap()
        .remote("origin", remote_dir.path().to_str().unwrap())
        .unwrap();

    let repo = Git2Repository::open(dir.path()).unwrap();
    let args = ReleaseWorkflowArgs {
        force: true,
        ..Default::default()
    };
    let run = run_release(&repo, &Config::default(), dir.path(), &args, date(), |_, _| Ok(true))
        .unwrap();
    let ReleaseRun::Completed(result) = run else {
        panic!("expected a completed release");
    };
    assert!(result.pushed);

    let remote = Git2Repo::open_bare(remote_dir.path()).unwrap();
    assert!(remote.find_reference("refs/tags/v0.1.1").is_ok());
    assert!(remote.find_reference("refs/heads/main").is_ok());
}

#[test]
#[serial]
fn test_detached_release_lands_on_named_branch() {
    let _env = EnvGuard::clear();
    let dir = project();
    let remote_dir = TempDir::new().unwrap();
    Git2Repo::init_bare(remote_dir.path()).unwrap();

    let git = Git2Repo::open(dir.path()).unwrap();
    let mut origin = git.remote("origin", remote_dir.path().to_str().unwrap()).unwrap();
    origin
        .push(&["refs/heads/main:refs/heads/main"], None)
        .unwrap();
    let tip = git.head().unwrap().target().unwrap();
    git.set_head_detached(tip).unwrap();

    let repo = Git2Repository::open(dir.path()).unwrap();
    assert_eq!(repo.head_branch().unwrap(), None);
    let args = ReleaseWorkflowArgs {
        branch: Some("main".to_string()),
        force: true,
        ..Default::default()
    };
    let run = run_release(&repo, &Config::default(), dir.path(), &args, date(), |_, _| Ok(true))
        .unwrap();
    let ReleaseRun::Completed(result) = run else {
        panic!("expected a completed release");
    };
    assert!(result.pushed);

    let remote = Git2Repo::open_bare(remote_dir.path()).unwrap();
    let remote_main = remote
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(remote_main.summary(), Some("chore(release): 0.1.1 [skip ci]"));
    assert_eq!(remote_main.parent_id(0).unwrap(), tip);

    let tag = remote
        .find_reference("refs/tags/v0.1.1")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    assert_eq!(tag.target_id(), remote_main.id());
}

#[test]
#[serial]
fn test_release_refused_when_other_branch_checked_out() {
    let _env = EnvGuard::clear();
    let dir = project();
    let repo = Git2Repository::open(dir.path()).unwrap();
    let head = repo.head_hash().unwrap();

    let args = ReleaseWorkflowArgs {
        branch: Some("beta".to_string()),
        force: true,
        no_push: true,
        ..Default::default()
    };
    let error = run_release(&repo, &Config::default(), dir.path(), &args, date(), |_, _| Ok(true))
        .unwrap_err();

    assert!(format!("{:#}", error).contains("while 'main' is checked out"));
    assert_eq!(repo.head_hash().unwrap(), head);
    assert!(!dir.path().join("CHANGELOG.md").exists());
}

#[test]
#[serial]
fn test_repository_from_env() {
    let _env = EnvGuard::clear();

    env::set_var("GITHUB_REPOSITORY", "acme/from-actions");
    let info = RepoInfo::resolve(Some("https://gitlab.com/other/project.git")).unwrap();
    assert_eq!(info.base_url(), "https://github.com/acme/from-actions");

    env::set_var("GIT_RELEASE_REPOSITORY", "acme/explicit");
    let info = RepoInfo::resolve(None).unwrap();
    assert_eq!(info.base_url(), "https://github.com/acme/explicit");
}

#[test]
#[serial]
fn test_repository_from_remote_url() {
    let _env = EnvGuard::clear();

    let info = RepoInfo::resolve(Some("git@gitlab.com:group/sub/project.git")).unwrap();
    assert_eq!(info.host, "gitlab.com");
    assert_eq!(info.commit_url("abc"), "https://gitlab.com/group/sub/project/commit/abc");

    env::set_var("GIT_RELEASE_REPOSITORY", "not a slug");
    assert!(RepoInfo::resolve(Some("/srv/git/project.git")).is_none());
}
