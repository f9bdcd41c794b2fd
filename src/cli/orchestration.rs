//! Release workflow orchestration
//!
//! Planning reads git state and the manifest and produces a [`ReleasePlan`]
//! without touching anything. Execution then performs the side effects one
//! after another; a failure reports the steps that already completed.
//! Argument parsing stays in main.rs.

use crate::analyzer::{RawCommit, ReleaseAnalyzer, ReleaseDecision, ReleaseOutcome};
use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{BranchPolicy, TagPattern};
use crate::git::Repository;
use crate::hooks::{HookContext, HookExecutor, HookType};
use crate::manifest::Manifest;
use crate::render::{self, prepend_to_changelog, substitute, RepoInfo};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Version assumed when there is neither a release tag nor a manifest
pub const INITIAL_VERSION: &str = "0.0.0";

/// Arguments for the release workflow
///
/// Mirrors the CLI flags so the workflow can run without clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseWorkflowArgs {
    /// Branch to release instead of the checked-out one
    pub branch: Option<String>,

    /// Skip confirmation prompts
    pub force: bool,

    /// Report the steps without performing them
    pub dry_run: bool,

    /// Leave the release commit and tag local
    pub no_push: bool,
}

/// Result of a release run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub tag: String,
    pub version: String,
    pub branch: String,

    /// Whether the branch and tag were pushed to the remote
    pub pushed: bool,

    pub dry_run: bool,

    /// Steps performed, or planned for a dry run
    pub steps: Vec<String>,

    /// Non-fatal failures (post_release hook)
    pub warnings: Vec<String>,
}

/// Everything decided before any side effect
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub branch: String,
    pub previous_tag: Option<String>,
    /// Tag for the next version; `None` when nothing is released
    pub tag: Option<String>,
    pub outcome: ReleaseOutcome,
    pub warnings: Vec<BoundaryWarning>,
    pub repo_info: Option<RepoInfo>,
    pub manifest_path: Option<PathBuf>,
}

impl ReleasePlan {
    pub fn decision(&self) -> Option<&ReleaseDecision> {
        match &self.outcome {
            ReleaseOutcome::Release(decision) => Some(decision),
            ReleaseOutcome::NoReleasableChanges { .. } => None,
        }
    }

    /// Whether there is nothing to release
    pub fn is_blocked(&self) -> bool {
        self.decision().is_none() || self.warnings.iter().any(BoundaryWarning::blocks_release)
    }
}

/// Rendered changelog entry and release notes for one decision
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDocuments {
    pub changelog_entry: String,
    pub notes: String,
}

/// How a [`run_release`] call ended
#[derive(Debug)]
pub enum ReleaseRun {
    /// Nothing to release; the plan carries the warnings
    Blocked(ReleasePlan),
    /// The confirmation callback declined
    Cancelled,
    Completed(WorkflowResult),
}

/// Inspect the repository and decide the next release.
///
/// The current version is the latest release tag's version, else the
/// manifest's version, else [`INITIAL_VERSION`]. On a branch without a
/// prerelease channel, prerelease tags are not considered.
#[instrument(skip(repo, config, workdir))]
pub fn plan_release<R: Repository>(
    repo: &R,
    config: &Config,
    workdir: &Path,
    branch: Option<&str>,
) -> Result<ReleasePlan> {
    let branch = match branch {
        Some(branch) => branch.to_string(),
        None => repo
            .current_branch()
            .context("Cannot determine the branch to release")?,
    };

    let channel = BranchPolicy::from_config(&config.branches)?.prerelease_tag(&branch)?;
    let mut pattern = TagPattern::new(&config.tags.format)?;
    if channel.is_none() {
        pattern = pattern.stable_only();
    }

    let previous_tag = repo.latest_tag(&pattern)?;
    let commits = repo
        .commits_since(previous_tag.as_deref())
        .context("Cannot read commit history")?;
    let mut warnings = Vec::new();

    let manifest = Manifest::detect(workdir, config.package.manifest.as_deref())?;
    if manifest.is_none() {
        warnings.push(BoundaryWarning::ManifestNotFound {
            dir: workdir.display().to_string(),
        });
    }

    let tag_version = previous_tag
        .as_deref()
        .and_then(|tag| pattern.extract_version(tag));
    let current_version = match (tag_version, &manifest) {
        (Some(version), _) => version.to_string(),
        (None, Some(manifest)) => manifest.version()?,
        (None, None) => INITIAL_VERSION.to_string(),
    };
    debug!(?previous_tag, %current_version, commits = commits.len(), "release inputs");

    let outcome = if commits.is_empty() {
        warnings.push(BoundaryWarning::NoNewCommits {
            latest_tag: previous_tag.clone(),
            current_commit_hash: repo.head_hash().unwrap_or_default(),
        });
        ReleaseOutcome::NoReleasableChanges { skipped: 0 }
    } else {
        let raw: Vec<RawCommit> = commits.iter().map(RawCommit::from).collect();
        ReleaseAnalyzer::from_config(config)?.analyze(&current_version, &branch, &raw)?
    };

    match &outcome {
        ReleaseOutcome::NoReleasableChanges { skipped } if *skipped > 0 => {
            warnings.push(BoundaryWarning::NoReleasableChanges { skipped: *skipped });
        }
        ReleaseOutcome::Release(decision) => {
            let change_set = &decision.change_set;
            if change_set.has_only_hidden_changes {
                warnings.push(BoundaryWarning::OnlyHiddenChanges {
                    bump: decision.bump.to_string(),
                });
            } else if !change_set.has_visible_changes() {
                warnings.push(BoundaryWarning::NoRecognizedChanges {
                    commit_count: decision.commit_count,
                });
            }
        }
        ReleaseOutcome::NoReleasableChanges { .. } => {}
    }

    let remote_url = repo.remote_url(&config.git.remote)?;
    let repo_info = RepoInfo::resolve(remote_url.as_deref());
    if repo_info.is_none() {
        warnings.push(BoundaryWarning::RepoInfoUnavailable {
            remote: config.git.remote.clone(),
        });
    }

    let tag = match &outcome {
        ReleaseOutcome::Release(decision) => Some(pattern.format(&decision.next_version)),
        ReleaseOutcome::NoReleasableChanges { .. } => None,
    };

    Ok(ReleasePlan {
        branch,
        previous_tag,
        tag,
        outcome,
        warnings,
        repo_info,
        manifest_path: manifest.map(|m| m.path().to_path_buf()),
    })
}

/// Render the changelog entry and release notes with the configured templates
pub fn render_documents(
    decision: &ReleaseDecision,
    config: &Config,
    repo_info: Option<&RepoInfo>,
    date: NaiveDate,
) -> ReleaseDocuments {
    ReleaseDocuments {
        changelog_entry: render::render(
            &decision.next_version,
            &decision.change_set,
            &config.changelog.template(),
            &config.section_names,
            repo_info,
            date,
        ),
        notes: render::render(
            &decision.next_version,
            &decision.change_set,
            &config.release_notes.template(),
            &config.section_names,
            repo_info,
            date,
        ),
    }
}

/// Plan, confirm and execute a release.
///
/// `confirm` sees the plan and documents before anything changes; it is
/// not called when the plan is blocked.
pub fn run_release<R, F>(
    repo: &R,
    config: &Config,
    workdir: &Path,
    args: &ReleaseWorkflowArgs,
    date: NaiveDate,
    confirm: F,
) -> Result<ReleaseRun>
where
    R: Repository,
    F: FnOnce(&ReleasePlan, &ReleaseDocuments) -> Result<bool>,
{
    let plan = plan_release(repo, config, workdir, args.branch.as_deref())?;
    let documents = plan
        .decision()
        .filter(|_| !plan.is_blocked())
        .map(|decision| render_documents(decision, config, plan.repo_info.as_ref(), date));
    let Some(documents) = documents else {
        return Ok(ReleaseRun::Blocked(plan));
    };

    if !confirm(&plan, &documents)? {
        info!("release cancelled");
        return Ok(ReleaseRun::Cancelled);
    }

    execute_release(repo, config, workdir, &plan, &documents, args).map(ReleaseRun::Completed)
}

/// Sequential step runner; a dry run only records the descriptions
struct Steps {
    dry_run: bool,
    completed: Vec<String>,
}

impl Steps {
    fn run<F>(&mut self, description: String, action: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        if !self.dry_run {
            info!(step = %description, "running");
            action().with_context(|| self.failure_message(&description))?;
        }
        self.completed.push(description);
        Ok(())
    }

    fn failure_message(&self, failed: &str) -> String {
        if self.completed.is_empty() {
            format!("Step '{}' failed; nothing was changed", failed)
        } else {
            format!(
                "Step '{}' failed after completing: {}",
                failed,
                self.completed.join("; ")
            )
        }
    }
}

/// Run the configured command for a hook as one step.
///
/// Failures of non-fatal hooks become warnings instead of errors.
fn run_hook(
    steps: &mut Steps,
    warnings: &mut Vec<String>,
    config: &Config,
    context: HookContext,
    workdir: &Path,
) -> Result<()> {
    let Some(command) = config.hooks.command(context.hook_type) else {
        return Ok(());
    };
    let description = format!("Run {} hook `{}`", context.hook_type, command);

    if context.hook_type.is_fatal() {
        return steps.run(description, || {
            HookExecutor::execute(command, &context, workdir)?;
            Ok(())
        });
    }

    if !steps.dry_run {
        if let Some(warning) = HookExecutor::execute_permissive(command, &context, workdir) {
            warnings.push(warning);
        }
    }
    steps.completed.push(description);
    Ok(())
}

/// Write the release notes where hooks can read them
fn write_notes_file(tag: &str, notes: &str) -> Result<NamedTempFile> {
    let prefix = format!(
        "git-release-notes-{}-",
        tag.replace(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '-', "-")
    );
    let mut file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".md")
        .tempfile()?;
    file.write_all(notes.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Perform a planned release
///
/// The release commit is made on HEAD and pushed to `plan.branch`, so HEAD
/// must be that branch or detached (as in CI checkouts).
///
/// Order: pre_release hook, manifest version, changelog, release commit,
/// annotated tag, push, publish hook, create_release hook, post_release
/// hook. Without a push the publish and create_release hooks are skipped.
#[instrument(skip_all, fields(branch = %plan.branch))]
pub fn execute_release<R: Repository>(
    repo: &R,
    config: &Config,
    workdir: &Path,
    plan: &ReleasePlan,
    documents: &ReleaseDocuments,
    args: &ReleaseWorkflowArgs,
) -> Result<WorkflowResult> {
    let (Some(decision), Some(tag)) = (plan.decision(), plan.tag.as_deref()) else {
        anyhow::bail!("Nothing to release on branch '{}'", plan.branch);
    };
    if let Some(checked_out) = repo.head_branch()? {
        if checked_out != plan.branch {
            anyhow::bail!(
                "Cannot release branch '{}' while '{}' is checked out",
                plan.branch,
                checked_out
            );
        }
    }

    let version = decision.next_version.as_str();
    let remote = config.git.remote.as_str();
    let pushed = !args.no_push;

    let mut steps = Steps {
        dry_run: args.dry_run,
        completed: Vec::new(),
    };
    let mut warnings = Vec::new();

    let has_hooks = [
        HookType::PreRelease,
        HookType::Publish,
        HookType::CreateRelease,
        HookType::PostRelease,
    ]
    .into_iter()
    .any(|hook| config.hooks.command(hook).is_some());

    // removed when dropped, on every exit path
    let mut notes_file: Option<NamedTempFile> = None;
    if has_hooks {
        steps.run("Write release notes to a temporary file".to_string(), || {
            notes_file = Some(write_notes_file(tag, &documents.notes)?);
            Ok(())
        })?;
    }
    let notes_path = notes_file.as_ref().map(NamedTempFile::path);
    let hook_context = |hook: HookType| {
        let context = HookContext::from_decision(hook, decision, tag, remote, &documents.notes);
        match notes_path {
            Some(path) => context.with_notes_file(path),
            None => context,
        }
    };

    run_hook(&mut steps, &mut warnings, config, hook_context(HookType::PreRelease), workdir)?;

    let mut release_files: Vec<PathBuf> = Vec::new();

    if let Some(path) = &plan.manifest_path {
        steps.run(
            format!("Set version {} in {}", version, path.display()),
            || {
                let mut manifest = Manifest::load(path)?;
                manifest.set_version(version)?;
                manifest.write()?;
                Ok(())
            },
        )?;
        release_files.push(path.strip_prefix(workdir).unwrap_or(path).to_path_buf());
    }

    let changelog_path = workdir.join(&config.changelog.path);
    steps.run(
        format!("Prepend changelog entry to {}", config.changelog.path),
        || {
            let existing = match fs::read_to_string(&changelog_path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e.into()),
            };
            if let Some(parent) = changelog_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(
                &changelog_path,
                prepend_to_changelog(&existing, &documents.changelog_entry),
            )?;
            Ok(())
        },
    )?;
    release_files.push(PathBuf::from(&config.changelog.path));

    let message = substitute(&config.git.commit_message, |name| {
        (name == "version").then_some(version)
    });
    steps.run(format!("Commit \"{}\"", message), || {
        let paths: Vec<&Path> = release_files.iter().map(PathBuf::as_path).collect();
        repo.commit_paths(&paths, &message)?;
        Ok(())
    })?;

    steps.run(format!("Create tag {}", tag), || {
        let tag_message = format!("Release {}\n\n{}", version, documents.notes.trim_end());
        repo.create_tag(tag, tag_message.trim_end())?;
        Ok(())
    })?;

    if pushed {
        steps.run(
            format!("Push {} and {} to {}", plan.branch, tag, remote),
            || {
                repo.push(remote, &plan.branch, tag)?;
                Ok(())
            },
        )?;

        for hook in [HookType::Publish, HookType::CreateRelease] {
            run_hook(&mut steps, &mut warnings, config, hook_context(hook), workdir)?;
        }
    }

    run_hook(&mut steps, &mut warnings, config, hook_context(HookType::PostRelease), workdir)?;

    if let Some(file) = notes_file {
        if let Err(e) = file.close() {
            debug!(error = %e, "cannot remove release notes file");
        }
    }

    info!(tag, pushed, dry_run = args.dry_run, "release finished");
    Ok(WorkflowResult {
        tag: tag.to_string(),
        version: version.to_string(),
        branch: plan.branch.clone(),
        pushed: pushed && !args.dry_run,
        dry_run: args.dry_run,
        steps: steps.completed,
        warnings,
    })
}
