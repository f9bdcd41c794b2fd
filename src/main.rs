use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_release::cli::{plan_release, render_documents, run_release, ReleaseRun, ReleaseWorkflowArgs};
use git_release::config::{self, Config};
use git_release::git::Git2Repository;
use git_release::ui;

#[derive(Parser)]
#[command(
    name = "git-release",
    version,
    about = "Version, changelog and tag releases from conventional commits"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the next release computed from commits since the last tag
    Analyze {
        #[arg(short, long, help = "Branch to analyze instead of the current one")]
        branch: Option<String>,

        #[arg(long, help = "Print the decision as JSON")]
        json: bool,
    },
    /// Print the changelog entry for the next release
    Changelog {
        #[arg(short, long, help = "Branch to analyze instead of the current one")]
        branch: Option<String>,
    },
    /// Print the release notes for the next release
    Notes {
        #[arg(short, long, help = "Branch to analyze instead of the current one")]
        branch: Option<String>,
    },
    /// Bump the version, update the changelog, commit, tag and push
    Release {
        #[arg(short, long, help = "Branch to release instead of the current one")]
        branch: Option<String>,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,

        #[arg(long, help = "Create the commit and tag locally without pushing")]
        no_push: bool,

        #[arg(short, long, help = "Skip confirmation prompts")]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref()).context("Error loading config")?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Analyze { branch, json } => analyze(&config, branch.as_deref(), json),
        Command::Changelog { branch } => print_document(&config, branch.as_deref(), false),
        Command::Notes { branch } => print_document(&config, branch.as_deref(), true),
        Command::Release {
            branch,
            dry_run,
            no_push,
            force,
        } => release(
            &config,
            ReleaseWorkflowArgs {
                branch,
                force,
                dry_run,
                no_push,
            },
        ),
    }
}

fn open_repository() -> Result<(Git2Repository, std::path::PathBuf)> {
    let repo = Git2Repository::open(".").context("Git repository error")?;
    let workdir = repo.workdir()?;
    Ok((repo, workdir))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn analyze(config: &Config, branch: Option<&str>, json: bool) -> Result<()> {
    let (repo, workdir) = open_repository()?;
    let plan = plan_release(&repo, config, &workdir, branch)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.outcome)?);
        return Ok(());
    }

    for warning in &plan.warnings {
        ui::display_boundary_warning(warning);
    }
    if let (Some(decision), Some(tag)) = (plan.decision(), plan.tag.as_deref()) {
        ui::display_commit_analysis(&decision.subjects, &plan.branch);
        ui::display_decision(decision, plan.previous_tag.as_deref(), tag);
    }
    Ok(())
}

fn print_document(config: &Config, branch: Option<&str>, notes: bool) -> Result<()> {
    let (repo, workdir) = open_repository()?;
    let plan = plan_release(&repo, config, &workdir, branch)?;

    let Some(decision) = plan.decision() else {
        for warning in &plan.warnings {
            ui::display_boundary_warning(warning);
        }
        return Ok(());
    };

    let documents = render_documents(decision, config, plan.repo_info.as_ref(), today());
    if notes {
        print!("{}", documents.notes);
    } else {
        print!("{}", documents.changelog_entry);
    }
    Ok(())
}

fn release(config: &Config, args: ReleaseWorkflowArgs) -> Result<()> {
    let (repo, workdir) = open_repository()?;
    let interactive = !args.force && !args.dry_run;

    let run = run_release(&repo, config, &workdir, &args, today(), |plan, _| {
        for warning in &plan.warnings {
            ui::display_boundary_warning(warning);
        }
        if let (Some(decision), Some(tag)) = (plan.decision(), plan.tag.as_deref()) {
            ui::display_commit_analysis(&decision.subjects, &plan.branch);
            ui::display_decision(decision, plan.previous_tag.as_deref(), tag);
        }
        if interactive {
            ui::confirm_action("Proceed with this release?")
        } else {
            Ok(true)
        }
    })?;

    match run {
        ReleaseRun::Blocked(plan) => {
            for warning in &plan.warnings {
                ui::display_boundary_warning(warning);
            }
            ui::display_status("Nothing to release.");
        }
        ReleaseRun::Cancelled => println!("Release cancelled by user."),
        ReleaseRun::Completed(result) => {
            for warning in &result.warnings {
                ui::display_status(&format!("Warning: {}", warning));
            }
            if result.dry_run {
                ui::display_planned_steps(&result.steps);
            } else if result.pushed {
                ui::display_success(&format!(
                    "Released {} from branch {}",
                    result.tag, result.branch
                ));
            } else {
                ui::display_success(&format!(
                    "Release {} created locally for branch {}",
                    result.tag, result.branch
                ));
                ui::display_manual_push_instruction(&result.branch, &result.tag, &config.git.remote);
            }
        }
    }
    Ok(())
}
