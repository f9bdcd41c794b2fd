//! Pure formatting functions for UI output.
//!
//! `format_*` functions build strings and are testable; `display_*`
//! functions print them.

use crate::analyzer::ReleaseDecision;
use crate::boundary::BoundaryWarning;
use console::style;

const MAX_LISTED_COMMITS: usize = 10;
const MAX_SUBJECT_WIDTH: usize = 60;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
}

/// Commit subjects on a branch, at most ten, long subjects cut at 60 chars
pub fn format_commit_analysis(subjects: &[String], branch_name: &str) -> String {
    let mut output = format!(
        "{}\n{}\n",
        style(format!("Analyzing commits on branch '{}'", branch_name)).bold(),
        style(format!("{} commit(s) since last release:", subjects.len())).underlined()
    );

    for (i, subject) in subjects.iter().take(MAX_LISTED_COMMITS).enumerate() {
        let short: String = subject.chars().take(MAX_SUBJECT_WIDTH).collect();
        output.push_str(&format!("  {}. {}\n", i + 1, short));
    }

    if subjects.len() > MAX_LISTED_COMMITS {
        output.push_str(&format!(
            "  ... and {} more commits\n",
            subjects.len() - MAX_LISTED_COMMITS
        ));
    }
    output
}

pub fn display_commit_analysis(subjects: &[String], branch_name: &str) {
    println!("\n{}", format_commit_analysis(subjects, branch_name));
}

/// The computed release: version change, bump, channel and sections
pub fn format_decision(decision: &ReleaseDecision, old_tag: Option<&str>, new_tag: &str) -> String {
    let mut output = match old_tag {
        Some(old) => format!(
            "{}\n  From: {}\n  To:   {}\n",
            style("Proposed Release:").bold(),
            style(old).red(),
            style(new_tag).green()
        ),
        None => format!(
            "{}\n  New tag: {}\n",
            style("Initial Release:").bold(),
            style(new_tag).green()
        ),
    };

    output.push_str(&format!(
        "  Version: {} -> {} ({} bump)\n",
        decision.current_version,
        style(&decision.next_version).green().bold(),
        decision.bump
    ));
    if let Some(channel) = &decision.prerelease {
        output.push_str(&format!("  Prerelease: {}\n", style(channel).cyan()));
    }

    for (section, items) in &decision.change_set.changes {
        output.push_str(&format!("  {}: {}\n", section, items.len()));
    }
    output
}

pub fn display_decision(decision: &ReleaseDecision, old_tag: Option<&str>, new_tag: &str) {
    println!("\n{}", format_decision(decision, old_tag, new_tag));
}

/// Steps a dry run would have performed
pub fn display_planned_steps(steps: &[String]) {
    println!("\n{}", style("Dry run, nothing was changed. Planned steps:").bold());
    for (i, step) in steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
}

/// Display manual push instruction for a release.
pub fn display_manual_push_instruction(branch: &str, tag: &str, remote: &str) {
    println!(
        "\n{} To push this release later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {} {}", remote, branch, tag)).cyan()
    );
}
