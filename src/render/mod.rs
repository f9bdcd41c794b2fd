//! Changelog and release notes rendering

pub mod links;
pub mod template;

pub use links::{item_link, RepoInfo};
pub use template::substitute;

use crate::analyzer::ChangeSet;
use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{debug, instrument};

/// Title line kept at the top of the changelog file
pub const CHANGELOG_TITLE: &str = "# Changelog";

/// Templates for one rendered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTemplate {
    /// Emitted once; `{version}` and `{date}` available
    pub header: String,
    /// Emitted per section; `{section}` available
    pub section: String,
    /// Emitted per change; `{item}` available
    pub item: String,
}

impl RenderTemplate {
    pub fn changelog_default() -> Self {
        RenderTemplate {
            header: "## [{version}] - {date}\n\n".to_string(),
            section: "### {section}\n\n".to_string(),
            item: "- {item}\n".to_string(),
        }
    }

    pub fn release_notes_default() -> Self {
        RenderTemplate {
            header: String::new(),
            ..RenderTemplate::changelog_default()
        }
    }
}

/// Render a change set into text.
///
/// Sections come out in the order they appear in `change_set.changes`, each
/// followed by a blank line. Section names are looked up in `section_names`
/// and fall back to their original name. Items get an inline link when both
/// link metadata and `repo` are available.
#[instrument(skip(change_set, template, section_names, repo), fields(sections = change_set.changes.len()))]
pub fn render(
    version: &str,
    change_set: &ChangeSet,
    template: &RenderTemplate,
    section_names: &IndexMap<String, String>,
    repo: Option<&RepoInfo>,
    date: NaiveDate,
) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    let mut output = substitute(&template.header, |name| match name {
        "version" => Some(version),
        "date" => Some(date.as_str()),
        _ => None,
    });

    for (section, items) in &change_set.changes {
        if items.is_empty() {
            continue;
        }

        let title = section_names
            .get(section)
            .map(String::as_str)
            .unwrap_or(section);
        output.push_str(&substitute(&template.section, |name| match name {
            "section" => Some(title),
            "version" => Some(version),
            _ => None,
        }));

        for item in items {
            let linked = format!(
                "{}{}",
                item,
                item_link(change_set.commit_meta.get(item), repo)
            );
            output.push_str(&substitute(&template.item, |name| match name {
                "item" => Some(linked.as_str()),
                _ => None,
            }));
        }

        output.push('\n');
    }

    debug!(output_len = output.len(), "rendered");
    output
}

/// Changelog entry with the default changelog template
pub fn render_changelog(
    version: &str,
    change_set: &ChangeSet,
    section_names: &IndexMap<String, String>,
    repo: Option<&RepoInfo>,
    date: NaiveDate,
) -> String {
    render(
        version,
        change_set,
        &RenderTemplate::changelog_default(),
        section_names,
        repo,
        date,
    )
}

/// Release notes with the default release notes template
pub fn render_release_notes(
    version: &str,
    change_set: &ChangeSet,
    section_names: &IndexMap<String, String>,
    repo: Option<&RepoInfo>,
    date: NaiveDate,
) -> String {
    render(
        version,
        change_set,
        &RenderTemplate::release_notes_default(),
        section_names,
        repo,
        date,
    )
}

/// Insert `entry` below the changelog title, newest entry first.
///
/// A missing title is added. Existing content without a title is kept below
/// the new entry.
pub fn prepend_to_changelog(existing: &str, entry: &str) -> String {
    let entry = entry.trim_end_matches('\n');
    let existing = existing.trim_start_matches('\n');

    let body = match existing.strip_prefix(CHANGELOG_TITLE) {
        Some(rest) if rest.is_empty() || rest.starts_with('\n') => rest.trim_start_matches('\n'),
        _ => existing,
    };

    if body.trim().is_empty() {
        format!("{}\n\n{}\n", CHANGELOG_TITLE, entry)
    } else {
        format!("{}\n\n{}\n\n{}", CHANGELOG_TITLE, entry, body)
    }
}
