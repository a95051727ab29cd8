use colored::Colorize;

use super::ViewState;
use crate::models::{RepoDetails, SearchResultItem, UserRecord, NO_COMMIT_DATE};

/// Render the whole browser view:
///
/// Search: "octo"
/// ⠿ Loading...
///
/// ═══ Search Results ═══
///   1. octocat
///
/// ═══ User Details ═══
/// ...
pub fn render_view(view: &ViewState) -> String {
    let mut out = String::new();
    out.push_str(&format!("Search: \"{}\"\n", view.search_term));
    if view.loading {
        out.push_str(&loading_line());
    }
    out.push_str(&render_search_results(&view.search_results));
    if let Some(record) = &view.selected_user {
        out.push_str(&render_user(record));
    }
    out
}

pub fn loading_line() -> String {
    format!("{}\n", "⠿ Loading...".yellow())
}

/// Numbered result list. Indexes are 1-based, matching `open <n>`.
/// Nothing is rendered for an empty list.
pub fn render_search_results(results: &[SearchResultItem]) -> String {
    if results.is_empty() {
        return String::new();
    }

    let mut out = format!("\n═══ {} ═══\n", "Search Results".bold());
    for (i, item) in results.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, item.login.cyan()));
    }
    out
}

/// Profile block followed by the repository list.
pub fn render_user(record: &UserRecord) -> String {
    let user = &record.user;
    let mut out = format!("\n═══ {} ═══\n", "User Details".bold());
    out.push_str(&format!(
        "GitHub Name: {} ({})\n",
        user.login.bold(),
        user.html_url.underline()
    ));
    out.push_str(&format!(
        "Full Name: {}\n",
        user.name.as_deref().unwrap_or_default()
    ));
    out.push_str(&format!("Avatar: {}\n", user.avatar_url));
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
        out.push_str(&format!("{}\n", bio.italic()));
    }

    out.push_str(&format!("\n{}\n", "REPOSITORIES".bold()));
    if record.repos.is_empty() {
        out.push_str("  No repositories.\n");
    }
    for repo in &record.repos {
        out.push_str(&format!(
            "  • {} ({})\n",
            repo.name.green().bold(),
            repo.html_url
        ));
        if let Some(description) = repo.description.as_deref() {
            out.push_str(&format!("    {description}\n"));
        }
        if let Some(details) = &repo.details {
            out.push_str(&render_details(details));
        }
    }
    out
}

fn render_details(details: &RepoDetails) -> String {
    let last_commit = if details.last_commit_date.is_empty() {
        NO_COMMIT_DATE
    } else {
        details.last_commit_date.as_str()
    };

    let mut out = format!("    Last Commit Date: {last_commit}\n");
    out.push_str(&format!("    Creation Date: {}\n", details.creation_date));
    out.push_str("    LAST 5 COMMITS:\n");
    for message in &details.last_commits {
        // Only the subject line of multi-line messages.
        let subject = message.lines().next().unwrap_or_default();
        out.push_str(&format!("      - {}\n", subject.dimmed()));
    }
    out
}
