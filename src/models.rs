use serde::{Deserialize, Serialize};

/// Placeholder shown for `last_commit_date` when a repository has no commits.
pub const NO_COMMIT_DATE: &str = "N/A";

/// A single hit from the user search endpoint.
/// Only the fields the browser uses are kept; the proxy forwards the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: u64,
    pub login: String,
}

/// Profile fields of a GitHub user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub html_url: String,
}

/// A repository as listed on the user detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    /// Filled in on demand by a repo details fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RepoDetails>,
}

/// Commit activity for one repository, assembled by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDetails {
    /// Author date of the newest commit, or [`NO_COMMIT_DATE`]
    pub last_commit_date: String,
    pub creation_date: String,
    /// Messages of the most recent commits, newest first
    pub last_commits: Vec<String>,
}

/// The selected user: profile plus repository list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user: UserProfile,
    pub repos: Vec<RepoSummary>,
}

impl UserRecord {
    /// Attach `details` to every repository named `repo_name`.
    /// Returns false when no repository matched.
    pub fn attach_details(&mut self, repo_name: &str, details: &RepoDetails) -> bool {
        let mut matched = false;
        for repo in self.repos.iter_mut().filter(|r| r.name == repo_name) {
            repo.details = Some(details.clone());
            matched = true;
        }
        matched
    }
}
