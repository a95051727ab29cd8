use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{RepoDetails, NO_COMMIT_DATE};

/// Envelope of `GET /search/users`. Items are forwarded untouched.
#[derive(Debug, Deserialize)]
pub struct SearchUsersResponse {
    pub items: Vec<Value>,
}

/// Reply of the user endpoint: raw profile and raw repository list.
#[derive(Debug, Serialize)]
pub struct UserWithRepos {
    pub user: Value,
    pub repos: Value,
}

/// The part of `GET /repos/{owner}/{repo}` the proxy reads.
#[derive(Debug, Deserialize)]
pub struct RepoMetadata {
    pub created_at: String,
}

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
pub struct CommitEntry {
    pub commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
pub struct CommitInfo {
    pub message: String,
    /// GitHub sends null here for some imported commits
    pub author: Option<GitActor>,
}

#[derive(Debug, Deserialize)]
pub struct GitActor {
    pub date: Option<String>,
}

/// Combine repository metadata and its newest commits into [`RepoDetails`].
/// Commit order is kept as returned upstream (newest first).
pub fn repo_details(repo: RepoMetadata, commits: Vec<CommitEntry>) -> RepoDetails {
    let last_commit_date = commits
        .first()
        .and_then(|c| c.commit.author.as_ref())
        .and_then(|a| a.date.clone())
        .unwrap_or_else(|| NO_COMMIT_DATE.to_string());

    RepoDetails {
        last_commit_date,
        creation_date: repo.created_at,
        last_commits: commits.into_iter().map(|c| c.commit.message).collect(),
    }
}
