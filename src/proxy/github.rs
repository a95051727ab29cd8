use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use super::types::{self, CommitEntry, RepoMetadata, SearchUsersResponse, UserWithRepos};
use super::ProxyError;
use crate::config::GitHubConfig;
use crate::models::RepoDetails;

const USER_AGENT: &str = concat!("github-explorer/", env!("CARGO_PKG_VERSION"));

/// How many commits the repo details view lists.
const RECENT_COMMITS: usize = 5;

/// Thin client over the three GitHub REST resources the proxy exposes.
/// Every call is a single attempt: no retry, no cache.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(ProxyError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProxyError> {
        let url = format!("{}/{}", self.api_url, path);
        debug!(%url, "GET upstream");
        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Search users. The query fragment is placed into `q` as given.
    #[instrument(skip(self))]
    pub async fn search_users(&self, query: &str) -> Result<Vec<Value>, ProxyError> {
        let response: SearchUsersResponse = self.get_json(&format!("search/users?q={query}")).await?;
        debug!(results = response.items.len(), "received search results");
        Ok(response.items)
    }

    /// Fetch profile and repository list concurrently.
    /// Fails as a whole if either request fails.
    #[instrument(skip(self))]
    pub async fn user_with_repos(&self, username: &str) -> Result<UserWithRepos, ProxyError> {
        let user_path = format!("users/{username}");
        let repos_path = format!("users/{username}/repos");
        let (user, repos) = tokio::try_join!(
            self.get_json::<Value>(&user_path),
            self.get_json::<Value>(&repos_path),
        )?;
        Ok(UserWithRepos { user, repos })
    }

    /// Fetch repository metadata, then its newest commits.
    #[instrument(skip(self))]
    pub async fn repo_details(
        &self,
        username: &str,
        repo_name: &str,
    ) -> Result<RepoDetails, ProxyError> {
        let repo: RepoMetadata = self
            .get_json(&format!("repos/{username}/{repo_name}"))
            .await?;
        let commits: Vec<CommitEntry> = self
            .get_json(&format!(
                "repos/{username}/{repo_name}/commits?per_page={RECENT_COMMITS}"
            ))
            .await?;
        debug!(commits = commits.len(), "received recent commits");
        Ok(types::repo_details(repo, commits))
    }
}
