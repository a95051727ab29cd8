use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ExplorerApi, ExplorerError};
use crate::models::{RepoDetails, SearchResultItem, UserRecord};

/// Error body the proxy sends with a 500.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to the proxy's `/api/github/*` routes.
/// Path segments are inserted exactly as the user typed them.
#[derive(Debug, Clone)]
pub struct HttpExplorerApi {
    http: reqwest::Client,
    proxy_url: String,
}

impl HttpExplorerApi {
    pub fn new(proxy_url: &str) -> Result<Self, ExplorerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("github-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ExplorerError> {
        let url = format!("{}/api/github/{}", self.proxy_url, path);
        debug!(%url, "GET proxy");
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(ExplorerError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ExplorerApi for HttpExplorerApi {
    async fn search_users(&self, term: &str) -> Result<Vec<SearchResultItem>, ExplorerError> {
        self.get_json(&format!("search/{term}")).await
    }

    async fn get_user(&self, login: &str) -> Result<UserRecord, ExplorerError> {
        self.get_json(&format!("user/{login}")).await
    }

    async fn get_repo_details(
        &self,
        login: &str,
        repo: &str,
    ) -> Result<RepoDetails, ExplorerError> {
        self.get_json(&format!("repo/{login}/{repo}")).await
    }
}
