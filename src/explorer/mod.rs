pub mod http;
pub mod render;
pub mod shell;

pub use http::HttpExplorerApi;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ClientConfig;
use crate::models::{RepoDetails, SearchResultItem, UserRecord};

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("Proxy request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Proxy returned {status}: {message}")]
    Proxy { status: u16, message: String },

    #[error("No user is selected")]
    NoSelectedUser,

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

/// The three proxy endpoints as seen by the browser.
/// Implementations must be Send + Sync so actions can run as independent tasks.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    async fn search_users(&self, term: &str) -> Result<Vec<SearchResultItem>, ExplorerError>;

    async fn get_user(&self, login: &str) -> Result<UserRecord, ExplorerError>;

    async fn get_repo_details(&self, login: &str, repo: &str)
        -> Result<RepoDetails, ExplorerError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ExplorerOptions {
    /// Quiet period after typing before the search is sent
    pub debounce: Duration,
    /// Artificial pause before a selected user is fetched
    pub select_delay: Duration,
}

impl From<&ClientConfig> for ExplorerOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            debounce: config.debounce(),
            select_delay: config.select_delay(),
        }
    }
}

/// Everything the browser displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub search_results: Vec<SearchResultItem>,
    pub selected_user: Option<UserRecord>,
    pub loading: bool,
}

/// What happened to the response of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response was written into the view state
    Applied,
    /// A newer action of the same kind started first; nothing was changed
    Superseded,
    /// No request was needed
    Skipped,
}

/// Keeps the loading flag raised while alive.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn raise(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller owning the view state.
///
/// Actions take `&self` and may overlap. Searches and user selections are
/// numbered; a response is applied only if no newer action of the same kind
/// was started in the meantime, so the last action issued wins.
pub struct Explorer<A> {
    api: A,
    options: ExplorerOptions,
    state: Mutex<ViewState>,
    in_flight: AtomicUsize,
    search_generation: AtomicU64,
    select_generation: AtomicU64,
}

impl<A: ExplorerApi> Explorer<A> {
    pub fn new(api: A, options: ExplorerOptions) -> Self {
        Self {
            api,
            options,
            state: Mutex::new(ViewState::default()),
            in_flight: AtomicUsize::new(0),
            search_generation: AtomicU64::new(0),
            select_generation: AtomicU64::new(0),
        }
    }

    /// Copy of the current view state.
    pub async fn snapshot(&self) -> ViewState {
        let mut view = self.state.lock().await.clone();
        view.loading = self.is_loading();
        view
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The user edited the search box.
    ///
    /// A non-empty term is searched once the debounce period passes without
    /// another edit or submit.
    #[instrument(skip(self))]
    pub async fn type_term(&self, term: &str) -> Result<Outcome, ExplorerError> {
        let generation = {
            let mut state = self.state.lock().await;
            state.search_term = term.to_string();
            self.search_generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        if term.is_empty() {
            return Ok(Outcome::Skipped);
        }

        if !self.options.debounce.is_zero() {
            tokio::time::sleep(self.options.debounce).await;
            if self.search_generation.load(Ordering::SeqCst) != generation {
                debug!("typed search replaced before it was sent");
                return Ok(Outcome::Superseded);
            }
        }

        self.run_search(term.to_string(), generation).await
    }

    /// The user pressed Search, optionally replacing the term first.
    /// Sent immediately; cancels any pending typed search.
    #[instrument(skip(self))]
    pub async fn submit_search(&self, term: Option<&str>) -> Result<Outcome, ExplorerError> {
        let (term, generation) = {
            let mut state = self.state.lock().await;
            if let Some(term) = term {
                state.search_term = term.to_string();
            }
            let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
            (state.search_term.clone(), generation)
        };

        if term.is_empty() {
            debug!("empty search term, nothing to submit");
            return Ok(Outcome::Skipped);
        }

        self.run_search(term, generation).await
    }

    async fn run_search(&self, term: String, generation: u64) -> Result<Outcome, ExplorerError> {
        let _loading = LoadingGuard::raise(&self.in_flight);

        let results = self.api.search_users(&term).await.map_err(|e| {
            error!(error = %e, term = %term, "search failed");
            e
        })?;

        let mut state = self.state.lock().await;
        if self.search_generation.load(Ordering::SeqCst) != generation {
            debug!(term = %term, "discarding results of an outdated search");
            return Ok(Outcome::Superseded);
        }
        info!(term = %term, results = results.len(), "search results updated");
        state.search_results = results;
        Ok(Outcome::Applied)
    }

    /// The user clicked a search result.
    /// Replaces the selected user wholesale, dropping any loaded repo details.
    #[instrument(skip(self))]
    pub async fn select_user(&self, login: &str) -> Result<Outcome, ExplorerError> {
        let generation = self.select_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::raise(&self.in_flight);

        if !self.options.select_delay.is_zero() {
            tokio::time::sleep(self.options.select_delay).await;
        }
        if self.select_generation.load(Ordering::SeqCst) != generation {
            debug!("selection replaced before it was sent");
            return Ok(Outcome::Superseded);
        }

        let record = self.api.get_user(login).await.map_err(|e| {
            error!(error = %e, "loading user failed");
            e
        })?;

        let mut state = self.state.lock().await;
        if self.select_generation.load(Ordering::SeqCst) != generation {
            debug!("discarding an outdated selection");
            return Ok(Outcome::Superseded);
        }
        info!(repos = record.repos.len(), "selected user updated");
        state.selected_user = Some(record);
        Ok(Outcome::Applied)
    }

    /// The user asked for details of one repository of the selected user.
    #[instrument(skip(self))]
    pub async fn load_repo_details(&self, repo_name: &str) -> Result<Outcome, ExplorerError> {
        let login = self
            .state
            .lock()
            .await
            .selected_user
            .as_ref()
            .map(|record| record.user.login.clone())
            .ok_or(ExplorerError::NoSelectedUser)?;

        let _loading = LoadingGuard::raise(&self.in_flight);

        let details = self
            .api
            .get_repo_details(&login, repo_name)
            .await
            .map_err(|e| {
                error!(error = %e, login = %login, "loading repo details failed");
                e
            })?;

        let mut state = self.state.lock().await;
        match state.selected_user.as_mut() {
            Some(record) if record.user.login == login => {
                if record.attach_details(repo_name, &details) {
                    info!(login = %login, "repo details attached");
                    Ok(Outcome::Applied)
                } else {
                    warn!(login = %login, "repository not in the selected user's list");
                    Ok(Outcome::Skipped)
                }
            }
            _ => {
                debug!(login = %login, "selected user changed, dropping repo details");
                Ok(Outcome::Superseded)
            }
        }
    }
}
