use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default config file looked up in the current directory.
pub const CONFIG_FILE: &str = ".github-explorer.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .github-explorer.toml.
/// All fields are optional — both the proxy and the browser work with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Upstream GitHub API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Proxy service settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Interactive browser settings
    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,

    /// Base URL of the GitHub REST API, without trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the proxy binds to
    #[serde(default = "default_listen")]
    pub listen: String,

    /// The single origin allowed by CORS
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the proxy service
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,

    /// Quiet period after typing before a search is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Artificial delay before fetching a selected user
    #[serde(default = "default_select_delay_ms")]
    pub select_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: default_proxy_url(),
            debounce_ms: default_debounce_ms(),
            select_delay_ms: default_select_delay_ms(),
        }
    }
}

impl ClientConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn select_delay(&self) -> Duration {
        Duration::from_millis(self.select_delay_ms)
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:3002".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_proxy_url() -> String {
    "http://localhost:3002".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_select_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from `path`, or from .github-explorer.toml in the
    /// current directory when no path is given.
    /// A missing default file yields the default config; a missing explicit
    /// path is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                if !token.is_empty() {
                    config.github.token = Some(token);
                }
            }
        }

        Ok(config)
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
