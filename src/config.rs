// src/config.rs
// =============================================================================
// Configuration for the providers, the HTTP client and the key-file selector.
//
// Nothing in the library reads the environment on its own: a Config value is
// built once (by the CLI, or by Config::from_env) and handed to the provider
// registry. Tests build one by hand with fake tokens.
//
// Environment variables read by Config::from_env:
//   GITHUB_TOKEN          GitHub access token (required for GitHub calls)
//   GITLAB_TOKEN          GitLab private token (optional)
//   REPO_LENS_GITHUB_API  override for https://api.github.com
//   REPO_LENS_GITLAB_API  override for https://gitlab.com/api/v4
// =============================================================================

use std::env;
use std::time::Duration;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_GITLAB_API: &str = "https://gitlab.com/api/v4";

/// Branch used in download links when the caller does not know better
pub const DEFAULT_BRANCH_GUESS: &str = "main";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub http: HttpConfig,
    pub github: GitHubConfig,
    pub gitlab: GitLabConfig,
    pub selector: SelectorConfig,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout for structural calls
    pub timeout: Duration,
    /// GitHub rejects requests without a User-Agent
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("repo-lens/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: Option<String>,
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_GITHUB_API.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GitLabConfig {
    pub token: Option<String>,
    pub api_base: String,
    /// Tree entries requested per page
    pub page_size: u32,
    /// Hard stop for tree pagination (page_size * max_pages files at most)
    pub max_pages: u32,
    /// Owner paths are cut at the first occurrence of this marker
    pub action_path_marker: String,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_GITLAB_API.to_string(),
            page_size: 100,
            max_pages: 10,
            action_path_marker: "/-".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Selected paths beyond this count are dropped
    pub max_files: usize,
    /// Each file's content is cut to this many characters
    pub max_chars: usize,
    /// How many content fetches run at once
    pub concurrency: usize,
    /// Per-file deadline; expiry counts as an unreadable file
    pub fetch_timeout: Duration,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_files: 60,
            max_chars: 4000,
            concurrency: 60,
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

impl Config {
    /// Builds a config from the process environment on top of the defaults.
    ///
    /// Empty variables count as unset.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.github.token = non_empty_var("GITHUB_TOKEN");
        config.gitlab.token = non_empty_var("GITLAB_TOKEN");
        if let Some(api) = non_empty_var("REPO_LENS_GITHUB_API") {
            config.github.api_base = api;
        }
        if let Some(api) = non_empty_var("REPO_LENS_GITLAB_API") {
            config.gitlab.api_base = api;
        }
        config
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github.token = Some(token.into());
        self
    }

    pub fn with_gitlab_token(mut self, token: impl Into<String>) -> Self {
        self.gitlab.token = Some(token.into());
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
