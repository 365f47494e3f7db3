// src/providers/mod.rs
// =============================================================================
// Hosting providers (GitHub, GitLab) behind one trait.
//
// Submodules:
// - github:   GitHub REST v3 (token required)
// - gitlab:   GitLab REST v4 (token optional)
// - registry: picks the provider for a URL and parses owner/repo
//
// This file holds what every provider shares: the Provider trait, the value
// types they return and the language percentage helper.
//
// Rust concepts:
// - Trait objects: Arc<dyn Provider> lets the registry keep a list of
//   different provider types
// - Enums with data: FileFetch says either "here is the content" or "the
//   file could not be read, and why"
// =============================================================================

mod github;
mod gitlab;
mod registry;

pub use github::GitHubProvider;
pub use gitlab::GitLabProvider;
pub use registry::{ParsedRepo, ProviderRegistry};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which hosting service a provider talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    GitLab,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::GitHub => write!(f, "GitHub"),
            ProviderKind::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Repository metadata, normalized across providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    /// Login (GitHub) or namespace path (GitLab)
    pub owner: String,
    /// Empty when the repository has no description
    pub description: String,
    pub stars: u64,
    pub forks: u64,
    /// Primary language, "Unknown" when the provider does not say
    pub language: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

/// Share of the codebase written in one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    /// 0-100, rounded on its own (the set may not sum to exactly 100)
    pub percentage: u8,
}

/// A selected file and its (truncated) content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    pub path: String,
    pub content: String,
}

/// owner/repo pair as understood by one provider's URL parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

/// Outcome of reading a single file.
///
/// Callers that care whether a file was really read match on this; the
/// public `fetch_file_content` collapses `Missing` to an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFetch {
    Content(String),
    Missing(String),
}

impl FileFetch {
    pub fn missing(reason: impl Into<String>) -> Self {
        FileFetch::Missing(reason.into())
    }

    pub fn is_content(&self) -> bool {
        matches!(self, FileFetch::Content(_))
    }

    pub fn into_content(self) -> String {
        match self {
            FileFetch::Content(content) => content,
            FileFetch::Missing(_) => String::new(),
        }
    }
}

/// The contract every hosting backend implements
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Cheap domain check used for dispatch; no I/O
    fn detect(&self, url: &str) -> bool;

    /// Extracts owner/repo from a URL or shorthand; None when it does not fit
    fn parse_url(&self, url: &str) -> Option<RepoRef>;

    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo>;

    /// Paths of every blob on the default branch
    async fn fetch_repo_tree(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    /// Reads one file from the default branch. Never fails.
    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> FileFetch;

    /// Like `fetch_file`, but an unreadable file is just ""
    async fn fetch_file_content(&self, owner: &str, repo: &str, path: &str) -> String {
        self.fetch_file(owner, repo, path).await.into_content()
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<Vec<LanguageInfo>>;

    /// Archive link for a branch ("main" when none is given). Not validated.
    fn download_url(&self, owner: &str, repo: &str, branch: Option<&str>) -> String;
}

/// Turns a language -> weight listing into rounded percentages.
///
/// Weights are byte counts (GitHub) or shares (GitLab); only their ratio
/// matters. Largest language first. A zero total gives 0% everywhere
/// instead of dividing by zero.
pub fn language_percentages<I>(weights: I) -> Vec<LanguageInfo>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut weights: Vec<(String, f64)> = weights
        .into_iter()
        .map(|(name, weight)| (name, weight.max(0.0)))
        .collect();
    weights.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total: f64 = weights.iter().map(|(_, weight)| weight).sum();

    weights
        .into_iter()
        .map(|(name, weight)| {
            let percentage = if total > 0.0 {
                (weight * 100.0 / total).round().clamp(0.0, 100.0) as u8
            } else {
                0
            };
            LanguageInfo { name, percentage }
        })
        .collect()
}

/// Strips whitespace and trailing slashes from user input
pub(crate) fn clean_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// Drops a trailing ".git" from a repository name
pub(crate) fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}
