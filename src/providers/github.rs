// src/providers/github.rs
// =============================================================================
// GitHub provider (REST API v3).
//
// Every call needs a token. Without one, structural calls fail right away
// with a configuration error and no request is sent; file reads just come
// back empty.
//
// Endpoints used:
//   GET /repos/{owner}/{repo}                      metadata + default branch
//   GET /repos/{owner}/{repo}/git/ref/heads/{br}   branch head commit
//   GET /repos/{owner}/{repo}/git/trees/{sha}      recursive file tree
//   GET /repos/{owner}/{repo}/contents/{path}      raw file content
//   GET /repos/{owner}/{repo}/languages            language -> bytes
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{
    clean_url, language_percentages, strip_git_suffix, FileFetch, LanguageInfo, Provider,
    ProviderKind, RepoInfo, RepoRef,
};
use crate::config::{GitHubConfig, DEFAULT_BRANCH_GUESS};
use crate::error::{RepoError, Result};
use crate::http::{HttpResponse, HttpTransport};

const DOMAIN: &str = "github.com";
const MISSING_TOKEN: &str =
    "GitHub authentication not configured. Please set GITHUB_TOKEN environment variable.";

// Response shapes: only the fields we read

#[derive(Debug, Deserialize)]
struct GhRepo {
    name: String,
    owner: GhOwner,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    html_url: String,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhRef {
    object: GhObject,
}

#[derive(Debug, Deserialize)]
struct GhObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GhTree {
    tree: Vec<GhTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GhTreeEntry {
    path: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct GhMessage {
    message: String,
}

pub struct GitHubProvider {
    transport: Arc<dyn HttpTransport>,
    token: Option<String>,
    api_base: String,
}

impl GitHubProvider {
    pub fn new(config: &GitHubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            token: config.token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Auth headers, or a config error when no token is set
    fn headers(&self, accept: &'static str) -> Result<Vec<(&'static str, String)>> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| RepoError::config(MISSING_TOKEN))?;

        Ok(vec![
            ("Authorization", format!("Bearer {}", token)),
            ("Accept", accept.to_string()),
            ("X-GitHub-Api-Version", "2022-11-28".to_string()),
        ])
    }

    /// /repos/{owner}/{repo} followed by `rest`, each segment encoded
    fn repo_url(&self, owner: &str, repo: &str, rest: &[&str]) -> String {
        let mut url = format!(
            "{}/repos/{}/{}",
            self.api_base,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        for segment in rest {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn get(&self, url: &str, accept: &'static str) -> Result<HttpResponse> {
        let headers = self.headers(accept)?;
        self.transport.get(url, &headers).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, owner: &str, repo: &str) -> Result<T> {
        let response = self.get(url, "application/vnd.github+json").await?;
        check_status(&response, owner, repo)?;
        response.json()
    }

    async fn get_repo(&self, owner: &str, repo: &str) -> Result<GhRepo> {
        let url = self.repo_url(owner, repo, &[]);
        self.get_json(&url, owner, repo).await
    }
}

fn check_status(response: &HttpResponse, owner: &str, repo: &str) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(RepoError::not_found(format!(
            "Repository not found: {}/{}. Make sure it exists and is public.",
            owner, repo
        )));
    }

    // GitHub puts a human readable reason in {"message": "..."}
    let message = match serde_json::from_str::<GhMessage>(&response.body) {
        Ok(body) => format!("GitHub API error: {} ({})", response.status_text, body.message),
        Err(_) => format!("GitHub API error: {}", response.status_text),
    };
    Err(RepoError::api(response.status, message))
}

/// `owner/repo` out of a path, tolerating anything after the repo segment
fn leading_pair(path: &str) -> Option<(&str, &str)> {
    let mut parts = path.splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some((owner, repo))
}

/// https://github.com/owner/repo, http:// and www. allowed
fn parse_scheme_form(url: &str) -> Option<(&str, &str)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let path = rest.strip_prefix(DOMAIN)?.strip_prefix('/')?;
    leading_pair(path)
}

/// github.com/owner/repo
fn parse_bare_form(url: &str) -> Option<(&str, &str)> {
    let path = url.strip_prefix(DOMAIN)?.strip_prefix('/')?;
    leading_pair(path)
}

/// owner/repo and nothing else
fn parse_shorthand(url: &str) -> Option<(&str, &str)> {
    let (owner, repo) = url.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

#[async_trait]
impl Provider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn detect(&self, url: &str) -> bool {
        url.contains(DOMAIN)
    }

    fn parse_url(&self, url: &str) -> Option<RepoRef> {
        let cleaned = clean_url(url);

        // First pattern that yields a usable pair wins. An owner with a dot
        // in it is a host name picked up by mistake ("example.com/x").
        [
            parse_scheme_form(cleaned),
            parse_bare_form(cleaned),
            parse_shorthand(cleaned),
        ]
        .into_iter()
        .flatten()
        .find_map(|(owner, repo)| {
            let repo = strip_git_suffix(repo);
            if owner.is_empty() || repo.is_empty() || owner.contains('.') {
                None
            } else {
                Some(RepoRef::new(owner, repo))
            }
        })
    }

    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        let data = self.get_repo(owner, repo).await?;

        Ok(RepoInfo {
            name: data.name,
            owner: data.owner.login,
            description: data.description.unwrap_or_default(),
            stars: data.stargazers_count,
            forks: data.forks_count,
            language: data.language.unwrap_or_else(|| "Unknown".to_string()),
            url: data.html_url,
            default_branch: data.default_branch,
        })
    }

    async fn fetch_repo_tree(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let data = self.get_repo(owner, repo).await?;
        let branch = data
            .default_branch
            .ok_or_else(|| RepoError::Decode(format!("{}/{} has no default branch", owner, repo)))?;

        // branch names may contain '/', which the ref endpoint expects as-is
        let mut ref_segments = vec!["git", "ref", "heads"];
        ref_segments.extend(branch.split('/'));
        let ref_url = self.repo_url(owner, repo, &ref_segments);
        let head: GhRef = self.get_json(&ref_url, owner, repo).await?;

        let tree_url = self.repo_url(owner, repo, &["git", "trees", head.object.sha.as_str()]);
        let mut tree_url = Url::parse(&tree_url)?;
        tree_url.query_pairs_mut().append_pair("recursive", "1");
        let tree: GhTree = self.get_json(tree_url.as_str(), owner, repo).await?;

        if tree.truncated {
            tracing::warn!(owner, repo, "GitHub truncated the recursive tree listing");
        }

        let paths: Vec<String> = tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .filter_map(|entry| entry.path)
            .filter(|path| !path.is_empty())
            .collect();

        tracing::debug!(owner, repo, branch = %branch, files = paths.len(), "Fetched GitHub tree");
        Ok(paths)
    }

    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> FileFetch {
        let segments: Vec<&str> = std::iter::once("contents").chain(path.split('/')).collect();
        let url = self.repo_url(owner, repo, &segments);

        // The raw media type returns the file body instead of base64 JSON
        match self.get(&url, "application/vnd.github.raw").await {
            Ok(response) if response.is_success() => FileFetch::Content(response.body),
            Ok(response) => FileFetch::missing(format!("HTTP {}", response.status)),
            Err(err) => FileFetch::missing(err.to_string()),
        }
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<Vec<LanguageInfo>> {
        let url = self.repo_url(owner, repo, &["languages"]);
        let data: BTreeMap<String, u64> = self.get_json(&url, owner, repo).await?;
        Ok(language_percentages(
            data.into_iter().map(|(name, bytes)| (name, bytes as f64)),
        ))
    }

    fn download_url(&self, owner: &str, repo: &str, branch: Option<&str>) -> String {
        let branch = branch.unwrap_or(DEFAULT_BRANCH_GUESS);
        format!(
            "https://github.com/{}/{}/archive/refs/heads/{}.zip",
            owner, repo, branch
        )
    }
}
