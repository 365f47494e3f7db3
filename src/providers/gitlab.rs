// src/providers/gitlab.rs
// =============================================================================
// GitLab provider (REST API v4), called directly over HTTP.
//
// - The token is optional; when present it goes in the PRIVATE-TOKEN header
//   (private projects, higher rate limits)
// - Projects are addressed by their full path, URL-encoded as one segment:
//   "group/subgroup/project" -> "group%2Fsubgroup%2Fproject"
// - The tree endpoint is paginated; we walk pages one after another and
//   stop at the first empty page or at the page cap
// - GitLab has no single "primary language" on a project, so
//   RepoInfo.language is always "Unknown"
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
use crate::config::{GitLabConfig, DEFAULT_BRANCH_GUESS};
use crate::error::{RepoError, Result};
use crate::http::{HttpResponse, HttpTransport};

const DOMAIN: &str = "gitlab.com";

#[derive(Debug, Deserialize)]
struct GlProject {
    name: String,
    namespace: GlNamespace,
    description: Option<String>,
    #[serde(default)]
    star_count: u64,
    #[serde(default)]
    forks_count: u64,
    web_url: String,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlNamespace {
    path: String,
}

#[derive(Debug, Deserialize)]
struct GlTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

pub struct GitLabProvider {
    transport: Arc<dyn HttpTransport>,
    token: Option<String>,
    api_base: String,
    page_size: u32,
    max_pages: u32,
    action_path_marker: String,
}

impl GitLabProvider {
    pub fn new(config: &GitLabConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            token: config.token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages,
            action_path_marker: config.action_path_marker.clone(),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        match &self.token {
            Some(token) => vec![("PRIVATE-TOKEN", token.clone())],
            None => Vec::new(),
        }
    }

    /// /projects/{owner%2Frepo} followed by `rest` (already encoded)
    fn project_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        let id = format!("{}/{}", owner, repo);
        format!(
            "{}/projects/{}{}",
            self.api_base,
            urlencoding::encode(&id),
            rest
        )
    }

    /// GET that turns any non-2xx status into an error
    async fn request(&self, url: &str) -> Result<HttpResponse> {
        let response = self.transport.get(url, &self.headers()).await?;

        if response.is_success() {
            Ok(response)
        } else if response.status == 404 {
            Err(RepoError::not_found("GitLab repository not found."))
        } else {
            Err(RepoError::api(
                response.status,
                format!("GitLab API error: {}", response.status_text),
            ))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request(url).await?.json()
    }

    async fn get_project(&self, owner: &str, repo: &str) -> Result<GlProject> {
        let url = self.project_url(owner, repo, "");
        self.get_json(&url).await
    }

    fn tree_page_url(&self, owner: &str, repo: &str, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.project_url(owner, repo, "/repository/tree"))?;
        url.query_pairs_mut()
            .append_pair("recursive", "true")
            .append_pair("per_page", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn read_raw_file(&self, owner: &str, repo: &str, path: &str) -> Result<FileFetch> {
        let project = self.get_project(owner, repo).await?;
        let branch = project
            .default_branch
            .unwrap_or_else(|| DEFAULT_BRANCH_GUESS.to_string());

        let rest = format!("/repository/files/{}/raw", urlencoding::encode(path));
        let mut url = Url::parse(&self.project_url(owner, repo, &rest))?;
        url.query_pairs_mut().append_pair("ref", &branch);

        let response = self.transport.get(url.as_str(), &self.headers()).await?;
        if response.is_success() {
            Ok(FileFetch::Content(response.body))
        } else {
            Ok(FileFetch::missing(format!("HTTP {}", response.status)))
        }
    }
}

#[async_trait]
impl Provider for GitLabProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitLab
    }

    fn detect(&self, url: &str) -> bool {
        url.contains(DOMAIN)
    }

    fn parse_url(&self, url: &str) -> Option<RepoRef> {
        let cleaned = clean_url(url);

        // Everything after "gitlab.com/" up to the last segment is the
        // namespace, which may be a chain of groups.
        let start = cleaned.find("gitlab.com/")? + "gitlab.com/".len();
        let (namespace, repo) = cleaned[start..].rsplit_once('/')?;

        // ".../-/tree/main" style action paths are not part of the namespace
        let owner = match self.action_path_marker.as_str() {
            "" => namespace,
            marker => namespace.split(marker).next().unwrap_or(namespace),
        };
        let repo = strip_git_suffix(repo);

        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(RepoRef::new(owner, repo))
    }

    async fn fetch_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo> {
        let data = self.get_project(owner, repo).await?;

        Ok(RepoInfo {
            name: data.name,
            owner: data.namespace.path,
            description: data.description.unwrap_or_default(),
            stars: data.star_count,
            forks: data.forks_count,
            language: "Unknown".to_string(),
            url: data.web_url,
            default_branch: data.default_branch,
        })
    }

    async fn fetch_repo_tree(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for page in 1..=self.max_pages {
            let url = self.tree_page_url(owner, repo, page)?;
            let entries: Vec<GlTreeEntry> = self.get_json(url.as_str()).await?;
            tracing::debug!(owner, repo, page, entries = entries.len(), "Fetched GitLab tree page");

            if entries.is_empty() {
                return Ok(files);
            }

            files.extend(
                entries
                    .into_iter()
                    .filter(|entry| entry.kind == "blob")
                    .map(|entry| entry.path),
            );
        }

        tracing::warn!(
            owner,
            repo,
            max_pages = self.max_pages,
            files = files.len(),
            "Stopped GitLab tree listing at the page cap"
        );
        Ok(files)
    }

    async fn fetch_file(&self, owner: &str, repo: &str, path: &str) -> FileFetch {
        match self.read_raw_file(owner, repo, path).await {
            Ok(fetch) => fetch,
            Err(err) => FileFetch::missing(err.to_string()),
        }
    }

    async fn fetch_languages(&self, owner: &str, repo: &str) -> Result<Vec<LanguageInfo>> {
        // GitLab reports shares (e.g. {"Rust": 80.5, "Shell": 19.5})
        let url = self.project_url(owner, repo, "/languages");
        let data: BTreeMap<String, f64> = self.get_json(&url).await?;
        Ok(language_percentages(data))
    }

    fn download_url(&self, owner: &str, repo: &str, branch: Option<&str>) -> String {
        let branch = branch.unwrap_or(DEFAULT_BRANCH_GUESS);
        format!(
            "https://gitlab.com/{}/{}/-/archive/{}/{}-{}.zip?ref_type=heads",
            owner, repo, branch, repo, branch
        )
    }
}
