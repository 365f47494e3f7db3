// src/repository.rs
// =============================================================================
// Provider-agnostic entry points for the rest of the application.
//
// Every operation takes an optional repository URL. The URL only picks the
// provider (GitHub when it is absent or unrecognized); owner and repo are
// passed separately, usually straight out of parse_repo_url().
//
// On top of the single-call operations there are two composites:
// - validate(url): syntax check, parse, then confirm the repo exists
// - overview(url): metadata, languages, tree and key files in one go
// =============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::{RepoError, Result};
use crate::http::HttpTransport;
use crate::providers::{
    FileFetch, KeyFile, LanguageInfo, ParsedRepo, Provider, ProviderKind, ProviderRegistry,
    RepoInfo,
};
use crate::selector::KeyFileSelector;

const HOSTS: [&str; 2] = ["github.com", "gitlab.com"];

/// A URL that parsed and points at a repository we can see
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedRepo {
    pub owner: String,
    pub repo: String,
    pub provider: ProviderKind,
    pub info: RepoInfo,
}

/// Everything the analysis step needs about one repository
#[derive(Debug, Clone, Serialize)]
pub struct RepoOverview {
    pub provider: ProviderKind,
    pub owner: String,
    pub repo: String,
    pub info: RepoInfo,
    pub languages: Vec<LanguageInfo>,
    /// Number of blobs listed (bounded by provider pagination caps)
    pub file_count: usize,
    pub key_files: Vec<KeyFile>,
    pub download_url: String,
}

/// Checks that the input looks like `{github|gitlab}.com/<namespace>/<name>`.
///
/// Scheme and "www." are optional, one trailing slash is allowed.
pub fn validate_repo_url_syntax(url: &str) -> Result<()> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(RepoError::invalid_url("Please enter a repository URL"));
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    let path = HOSTS
        .iter()
        .find_map(|host| rest.strip_prefix(*host)?.strip_prefix('/'));
    let path = path.map(|p| p.strip_suffix('/').unwrap_or(p));

    let valid = match path.and_then(|p| p.rsplit_once('/')) {
        Some((namespace, name)) => {
            !namespace.is_empty()
                && !name.is_empty()
                && namespace.chars().all(|c| is_name_char(c) || c == '/')
                && name.chars().all(is_name_char)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RepoError::invalid_url(
            "URL must match: {github|gitlab}.com/username/repository",
        ))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

#[derive(Clone)]
pub struct Repositories {
    registry: ProviderRegistry,
    selector: KeyFileSelector,
}

impl Repositories {
    /// Facade backed by a real HTTP client
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            registry: ProviderRegistry::new(config)?,
            selector: KeyFileSelector::new(config.selector.clone()),
        })
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            registry: ProviderRegistry::with_transport(config, transport),
            selector: KeyFileSelector::new(config.selector.clone()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Provider for `url`, GitHub when there is no URL
    pub fn provider_for(&self, url: Option<&str>) -> Arc<dyn Provider> {
        match url {
            Some(url) => self.registry.resolve(url),
            None => self.registry.fallback(),
        }
    }

    pub fn parse_repo_url(&self, url: &str) -> Option<ParsedRepo> {
        self.registry.parse_repo_url(url)
    }

    pub async fn fetch_repo_info(&self, owner: &str, repo: &str, url: Option<&str>) -> Result<RepoInfo> {
        self.provider_for(url).fetch_repo_info(owner, repo).await
    }

    pub async fn fetch_repo_tree(&self, owner: &str, repo: &str, url: Option<&str>) -> Result<Vec<String>> {
        self.provider_for(url).fetch_repo_tree(owner, repo).await
    }

    /// Reads one file; any problem gives ""
    pub async fn fetch_file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        url: Option<&str>,
    ) -> String {
        self.fetch_file(owner, repo, path, url).await.into_content()
    }

    /// Like fetch_file_content, but says whether the file was actually read
    pub async fn fetch_file(&self, owner: &str, repo: &str, path: &str, url: Option<&str>) -> FileFetch {
        self.provider_for(url).fetch_file(owner, repo, path).await
    }

    pub async fn fetch_languages(
        &self,
        owner: &str,
        repo: &str,
        url: Option<&str>,
    ) -> Result<Vec<LanguageInfo>> {
        self.provider_for(url).fetch_languages(owner, repo).await
    }

    /// Picks key files out of `all_paths` and reads them from the repository
    pub async fn fetch_key_files<S: AsRef<str>>(
        &self,
        owner: &str,
        repo: &str,
        all_paths: &[S],
        url: Option<&str>,
    ) -> Vec<KeyFile> {
        let provider = self.provider_for(url);
        self.key_files_from(&provider, owner, repo, all_paths).await
    }

    pub fn get_download_url(&self, owner: &str, repo: &str, url: &str, branch: Option<&str>) -> String {
        self.registry.resolve(url).download_url(owner, repo, branch)
    }

    /// Checks a user-supplied URL end to end: syntax, parse, repo exists
    pub async fn validate(&self, url: &str) -> Result<ValidatedRepo> {
        validate_repo_url_syntax(url)?;
        let parsed = self.parse(url)?;
        let info = parsed.provider.fetch_repo_info(&parsed.owner, &parsed.repo).await?;

        Ok(ValidatedRepo {
            provider: parsed.kind(),
            owner: parsed.owner,
            repo: parsed.repo,
            info,
        })
    }

    /// Gathers metadata, languages, the file tree and key files for a URL
    pub async fn overview(&self, url: &str) -> Result<RepoOverview> {
        let parsed = self.parse(url)?;
        let provider = parsed.provider.clone();
        let (owner, repo) = (parsed.owner.as_str(), parsed.repo.as_str());

        let (info, languages, tree) = tokio::try_join!(
            provider.fetch_repo_info(owner, repo),
            provider.fetch_languages(owner, repo),
            provider.fetch_repo_tree(owner, repo),
        )?;

        let key_files = self.key_files_from(&provider, owner, repo, &tree).await;
        let download_url = provider.download_url(owner, repo, info.default_branch.as_deref());

        tracing::info!(
            provider = %parsed.kind(),
            owner,
            repo,
            files = tree.len(),
            key_files = key_files.len(),
            "Built repository overview"
        );

        Ok(RepoOverview {
            provider: parsed.kind(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            info,
            languages,
            file_count: tree.len(),
            key_files,
            download_url,
        })
    }

    fn parse(&self, url: &str) -> Result<ParsedRepo> {
        self.parse_repo_url(url).ok_or_else(|| {
            RepoError::invalid_url(format!("Could not parse a repository from '{}'", url.trim()))
        })
    }

    async fn key_files_from<S: AsRef<str>>(
        &self,
        provider: &Arc<dyn Provider>,
        owner: &str,
        repo: &str,
        all_paths: &[S],
    ) -> Vec<KeyFile> {
        self.selector
            .fetch_key_files(all_paths, |path| {
                let provider = provider.clone();
                let owner = owner.to_string();
                let repo = repo.to_string();
                async move { provider.fetch_file(&owner, &repo, &path).await }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;
    use crate::http::HttpResponse;

    const GH_REPO: &str = r#"{
        "name": "api",
        "owner": {"login": "acme"},
        "description": "REST backend",
        "stargazers_count": 5,
        "forks_count": 1,
        "language": "TypeScript",
        "html_url": "https://github.com/acme/api",
        "default_branch": "main"
    }"#;

    fn github_fake() -> Arc<FakeTransport> {
        Arc::new(FakeTransport::new(|url| {
            let (status, body) = if url.ends_with("/languages") {
                (200, r#"{"TypeScript": 900, "Shell": 100}"#)
            } else if url.contains("/git/ref/heads/main") {
                (200, r#"{"object": {"sha": "s1"}}"#)
            } else if url.contains("/git/trees/s1") {
                (
                    200,
                    r#"{"tree": [
                        {"path": "package.json", "type": "blob"},
                        {"path": "src/server.ts", "type": "blob"},
                        {"path": "src/utils/math.ts", "type": "blob"},
                        {"path": "README.md", "type": "blob"}
                    ]}"#,
                )
            } else if url.contains("/contents/README.md") {
                (500, "")
            } else if url.contains("/contents/") {
                (200, "file body")
            } else {
                (200, GH_REPO)
            };
            Ok(HttpResponse::new(status, body))
        }))
    }

    fn repositories(transport: Arc<FakeTransport>) -> Repositories {
        let config = Config::default().with_github_token("ghp_test");
        Repositories::with_transport(&config, transport)
    }

    #[test]
    fn test_validate_repo_url_syntax() {
        for ok in [
            "https://github.com/acme/api",
            "http://www.github.com/acme/api/",
            "gitlab.com/group/sub/project",
            "https://gitlab.com/a.b/c-d_e",
        ] {
            assert!(validate_repo_url_syntax(ok).is_ok(), "should accept {}", ok);
        }

        assert_eq!(
            validate_repo_url_syntax("   ").unwrap_err().to_string(),
            "Please enter a repository URL"
        );
        for bad in [
            "acme/api",
            "https://bitbucket.org/acme/api",
            "https://github.com/acme",
            "https://github.com/acme/api/tree/main?x=1",
            "https://github.com/acme/api//",
        ] {
            let err = validate_repo_url_syntax(bad).unwrap_err();
            assert!(err.to_string().starts_with("URL must match"), "should reject {}", bad);
        }
    }

    #[tokio::test]
    async fn test_no_url_means_github() {
        let transport = github_fake();
        let repos = repositories(transport.clone());

        let info = repos.fetch_repo_info("acme", "api", None).await.unwrap();
        assert_eq!(info.language, "TypeScript");
        assert!(transport.requests()[0].url.starts_with("https://api.github.com/repos/acme/api"));
    }

    #[tokio::test]
    async fn test_url_selects_gitlab() {
        let transport = Arc::new(FakeTransport::always(404, ""));
        let repos = repositories(transport.clone());

        let err = repos
            .fetch_repo_info("g", "p", Some("https://gitlab.com/g/p"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GitLab repository not found.");
        assert!(transport.requests()[0].url.starts_with("https://gitlab.com/api/v4/projects/g%2Fp"));
    }

    #[test]
    fn test_get_download_url() {
        let repos = repositories(github_fake());
        assert_eq!(
            repos.get_download_url("a", "b", "https://gitlab.com/a/b", None),
            "https://gitlab.com/a/b/-/archive/main/b-main.zip?ref_type=heads"
        );
        assert_eq!(
            repos.get_download_url("a", "b", "https://example.org/a/b", Some("dev")),
            "https://github.com/a/b/archive/refs/heads/dev.zip"
        );
    }

    #[tokio::test]
    async fn test_fetch_file_content_never_fails() {
        let repos = repositories(github_fake());
        assert_eq!(repos.fetch_file_content("acme", "api", "README.md", None).await, "");
        assert!(!repos.fetch_file("acme", "api", "README.md", None).await.is_content());
        assert_eq!(
            repos.fetch_file_content("acme", "api", "src/server.ts", None).await,
            "file body"
        );
    }

    #[tokio::test]
    async fn test_fetch_key_files() {
        let repos = repositories(github_fake());
        let tree = repos.fetch_repo_tree("acme", "api", None).await.unwrap();

        let files = repos.fetch_key_files("acme", "api", &tree, None).await;
        let got: Vec<(&str, &str)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.content.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("package.json", "file body"),
                ("src/server.ts", "file body"),
                ("README.md", ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_validate() {
        let repos = repositories(github_fake());
        let validated = repos.validate("https://github.com/acme/api").await.unwrap();
        assert_eq!(validated.owner, "acme");
        assert_eq!(validated.repo, "api");
        assert_eq!(validated.provider, ProviderKind::GitHub);
        assert_eq!(validated.info.stars, 5);
    }

    #[tokio::test]
    async fn test_validate_rejects_before_network() {
        let transport = github_fake();
        let repos = repositories(transport.clone());

        let err = repos.validate("acme/api").await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidUrl(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_validate_missing_repo() {
        let repos = repositories(Arc::new(FakeTransport::always(404, "")));
        let err = repos.validate("https://github.com/acme/ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_overview() {
        let repos = repositories(github_fake());
        let overview = repos.overview("acme/api").await.unwrap();

        assert_eq!(overview.provider, ProviderKind::GitHub);
        assert_eq!(overview.info.name, "api");
        assert_eq!(overview.file_count, 4);
        assert_eq!(overview.languages[0].name, "TypeScript");
        assert_eq!(overview.languages[0].percentage, 90);
        assert_eq!(overview.key_files.len(), 3);
        assert_eq!(
            overview.download_url,
            "https://github.com/acme/api/archive/refs/heads/main.zip"
        );
    }

    #[tokio::test]
    async fn test_overview_without_token_is_config_error() {
        let transport = github_fake();
        let repos = Repositories::with_transport(&Config::default(), transport.clone());

        let err = repos.overview("acme/api").await.unwrap_err();
        assert!(matches!(err, RepoError::Config(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_overview_unparseable_url() {
        let repos = repositories(github_fake());
        let err = repos.overview("not a repo").await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidUrl(_)));
    }
}
