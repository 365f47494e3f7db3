// src/providers/registry.rs
// =============================================================================
// Picks the provider for a URL.
//
// The registry holds a fixed, ordered list: GitHub first, GitLab second.
// It is built once and never changes afterwards, so it can be shared freely.
//
// Dispatch rules:
// - resolve(url): first provider whose detect() matches; GitHub otherwise
// - parse_repo_url(url): try each detecting provider's parser in order, and
//   if none succeeds fall back to GitHub's parser ("owner/repo" shorthand
//   carries no domain to detect)
// =============================================================================

use std::fmt;
use std::sync::Arc;

use super::{GitHubProvider, GitLabProvider, Provider, ProviderKind};
use crate::config::Config;
use crate::error::Result;
use crate::http::{HttpTransport, ReqwestTransport};

/// owner/repo plus the provider that understood the URL
#[derive(Clone)]
pub struct ParsedRepo {
    pub owner: String,
    pub repo: String,
    pub provider: Arc<dyn Provider>,
}

impl ParsedRepo {
    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }
}

impl fmt::Debug for ParsedRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedRepo")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("provider", &self.kind())
            .finish()
    }
}

#[derive(Clone)]
pub struct ProviderRegistry {
    // never empty; index 0 is the fallback
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Registry backed by a real HTTP client
    pub fn new(config: &Config) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.http)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Registry whose providers share the given transport
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        let providers: Vec<Arc<dyn Provider>> = vec![
            Arc::new(GitHubProvider::new(&config.github, transport.clone())),
            Arc::new(GitLabProvider::new(&config.gitlab, transport)),
        ];
        Self { providers }
    }

    /// The provider used when nothing else matches (GitHub)
    pub fn fallback(&self) -> Arc<dyn Provider> {
        self.providers[0].clone()
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn Provider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    pub fn resolve(&self, url: &str) -> Arc<dyn Provider> {
        self.providers
            .iter()
            .find(|p| p.detect(url))
            .cloned()
            .unwrap_or_else(|| self.fallback())
    }

    pub fn parse_repo_url(&self, url: &str) -> Option<ParsedRepo> {
        let detected = self
            .providers
            .iter()
            .filter(|p| p.detect(url))
            .find_map(|p| parse_with(p, url));

        detected.or_else(|| parse_with(&self.fallback(), url))
    }
}

fn parse_with(provider: &Arc<dyn Provider>, url: &str) -> Option<ParsedRepo> {
    let parsed = provider.parse_url(url)?;
    Some(ParsedRepo {
        owner: parsed.owner,
        repo: parsed.repo,
        provider: provider.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeTransport;

    fn registry() -> ProviderRegistry {
        let transport = Arc::new(FakeTransport::always(500, ""));
        ProviderRegistry::with_transport(&Config::default(), transport)
    }

    fn parsed(url: &str) -> Option<(String, String, ProviderKind)> {
        registry()
            .parse_repo_url(url)
            .map(|p| (p.owner.clone(), p.repo.clone(), p.kind()))
    }

    #[test]
    fn test_resolve() {
        let r = registry();
        assert_eq!(r.resolve("https://github.com/a/b").kind(), ProviderKind::GitHub);
        assert_eq!(r.resolve("https://gitlab.com/a/b").kind(), ProviderKind::GitLab);
    }

    #[test]
    fn test_resolve_unknown_domain_defaults_to_github() {
        let r = registry();
        assert_eq!(r.resolve("https://bitbucket.org/a/b").kind(), ProviderKind::GitHub);
        assert_eq!(r.resolve("a/b").kind(), ProviderKind::GitHub);
        assert_eq!(r.resolve("").kind(), ProviderKind::GitHub);
    }

    #[test]
    fn test_parse_repo_url_all_github_forms_agree() {
        let expected = Some(("octo".to_string(), "cat".to_string(), ProviderKind::GitHub));
        for url in [
            "https://github.com/octo/cat",
            "https://www.github.com/octo/cat/",
            "github.com/octo/cat.git",
            "octo/cat",
        ] {
            assert_eq!(parsed(url), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_parse_repo_url_gitlab() {
        assert_eq!(
            parsed("https://gitlab.com/group/sub/proj"),
            Some(("group/sub".to_string(), "proj".to_string(), ProviderKind::GitLab))
        );
    }

    #[test]
    fn test_parse_repo_url_falls_back_to_github_parser() {
        // detected by GitLab, but GitLab's parser has no repo segment; the
        // GitHub fallback then rejects the dotted owner
        assert!(parsed("gitlab.com/onlygroup").is_none());
        assert!(parsed("example.com/x").is_none());
        assert!(parsed("nonsense").is_none());
    }

    #[test]
    fn test_get_by_kind() {
        let r = registry();
        assert_eq!(r.get(ProviderKind::GitLab).unwrap().kind(), ProviderKind::GitLab);
        assert_eq!(r.fallback().kind(), ProviderKind::GitHub);
    }
}
