// src/lib.rs
// =============================================================================
// repo-lens: read GitHub and GitLab repositories through one interface.
//
// Modules:
// - config:     settings (tokens, API bases, limits), no global state
// - error:      the RepoError type shared by every module
// - http:       the HTTP transport seam (reqwest in production)
// - providers:  GitHub / GitLab clients and the registry that picks one
// - selector:   picks and reads the files that reveal a repo's architecture
// - repository: the facade the CLI (or any other caller) talks to
// =============================================================================

pub mod config;
pub mod error;
pub mod http;
pub mod providers;
pub mod repository;
pub mod selector;

pub use config::Config;
pub use error::{RepoError, Result};
pub use providers::{
    FileFetch, KeyFile, LanguageInfo, ParsedRepo, Provider, ProviderKind, ProviderRegistry,
    RepoInfo,
};
pub use repository::{validate_repo_url_syntax, RepoOverview, Repositories, ValidatedRepo};
pub use selector::KeyFileSelector;
