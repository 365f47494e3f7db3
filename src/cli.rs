// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every subcommand takes a repository URL. Credentials and API bases are
// global options that can also come from the environment (clap's `env`
// feature), and main.rs loads a .env file before parsing, so the order of
// precedence is: flag > environment variable > .env > built-in default.
//
// Rust concepts:
// - Derive macros: Parser / Subcommand / Args generate the parsing code
// - global = true: an option accepted before or after the subcommand
// - Option<T>: "the user may or may not have given this"
// =============================================================================

use clap::{Args, Parser, Subcommand};

use repo_lens::Config;

#[derive(Parser, Debug)]
#[command(
    name = "repo-lens",
    version,
    about = "Inspect GitHub and GitLab repositories through their REST APIs",
    long_about = "repo-lens reads repository metadata, languages and file trees from GitHub \
                  or GitLab, and picks the handful of files that best describe a project's \
                  architecture."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Print JSON instead of a human-readable table
    #[arg(long, global = true)]
    pub json: bool,

    /// GitHub token (required for GitHub API calls)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitLab token (optional, raises rate limits)
    #[arg(long, global = true, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// Override the GitHub API base URL
    #[arg(long, global = true, env = "REPO_LENS_GITHUB_API")]
    pub github_api: Option<String>,

    /// Override the GitLab API base URL
    #[arg(long, global = true, env = "REPO_LENS_GITLAB_API")]
    pub gitlab_api: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which provider, owner and repo a URL resolves to (no network)
    ///
    /// Example: repo-lens parse https://gitlab.com/group/sub/project
    Parse { url: String },

    /// Check that a URL is well-formed and the repository exists
    Validate { url: String },

    /// Repository metadata: description, stars, forks, primary language
    Info { url: String },

    /// List every file on the default branch
    Tree { url: String },

    /// Language breakdown in percent
    Languages { url: String },

    /// Pick the architecture-revealing files and print their contents
    KeyFiles { url: String },

    /// Print the zip archive URL for a branch
    ///
    /// Example: repo-lens download-url octocat/hello --branch dev
    DownloadUrl {
        url: String,

        /// Branch name; defaults to "main"
        #[arg(long)]
        branch: Option<String>,
    },

    /// Everything at once: info, languages, file count and key files
    Overview { url: String },
}

impl Commands {
    pub fn url(&self) -> &str {
        match self {
            Commands::Parse { url }
            | Commands::Validate { url }
            | Commands::Info { url }
            | Commands::Tree { url }
            | Commands::Languages { url }
            | Commands::KeyFiles { url }
            | Commands::DownloadUrl { url, .. }
            | Commands::Overview { url } => url,
        }
    }
}

impl GlobalArgs {
    /// Builds the library config; empty values count as not given
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(token) = non_empty(&self.github_token) {
            config.github.token = Some(token);
        }
        if let Some(token) = non_empty(&self.gitlab_token) {
            config.gitlab.token = Some(token);
        }
        if let Some(api) = non_empty(&self.github_api) {
            config.github.api_base = api;
        }
        if let Some(api) = non_empty(&self.gitlab_api) {
            config.gitlab.api_base = api;
        }
        config
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_lens::config::DEFAULT_GITLAB_API;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_subcommand_and_url() {
        let cli = parse(&["repo-lens", "info", "https://github.com/a/b"]);
        assert!(matches!(cli.command, Commands::Info { .. }));
        assert_eq!(cli.command.url(), "https://github.com/a/b");
        assert!(!cli.global.json);
    }

    #[test]
    fn test_json_flag_after_subcommand() {
        let cli = parse(&["repo-lens", "languages", "a/b", "--json"]);
        assert!(cli.global.json);
    }

    #[test]
    fn test_download_url_branch() {
        let cli = parse(&["repo-lens", "download-url", "a/b", "--branch", "dev"]);
        match cli.command {
            Commands::DownloadUrl { url, branch } => {
                assert_eq!(url, "a/b");
                assert_eq!(branch.as_deref(), Some("dev"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "repo-lens",
            "--github-token",
            "ghp_flag",
            "--gitlab-api",
            "https://gitlab.example.com/api/v4",
            "tree",
            "a/b",
        ]);
        let config = cli.global.to_config();
        assert_eq!(config.github.token.as_deref(), Some("ghp_flag"));
        assert_eq!(config.gitlab.api_base, "https://gitlab.example.com/api/v4");
    }

    #[test]
    fn test_blank_flag_keeps_default() {
        let cli = parse(&["repo-lens", "--gitlab-api", "  ", "tree", "a/b"]);
        assert_eq!(cli.global.to_config().gitlab.api_base, DEFAULT_GITLAB_API);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(Cli::try_parse_from(["repo-lens", "overview"]).is_err());
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[command(flatten)]?
//    - It pulls the fields of GlobalArgs into Cli as if they were written
//      there, while keeping them in their own struct we can pass around
//
// 2. What does env = "GITHUB_TOKEN" do?
//    - If --github-token is not given, clap reads the variable instead
//    - hide_env_values keeps the token out of --help output
//
// 3. Why a url() helper on Commands?
//    - Every variant carries a URL; one match arm with `|` patterns saves
//      repeating the same destructuring at each call site
// -----------------------------------------------------------------------------
