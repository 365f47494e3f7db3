// src/main.rs
// =============================================================================
// Entry point of the repo-lens CLI.
//
// What happens here:
// 1. Load a .env file if there is one (tokens usually live there)
// 2. Set up logging to stderr, so --json output on stdout stays clean
// 3. Parse command-line arguments and build the library Config
// 4. Dispatch to the subcommand handler and print the result
// 5. Exit with a code: 0 = success, 1 = not found / bad URL, 2 = other error
//
// Rust concepts used:
// - anyhow::Result for application code, RepoError for the library
// - downcast_ref: look inside an anyhow::Error for the library error type
// =============================================================================

mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use output::ParsedView;
use repo_lens::{ParsedRepo, RepoError, Repositories};

#[tokio::main]
async fn main() {
    // A missing .env is fine; the environment may already hold the tokens
    dotenvy::dotenv().ok();
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for(&e)
        }
    };

    std::process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("repo_lens=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 1 for "that repository does not exist / is not a repository URL", else 2
fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RepoError>() {
        Some(e) if e.is_not_found() => 1,
        _ => 2,
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let json = cli.global.json;
    let config = cli.global.to_config();
    let repos = Repositories::new(&config).context("Failed to set up the HTTP client")?;

    match cli.command {
        Commands::Parse { url } => handle_parse(&repos, &url, json),
        Commands::Validate { url } => {
            let validated = repos.validate(&url).await?;
            output::emit(&validated, json, output::render_validated)?;
            Ok(0)
        }
        Commands::Info { url } => {
            let parsed = parse(&repos, &url)?;
            let info = repos
                .fetch_repo_info(&parsed.owner, &parsed.repo, Some(&url))
                .await?;
            output::emit(&info, json, output::render_info)?;
            Ok(0)
        }
        Commands::Tree { url } => {
            let parsed = parse(&repos, &url)?;
            let paths = repos
                .fetch_repo_tree(&parsed.owner, &parsed.repo, Some(&url))
                .await?;
            output::emit(paths.as_slice(), json, output::render_tree)?;
            Ok(0)
        }
        Commands::Languages { url } => {
            let parsed = parse(&repos, &url)?;
            let languages = repos
                .fetch_languages(&parsed.owner, &parsed.repo, Some(&url))
                .await?;
            output::emit(languages.as_slice(), json, output::render_languages)?;
            Ok(0)
        }
        Commands::KeyFiles { url } => handle_key_files(&repos, &url, json).await,
        Commands::DownloadUrl { url, branch } => {
            let parsed = parse(&repos, &url)?;
            let download = repos.get_download_url(&parsed.owner, &parsed.repo, &url, branch.as_deref());
            output::emit(&download, json, |d| format!("{}\n", d))?;
            Ok(0)
        }
        Commands::Overview { url } => {
            tracing::info!(url = %url, "Building repository overview");
            let overview = repos.overview(&url).await?;
            output::emit(&overview, json, output::render_overview)?;
            Ok(0)
        }
    }
}

fn parse(repos: &Repositories, url: &str) -> Result<ParsedRepo> {
    let parsed = repos.parse_repo_url(url).ok_or_else(|| {
        RepoError::invalid_url(format!("Could not parse a repository from '{}'", url.trim()))
    })?;
    tracing::debug!(provider = %parsed.kind(), owner = %parsed.owner, repo = %parsed.repo, "Parsed URL");
    Ok(parsed)
}

// `parse` is the only command that needs no network access
fn handle_parse(repos: &Repositories, url: &str, json: bool) -> Result<i32> {
    let parsed = parse(repos, url)?;
    output::emit(&ParsedView::from(&parsed), json, output::render_parsed)?;
    Ok(0)
}

async fn handle_key_files(repos: &Repositories, url: &str, json: bool) -> Result<i32> {
    let parsed = parse(repos, url)?;
    let paths = repos
        .fetch_repo_tree(&parsed.owner, &parsed.repo, Some(url))
        .await
        .context("Failed to list repository files")?;
    tracing::info!(files = paths.len(), "Fetched file tree");

    let files = repos
        .fetch_key_files(&parsed.owner, &parsed.repo, &paths, Some(url))
        .await;
    output::emit(files.as_slice(), json, output::render_key_files)?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let not_found = anyhow::Error::new(RepoError::not_found("gone"));
        assert_eq!(exit_code_for(&not_found), 1);

        let bad_url = anyhow::Error::new(RepoError::invalid_url("nope"));
        assert_eq!(exit_code_for(&bad_url), 1);

        let api = anyhow::Error::new(RepoError::api(500, "GitHub API error: Internal Server Error"));
        assert_eq!(exit_code_for(&api), 2);

        let other = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&other), 2);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let wrapped: Result<()> = Err(RepoError::not_found("gone")).context("Failed to list repository files");
        assert_eq!(exit_code_for(&wrapped.unwrap_err()), 1);
    }
}
