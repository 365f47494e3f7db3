// src/output.rs
// =============================================================================
// Rendering for the CLI: either pretty JSON or a plain-text table.
//
// Each render_* function builds a String instead of printing directly, so
// the layout can be tested without capturing stdout. emit() picks the
// format and prints.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use repo_lens::{KeyFile, LanguageInfo, ParsedRepo, RepoInfo, RepoOverview, ValidatedRepo};

const RULE_WIDTH: usize = 72;

/// Prints `value` as JSON, or through `render` as text
pub fn emit<T, F>(value: &T, json: bool, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

/// JSON shape for `parse`; ParsedRepo itself holds a provider handle
#[derive(Debug, Serialize)]
pub struct ParsedView<'a> {
    pub provider: repo_lens::ProviderKind,
    pub owner: &'a str,
    pub repo: &'a str,
}

impl<'a> From<&'a ParsedRepo> for ParsedView<'a> {
    fn from(parsed: &'a ParsedRepo) -> Self {
        Self {
            provider: parsed.kind(),
            owner: &parsed.owner,
            repo: &parsed.repo,
        }
    }
}

pub fn render_parsed(parsed: &ParsedView<'_>) -> String {
    format!(
        "Provider: {}\nOwner:    {}\nRepo:     {}\n",
        parsed.provider, parsed.owner, parsed.repo
    )
}

pub fn render_info(info: &RepoInfo) -> String {
    let description = if info.description.is_empty() {
        "(no description)"
    } else {
        info.description.as_str()
    };

    let mut out = String::new();
    out.push_str(&format!("{}/{}\n", info.owner, info.name));
    out.push_str(&format!("  {}\n", description));
    out.push_str(&format!("  URL:      {}\n", info.url));
    out.push_str(&format!("  Language: {}\n", info.language));
    out.push_str(&format!("  Stars:    {}\n", info.stars));
    out.push_str(&format!("  Forks:    {}\n", info.forks));
    if let Some(branch) = &info.default_branch {
        out.push_str(&format!("  Branch:   {}\n", branch));
    }
    out
}

pub fn render_validated(validated: &ValidatedRepo) -> String {
    format!(
        "✅ {} repository {}/{} is reachable\n\n{}",
        validated.provider,
        validated.owner,
        validated.repo,
        render_info(&validated.info)
    )
}

pub fn render_tree(paths: &[String]) -> String {
    let mut out = String::new();
    for path in paths {
        out.push_str(path);
        out.push('\n');
    }
    out.push_str(&format!("\n📋 Total: {} file(s)\n", paths.len()));
    out
}

pub fn render_languages(languages: &[LanguageInfo]) -> String {
    if languages.is_empty() {
        return "No language data\n".to_string();
    }

    let mut out = format!("{:<30} {:>8}\n", "LANGUAGE", "PERCENT");
    out.push_str(&format!("{}\n", "=".repeat(39)));
    for language in languages {
        out.push_str(&format!(
            "{:<30} {:>7}%\n",
            ellipsize(&language.name, 30),
            language.percentage
        ));
    }
    out
}

pub fn render_key_files(files: &[KeyFile]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
        out.push_str(&format!("📄 {} ({} chars)\n", file.path, file.content.chars().count()));
        out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));
        if file.content.is_empty() {
            out.push_str("(empty or unavailable)\n");
        } else {
            out.push_str(&file.content);
            if !file.content.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out.push_str(&format!("\n📋 {} key file(s)\n", files.len()));
    out
}

pub fn render_overview(overview: &RepoOverview) -> String {
    let mut out = format!("Provider: {}\n", overview.provider);
    out.push_str(&render_info(&overview.info));
    out.push('\n');
    out.push_str(&render_languages(&overview.languages));
    out.push('\n');

    out.push_str(&format!("{:<60} {:>10}\n", "KEY FILE", "CHARS"));
    out.push_str(&format!("{}\n", "=".repeat(71)));
    for file in &overview.key_files {
        out.push_str(&format!(
            "{:<60} {:>10}\n",
            ellipsize(&file.path, 60),
            file.content.chars().count()
        ));
    }

    out.push('\n');
    out.push_str("📊 Summary:\n");
    out.push_str(&format!("   📋 Files:     {}\n", overview.file_count));
    out.push_str(&format!("   📄 Key files: {}\n", overview.key_files.len()));
    out.push_str(&format!("   📦 Download:  {}\n", overview.download_url));
    out
}

/// Shortens `text` to `width` characters, ending in "..." when cut
fn ellipsize(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
