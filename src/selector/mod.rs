// src/selector/mod.rs
// =============================================================================
// Key-file selection: pick a small, architecture-revealing slice of a
// repository and read it.
//
// How it works:
// 1. Walk the path list in order and classify each path:
//    - manifest/config file name            -> selected (Manifest)
//    - extension not a source extension     -> rejected
//    - path mentions a routing keyword      -> selected (Route)
//    - path mentions an architecture keyword -> selected (Architecture)
//    - anything else                        -> rejected
// 2. Keep the first `max_files` selected paths; the rest are dropped
// 3. Fetch them concurrently, each with its own timeout
// 4. Put results back in selection order and cut each to `max_chars`
//
// The selector does not know which provider it is reading from; it only
// gets a function that turns a path into a FileFetch.
//
// Rust concepts:
// - Generic async closures: F: Fn(String) -> Fut where Fut: Future
// - buffer_unordered: run up to N futures at once
// - tokio::time::timeout: give up on a future after a deadline
// =============================================================================

mod patterns;

pub use patterns::{ARCHITECTURE_KEYWORDS, CODE_EXTENSIONS, KEY_FILE_NAMES, ROUTE_KEYWORDS};

use std::future::Future;

use futures::stream::{self, StreamExt};

use crate::config::SelectorConfig;
use crate::providers::{FileFetch, KeyFile};

/// Why a path was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Manifest,
    Route,
    Architecture,
}

/// Classifies one path; None means "not a key file"
pub fn classify(path: &str) -> Option<Selection> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let path_lower = path.to_lowercase();
    let name_lower = file_name.to_lowercase();

    let is_manifest = KEY_FILE_NAMES.iter().any(|pattern| {
        let pattern = pattern.to_lowercase();
        name_lower == pattern || path_lower.ends_with(&pattern)
    });
    if is_manifest {
        return Some(Selection::Manifest);
    }

    let extension = name_lower.rsplit_once('.').map(|(_, ext)| ext)?;
    if !CODE_EXTENSIONS.contains(&extension) {
        return None;
    }

    if ROUTE_KEYWORDS
        .iter()
        .any(|k| path_lower.contains(k) || name_lower.contains(k))
    {
        return Some(Selection::Route);
    }

    if ARCHITECTURE_KEYWORDS.iter().any(|k| path_lower.contains(k)) {
        return Some(Selection::Architecture);
    }

    None
}

/// Keeps at most `max_chars` characters (not bytes) of `content`
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &content[..byte_index],
        None => content,
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyFileSelector {
    config: SelectorConfig,
}

impl KeyFileSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Selected paths in input order, capped at `max_files`
    pub fn select<'a, S: AsRef<str>>(&self, paths: &'a [S]) -> Vec<&'a str> {
        paths
            .iter()
            .map(<S as AsRef<str>>::as_ref)
            .filter(|path| classify(path).is_some())
            .take(self.config.max_files)
            .collect()
    }

    /// Selects key files from `paths` and reads them with `fetch`.
    ///
    /// A file that fails or times out comes back with empty content; the
    /// batch itself never fails.
    pub async fn fetch_key_files<S, F, Fut>(&self, paths: &[S], fetch: F) -> Vec<KeyFile>
    where
        S: AsRef<str>,
        F: Fn(String) -> Fut,
        Fut: Future<Output = FileFetch>,
    {
        let selected = self.select(paths);
        tracing::debug!(
            candidates = paths.len(),
            selected = selected.len(),
            "Selected key files"
        );

        let timeout = self.config.fetch_timeout;
        let tasks = selected.iter().enumerate().map(|(index, path)| {
            let pending = fetch(path.to_string());
            async move {
                let outcome = match tokio::time::timeout(timeout, pending).await {
                    Ok(outcome) => outcome,
                    Err(_) => FileFetch::missing(format!("timed out after {:?}", timeout)),
                };
                (index, outcome)
            }
        });

        // Completion order is arbitrary; the index restores input order
        let mut results: Vec<(usize, FileFetch)> = stream::iter(tasks)
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);

        results
            .into_iter()
            .map(|(index, outcome)| {
                let path = selected[index];
                if let FileFetch::Missing(reason) = &outcome {
                    tracing::warn!(path, reason = %reason, "Could not read key file");
                }
                let content = outcome.into_content();
                KeyFile {
                    path: path.to_string(),
                    content: truncate_chars(&content, self.config.max_chars).to_string(),
                }
            })
            .collect()
    }
}
