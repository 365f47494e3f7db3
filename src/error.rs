// src/error.rs
// =============================================================================
// Errors returned by the library.
//
// Every structural failure falls into one of a few kinds:
// - Config:     a required token is missing (raised before any request)
// - NotFound:   the repository does not exist or is private
// - Api:        any other non-success response from a provider
// - Http:       the request never got a response (DNS, TLS, timeout...)
// - Decode:     the provider answered with JSON we could not understand
// - InvalidUrl: the input does not look like a repository URL
//
// Single-file content fetches never produce these; they degrade to an
// empty string instead (see providers::FileFetch).
//
// Rust concepts:
// - thiserror: derives Display and std::error::Error from attributes
// - Type aliases: Result<T> saves repeating the error type everywhere
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    /// A required credential is not configured
    #[error("{0}")]
    Config(String),

    /// Repository does not exist or is not visible to us
    #[error("{0}")]
    NotFound(String),

    /// Provider answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network-level failure before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body did not have the expected shape
    #[error("Unexpected response from provider: {0}")]
    Decode(String),

    /// Input is not a repository URL we understand
    #[error("{0}")]
    InvalidUrl(String),
}

impl RepoError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    /// True for errors the user can fix by changing the URL they typed
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidUrl(_))
    }

    /// HTTP status carried by the error, if the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RepoError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<url::ParseError> for RepoError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("Invalid API base URL: {}", err))
    }
}

/// Result type used across the library
pub type Result<T> = std::result::Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = RepoError::not_found("Repository not found: a/b. Make sure it exists and is public.");
        assert_eq!(
            err.to_string(),
            "Repository not found: a/b. Make sure it exists and is public."
        );

        let err = RepoError::api(500, "GitLab API error: Internal Server Error");
        assert_eq!(err.to_string(), "GitLab API error: Internal Server Error");
    }

    #[test]
    fn test_is_not_found() {
        assert!(RepoError::not_found("x").is_not_found());
        assert!(RepoError::invalid_url("x").is_not_found());
        assert!(!RepoError::config("x").is_not_found());
        assert!(!RepoError::api(502, "x").is_not_found());
    }

    #[test]
    fn test_status() {
        assert_eq!(RepoError::api(502, "bad gateway").status(), Some(502));
        assert_eq!(RepoError::not_found("gone").status(), Some(404));
        assert_eq!(RepoError::Http("dns".into()).status(), None);
    }

    #[test]
    fn test_json_error_becomes_decode() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: RepoError = parse.unwrap_err().into();
        assert!(matches!(err, RepoError::Decode(_)));
    }
}
