// src/http/mod.rs
// =============================================================================
// The HTTP seam between providers and the network.
//
// Providers never talk to reqwest directly. They ask an HttpTransport for a
// URL and get back the status plus the body text, which keeps them testable
// with canned responses (see testing.rs).
//
// Rust concepts:
// - Traits as interfaces: HttpTransport is implemented by the real client
//   and by the test double
// - async-trait: lets a trait have async methods and still be used as
//   `dyn HttpTransport`
// - Arc: shares one transport between both providers
// =============================================================================

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::HttpConfig;
use crate::error::Result;

/// A response with its body already read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase for the status ("Not Found", "Internal Server Error"...)
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();

        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Anything that can perform a GET request
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse>;
}

/// The real transport, backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse> {
        tracing::debug!(url, "GET");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(HttpResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(HttpResponse::new(404, "").status_text, "Not Found");
        assert_eq!(HttpResponse::new(500, "").status_text, "Internal Server Error");
        assert_eq!(HttpResponse::new(299, "").status_text, "Unknown Status");
    }

    #[test]
    fn test_is_success() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_json() {
        let response = HttpResponse::new(200, r#"{"name":"repo"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "repo");

        let broken = HttpResponse::new(200, "<html>");
        assert!(broken.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(ReqwestTransport::new(&HttpConfig::default()).is_ok());
    }
}
