// Scripted HttpTransport for unit tests: a closure decides the response for
// each URL, and every request is recorded for later assertions.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{HttpResponse, HttpTransport};
use crate::error::Result;

type Handler = Box<dyn Fn(&str) -> Result<HttpResponse> + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) struct FakeTransport {
    handler: Handler,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with the same status and body
    pub fn always(status: u16, body: &'static str) -> Self {
        Self::new(move |_| Ok(HttpResponse::new(status, body)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        });
        (self.handler)(url)
    }
}
