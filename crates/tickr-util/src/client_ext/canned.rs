use super::fetch::ClientFetchExt;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::trace;
use url::Url;

/// An offline stand-in for [`reqwest::Client`]; GET requests are answered from a
/// table of canned replies keyed by URL path, and every requested URL is recorded.
///
/// Built only with the `canned` feature.
///
/// ```rust,ignore
/// use serde_json::json;
/// use tickr_util::Canned;
///
/// let client = Canned::new().json("/eod/AAPL.US", json!([{ "date": "2024-01-02" }]));
/// assert!(client.requests().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Canned {
    routes: HashMap<String, Reply>,
    requests: Mutex<Vec<Url>>,
}

#[derive(Debug, Clone)]
enum Reply {
    Body(Vec<u8>),
    Status(u16),
}

impl Canned {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` with a JSON body.
    pub fn json(mut self, path: &str, body: serde_json::Value) -> Self {
        self.routes
            .insert(path.to_string(), Reply::Body(body.to_string().into_bytes()));
        self
    }

    /// Answer `path` with raw bytes, e.g., a malformed body.
    pub fn raw(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(path.to_string(), Reply::Body(body.into()));
        self
    }

    /// Answer `path` with an unsuccessful status code.
    pub fn status(mut self, path: &str, code: u16) -> Self {
        self.routes.insert(path.to_string(), Reply::Status(code));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<Url> {
        match self.requests.lock() {
            Ok(seen) => seen.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ClientFetchExt for Canned {
    async fn get_body(&self, url: &Url) -> Result<Vec<u8>> {
        trace!("canned GET {}", url.path());
        match self.requests.lock() {
            Ok(mut seen) => seen.push(url.clone()),
            Err(poisoned) => poisoned.into_inner().push(url.clone()),
        }

        match self.routes.get(url.path()) {
            Some(Reply::Body(body)) => Ok(body.clone()),
            Some(Reply::Status(code)) => Err(anyhow!("HTTP status {code} for {}", url.path())),
            None => Err(anyhow!("connection refused: no route for {}", url.path())),
        }
    }
}
