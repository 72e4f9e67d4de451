use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

use super::error::ScopusError;
use crate::config::DEFAULT_SCOPUS_BASE_URL;

const API_KEY_HEADER: &str = "X-ELS-APIKey";

/// Authenticated Scopus API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ScopusClient {
    http: reqwest::Client,
    base_url: String,
}

impl ScopusClient {
    /// Create a client against the public Elsevier API.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_SCOPUS_BASE_URL, api_key, timeout)
    }

    /// Create a client against another host (tests, proxies).
    pub fn with_base_url(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).context("API key contains invalid characters")?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("lit-review/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create Scopus client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ScopusError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "Scopus request");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScopusError::from_status(status, &body));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// GET `path` asking for a PDF. `Ok(None)` when the server answers with
    /// anything that is not a PDF.
    pub async fn get_pdf(&self, path: &str) -> Result<Option<Vec<u8>>, ScopusError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/pdf")
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "No PDF from Scopus");
            return Ok(None);
        }
        if !is_pdf_response(response.headers()) {
            return Ok(None);
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}

/// Whether the response declares a PDF body.
pub fn is_pdf_response(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("pdf"))
        .unwrap_or(false)
}
