use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::pdf::looks_like_pdf;
use crate::paper::Paper;
use crate::scopus::{is_pdf_response, ScopusClient};

pub const DOI_RESOLVER: &str = "https://doi.org";
pub const UNPAYWALL_API: &str = "https://api.unpaywall.org/v2";

/// Where a PDF came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfSource {
    Scopus,
    Doi,
    Unpaywall,
    Manual,
}

impl fmt::Display for PdfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PdfSource::Scopus => "Scopus",
            PdfSource::Doi => "DOI resolution",
            PdfSource::Unpaywall => "Unpaywall (open access)",
            PdfSource::Manual => "manual upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize)]
struct UnpaywallRecord {
    best_oa_location: Option<OaLocation>,
}

#[derive(Debug, Deserialize)]
struct OaLocation {
    url_for_pdf: Option<String>,
}

/// File-name-safe form of a DOI (`10.1/abc` -> `10.1_abc`).
pub fn doi_file_stem(doi: &str) -> String {
    doi.replace(['/', '\\', ':'], "_")
}

/// Automatic PDF sources, tried in order: Scopus, DOI, Unpaywall.
///
/// Every source failure is logged and turns into `None`; the caller decides
/// what to do when all of them come up empty.
#[derive(Clone, Debug)]
pub struct Downloader {
    http: reqwest::Client,
    scopus: Option<ScopusClient>,
    doi_resolver: String,
    unpaywall_api: String,
    unpaywall_email: Option<String>,
}

impl Downloader {
    pub fn new(
        scopus: Option<ScopusClient>,
        unpaywall_email: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lit-review/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            scopus,
            doi_resolver: DOI_RESOLVER.to_string(),
            unpaywall_api: UNPAYWALL_API.to_string(),
            unpaywall_email: unpaywall_email.filter(|e| !e.trim().is_empty()),
        })
    }

    /// Point the DOI and Unpaywall lookups at other hosts.
    pub fn with_endpoints(mut self, doi_resolver: &str, unpaywall_api: &str) -> Self {
        self.doi_resolver = doi_resolver.trim_end_matches('/').to_string();
        self.unpaywall_api = unpaywall_api.trim_end_matches('/').to_string();
        self
    }

    pub fn scopus(&self) -> Option<&ScopusClient> {
        self.scopus.as_ref()
    }

    pub fn has_unpaywall(&self) -> bool {
        self.unpaywall_email.is_some()
    }

    /// GET `url`, keeping the body only if it is a PDF.
    async fn fetch_pdf(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "PDF request failed");
            return Ok(None);
        }
        let declared_pdf = is_pdf_response(response.headers());
        let bytes = response.bytes().await?;
        if declared_pdf || looks_like_pdf(&bytes) {
            Ok(Some(bytes.to_vec()))
        } else {
            Ok(None)
        }
    }

    pub async fn from_scopus(&self, scopus_id: &str) -> Option<Vec<u8>> {
        let client = self.scopus.as_ref()?;
        let path = format!("/content/article/scopus_id/{}", scopus_id);
        match client.get_pdf(&path).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%scopus_id, error = %e, "Scopus download failed");
                None
            }
        }
    }

    pub async fn from_doi(&self, doi: &str) -> Option<Vec<u8>> {
        let url = format!("{}/{}", self.doi_resolver, doi);
        match self.fetch_pdf(&url).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%doi, error = %e, "DOI download failed");
                None
            }
        }
    }

    /// Open-access copy via Unpaywall. Skipped without a contact e-mail.
    pub async fn from_unpaywall(&self, doi: &str) -> Option<Vec<u8>> {
        let email = self.unpaywall_email.as_deref()?;
        match self.unpaywall_lookup(doi, email).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%doi, error = %e, "Unpaywall download failed");
                None
            }
        }
    }

    async fn unpaywall_lookup(&self, doi: &str, email: &str) -> Result<Option<Vec<u8>>> {
        let url = format!("{}/{}", self.unpaywall_api, doi);
        let response = self.http.get(&url).query(&[("email", email)]).send().await?;
        if !response.status().is_success() {
            tracing::debug!(%doi, status = %response.status(), "Unpaywall has no record");
            return Ok(None);
        }
        let record: UnpaywallRecord = response.json().await?;
        let pdf_url = record
            .best_oa_location
            .and_then(|location| location.url_for_pdf)
            .filter(|u| !u.is_empty());

        match pdf_url {
            Some(pdf_url) => self.fetch_pdf(&pdf_url).await,
            None => Ok(None),
        }
    }

    /// Try every automatic source in order, returning the first PDF found.
    pub async fn download(&self, paper: &Paper) -> Option<(PdfSource, Vec<u8>)> {
        println!("[1/3] Attempting Scopus download...");
        if let Some(bytes) = self.from_scopus(&paper.scopus_id).await {
            return Some((PdfSource::Scopus, bytes));
        }

        let doi = paper.doi.as_deref()?;

        println!("[2/3] Attempting DOI resolution...");
        if let Some(bytes) = self.from_doi(doi).await {
            return Some((PdfSource::Doi, bytes));
        }

        println!("[3/3] Attempting Unpaywall (open access)...");
        if !self.has_unpaywall() {
            println!("  Skipped: set retrieval.unpaywall_email to enable Unpaywall");
        }
        self.from_unpaywall(doi)
            .await
            .map(|bytes| (PdfSource::Unpaywall, bytes))
    }
}
