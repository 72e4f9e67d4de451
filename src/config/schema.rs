use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::ScoringConfig;

pub const DEFAULT_SCOPUS_BASE_URL: &str = "https://api.elsevier.com";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub scoring: Option<ScoringConfig>,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub scopus: ScopusConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    /// Folder that holds the `run_*` folders (default: current directory)
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl Config {
    /// Scoring section with built-in defaults filled in.
    pub fn effective_scoring(&self) -> ScoringConfig {
        self.scoring.clone().unwrap_or_default()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Search terms, grouped the way the query is built: the first two groups
/// are required, the last two only narrow the strict query.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SearchKeywords {
    pub multilevel: Vec<String>,
    pub mixed_methods: Vec<String>,
    pub vbhc: Vec<String>,
    pub context: Vec<String>,
}

impl Default for SearchKeywords {
    fn default() -> Self {
        fn owned(terms: &[&str]) -> Vec<String> {
            terms.iter().map(|s| s.to_string()).collect()
        }
        Self {
            multilevel: owned(&[
                "multilevel",
                "multi-level",
                "hierarchical linear model",
                "HLM",
                "nested data",
                "hierarchical model",
            ]),
            mixed_methods: owned(&[
                "mixed method",
                "mixed-method",
                "qualitative and quantitative",
                "multi-method",
            ]),
            vbhc: owned(&[
                "value-based healthcare",
                "VBHC",
                "value based care",
                "value-based care",
            ]),
            context: owned(&[
                "national health service",
                "NHS",
                "Beveridge",
                "Portugal",
                "Portuguese",
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SearchConfig {
    pub keywords: SearchKeywords,
    /// Upper bound on results fetched per query
    pub max_results: usize,
    /// Below this many strict results the relaxed query is used instead
    pub min_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: SearchKeywords::default(),
            max_results: 200,
            min_results: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScopusConfig {
    /// API key; `SCOPUS_API_KEY` takes precedence
    pub api_key: Option<String>,
    pub base_url: String,
    /// Per-request timeout, e.g. "30s"
    pub request_timeout: String,
    /// Journal metric lookups in flight at once
    pub concurrency: usize,
    /// How long cached journal metrics stay valid, e.g. "7d"
    pub cache_ttl: String,
}

impl Default for ScopusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_SCOPUS_BASE_URL.to_string(),
            request_timeout: "30s".to_string(),
            concurrency: 8,
            cache_ttl: "7d".to_string(),
        }
    }
}

impl ScopusConfig {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid request_timeout '{}'", self.request_timeout))
    }

    pub fn cache_ttl(&self) -> Result<Duration> {
        humantime::parse_duration(&self.cache_ttl)
            .with_context(|| format!("Invalid cache_ttl '{}'", self.cache_ttl))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct RetrievalConfig {
    /// Contact address required by Unpaywall; without it that source is skipped
    pub unpaywall_email: Option<String>,
    /// Open the paper's DOI page when manual download is needed
    pub open_browser: bool,
    /// Cited and citing papers fetched per direction
    pub related_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            unpaywall_email: None,
            open_browser: false,
            related_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ReviewConfig {
    /// Upper bound on critique/refine rounds
    pub max_rounds: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { max_rounds: 5 }
    }
}
