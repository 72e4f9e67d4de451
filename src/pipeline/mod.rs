pub mod paths;
pub mod phases;

pub use paths::RunPaths;
pub use phases::*;

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::credentials::resolve_scopus_key;
use crate::llm::UsageTracker;
use crate::prompt::Prompter;
use crate::scopus::{CacheConfig, MetricsCache, ScopusClient, ScopusError};
use crate::scoring::{ScoringConfig, ScoringError};

// Exit codes. A missing key and a general failure share 1; only network
// and configuration problems get their own code.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_AUTH: i32 = 1;
pub const EXIT_NETWORK: i32 = 2;
pub const EXIT_CONFIG: i32 = 4;

/// Failures that map to a specific exit code and have no better home.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required API key is missing
    #[error("{0}")]
    Auth(String),

    /// Bad command-line input, e.g. an index out of range
    #[error("{0}")]
    Usage(String),
}

/// Exit code for an error, from the first cause that has one.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PipelineError>() {
            return match e {
                PipelineError::Auth(_) => EXIT_AUTH,
                PipelineError::Usage(_) => EXIT_CONFIG,
            };
        }
        if let Some(e) = cause.downcast_ref::<ScopusError>() {
            return if e.is_auth() { EXIT_AUTH } else { EXIT_NETWORK };
        }
        if cause.downcast_ref::<ScoringError>().is_some() {
            return EXIT_CONFIG;
        }
        if cause.downcast_ref::<reqwest::Error>().is_some() {
            return EXIT_NETWORK;
        }
    }
    EXIT_FAILURE
}

/// Everything a phase needs: configuration, the run folder, the prompt
/// source and the run's LLM usage counters.
pub struct RunContext {
    pub config: Config,
    pub paths: RunPaths,
    pub prompter: Prompter,
    pub cache: CacheConfig,
    pub usage: Arc<UsageTracker>,
}

impl RunContext {
    pub fn new(config: Config, paths: RunPaths, prompter: Prompter, cache: CacheConfig) -> Self {
        Self {
            config,
            paths,
            prompter,
            cache,
            usage: Arc::new(UsageTracker::new()),
        }
    }

    pub fn scoring(&self) -> ScoringConfig {
        self.config.effective_scoring()
    }

    pub fn metrics_cache(&self) -> MetricsCache {
        MetricsCache::new(self.cache.clone())
    }

    /// Scopus client with the resolved API key. Prompts for the key only in
    /// interactive sessions.
    pub fn scopus_client(&self) -> Result<ScopusClient> {
        let key = resolve_scopus_key(
            self.config.scopus.api_key.as_deref(),
            !self.prompter.is_scripted(),
        )
        .map_err(|e| PipelineError::Auth(format!("{:#}", e)))?;
        let client = ScopusClient::with_base_url(
            &self.config.scopus.base_url,
            &key,
            self.config.scopus.timeout()?,
        )?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_classification() {
        let auth = anyhow::Error::new(PipelineError::Auth("no key".into()));
        assert_eq!(exit_code(&auth), EXIT_AUTH);

        let usage = anyhow::Error::new(PipelineError::Usage("bad index".into()));
        assert_eq!(exit_code(&usage.context("open failed")), EXIT_CONFIG);

        let scoring = anyhow::Error::new(ScoringError::InvalidWeightConfiguration { total: 0.0 });
        assert_eq!(exit_code(&scoring), EXIT_CONFIG);

        let network: Result<(), ScopusError> = Err(ScopusError::RateLimited);
        let network = network.context("search failed").unwrap_err();
        assert_eq!(exit_code(&network), EXIT_NETWORK);

        assert_eq!(exit_code(&anyhow::anyhow!("anything else")), EXIT_FAILURE);
    }
}
