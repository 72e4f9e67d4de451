use serde::{Deserialize, Serialize};

use super::engine::{ScoringOptions, DEFAULT_MAX_CITATIONS};
use super::error::ScoringError;
use super::keywords::TopicKeywords;
use super::weights::{normalize_weights, GradingWeights, WeightConfiguration};

/// Number of papers written to the ranked listing by default.
pub const DEFAULT_TOP_N: usize = 20;

/// Scoring section of the config file.
///
/// Every field is optional; anything left out falls back to the built-in
/// rubric.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     class_relevance:
///       multilevel_strong: 25
///     impact:
///       citations_max: 0
///   max_citations: 1000
///   keywords:
///     portugal: ["Portugal", "Portuguese", "Lisbon"]
///   top_n: 10
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Raw weights, re-normalized to 100 on load
    #[serde(default)]
    pub weights: Option<GradingWeights>,

    /// Citation count that earns the full impact weight
    #[serde(default)]
    pub max_citations: Option<u64>,

    /// Topical keyword lists
    #[serde(default)]
    pub keywords: Option<TopicKeywords>,

    /// How many papers the ranked listing shows
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(GradingWeights::default()),
            max_citations: Some(DEFAULT_MAX_CITATIONS),
            keywords: Some(TopicKeywords::default()),
            top_n: Some(DEFAULT_TOP_N),
        }
    }
}

impl ScoringConfig {
    /// Normalized weights for this config.
    pub fn weight_configuration(&self) -> Result<WeightConfiguration, ScoringError> {
        match self.weights {
            Some(ref raw) => normalize_weights(raw),
            None => Ok(WeightConfiguration::default()),
        }
    }

    pub fn options(&self) -> ScoringOptions {
        ScoringOptions {
            max_citations: self.max_citations.unwrap_or(DEFAULT_MAX_CITATIONS),
            keywords: self.keywords.clone().unwrap_or_default(),
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }
}
