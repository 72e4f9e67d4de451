pub mod config;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod metrics;
pub mod validation;
pub mod weights;

pub use config::*;
pub use engine::{
    grade_paper, rank_papers, score_citations, score_journal_quality, score_mixed_methods,
    score_multilevel, score_phd_relevance, GradingResult, ScoreBreakdown, ScoringOptions,
    DEFAULT_MAX_CITATIONS,
};
pub use error::ScoringError;
pub use keywords::{keyword_score, TopicKeywords};
pub use metrics::{normalize_issn, JournalMetrics, MetricsProvider, MetricsTable};
pub use validation::{validate_scoring, validate_weights};
pub use weights::{normalize_weights, round2, GradingWeights, WeightConfiguration};
