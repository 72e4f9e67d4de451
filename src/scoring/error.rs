/// Rejections raised while building a weight configuration.
///
/// These are the only hard failures of the grading engine; everything that
/// goes wrong per paper degrades to a zero contribution instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// A criterion carries a negative (or non-finite) weight
    #[error("invalid weight for {criterion}: {value} (weights must be non-negative numbers)")]
    InvalidWeight { criterion: String, value: f64 },

    /// All weights sum to zero, so nothing can be rescaled to 100
    #[error("invalid weight configuration: weights sum to {total}, expected a positive total")]
    InvalidWeightConfiguration { total: f64 },
}
