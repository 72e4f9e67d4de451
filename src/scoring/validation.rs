use super::config::ScoringConfig;

use super::weights::GradingWeights;

/// Report every problem with a raw weight set: negative or non-numeric
/// criteria and an all-zero total.
pub fn validate_weights(weights: &GradingWeights) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (criterion, value) in weights.criteria() {
        if !value.is_finite() {
            errors.push(format!("scoring.weights.{}: must be a number", criterion));
        } else if value < 0.0 {
            errors.push(format!(
                "scoring.weights.{}: must be non-negative (got {})",
                criterion, value
            ));
        }
    }
    if errors.is_empty() && weights.total() <= 0.0 {
        errors.push("scoring.weights: at least one weight must be positive".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        if let Err(weight_errors) = validate_weights(weights) {
            errors.extend(weight_errors);
        }
    }

    if config.max_citations == Some(0) {
        errors.push("scoring.max_citations: must be greater than zero".to_string());
    }

    if config.top_n == Some(0) {
        errors.push("scoring.top_n: must be greater than zero".to_string());
    }

    if let Some(ref keywords) = config.keywords {
        let lists = [
            ("vbhc", &keywords.vbhc),
            ("nhs_context", &keywords.nhs_context),
            ("portugal", &keywords.portugal),
        ];
        for (name, list) in lists {
            for (i, keyword) in list.iter().enumerate() {
                if keyword.trim().is_empty() {
                    errors.push(format!("scoring.keywords.{}[{}]: must not be empty", name, i));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{GradingWeights, TopicKeywords};

    #[test]
    fn test_validate_weights_reports_all() {
        let mut weights = GradingWeights::default();
        weights.set("class_relevance.multilevel_weak", -1.0);
        weights.set("impact.citations_max", f64::NAN);
        let errors = validate_weights(&weights).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("class_relevance.multilevel_weak"));
        assert!(errors[1].contains("impact.citations_max"));
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        let config = ScoringConfig {
            weights: None,
            max_citations: None,
            keywords: None,
            top_n: None,
        };
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_negative_weight() {
        let mut weights = GradingWeights::default();
        weights.phd_relevance.vbhc = -10.0;
        let config = ScoringConfig {
            weights: Some(weights),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("scoring.weights.phd_relevance.vbhc"));
    }

    #[test]
    fn test_all_zero_weights() {
        let mut weights = GradingWeights::default();
        for (criterion, _) in GradingWeights::default().criteria() {
            weights.set(criterion, 0.0);
        }
        let config = ScoringConfig {
            weights: Some(weights),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("at least one weight must be positive"));
    }

    #[test]
    fn test_empty_keyword() {
        let mut keywords = TopicKeywords::default();
        keywords.portugal.push("  ".to_string());
        let config = ScoringConfig {
            keywords: Some(keywords),
            ..ScoringConfig::default()
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.keywords.portugal[2]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut weights = GradingWeights::default();
        weights.impact.citations_max = -1.0; // Error 1
        weights.journal_quality.sjr_max = -2.0; // Error 2
        let config = ScoringConfig {
            weights: Some(weights),
            max_citations: Some(0), // Error 3
            keywords: None,
            top_n: Some(0), // Error 4
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
