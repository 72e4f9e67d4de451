pub mod init;
mod schema;

pub use schema::{
    Config, RetrievalConfig, ReviewConfig, ScopusConfig, SearchConfig, SearchKeywords,
    DEFAULT_SCOPUS_BASE_URL,
};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/lit-review/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("lit-review")
}

/// Get the default config file path (~/.config/lit-review/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/lit-review/config.yaml), and a missing default file means
///   built-in defaults.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    tracing::debug!(path = %config_path.display(), "Loaded config");
    Ok(config)
}

/// Validate the whole config at startup, collecting every problem.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = match crate::scoring::validate_scoring(&config.effective_scoring()) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };

    if config.search.max_results == 0 {
        errors.push("search.max_results: must be greater than zero".to_string());
    }
    if config.search.keywords.multilevel.is_empty() {
        errors.push("search.keywords.multilevel: at least one term is required".to_string());
    }
    if config.search.keywords.mixed_methods.is_empty() {
        errors.push("search.keywords.mixed_methods: at least one term is required".to_string());
    }
    if let Err(e) = config.scopus.timeout() {
        errors.push(format!("scopus.request_timeout: {:#}", e));
    }
    if let Err(e) = config.scopus.cache_ttl() {
        errors.push(format!("scopus.cache_ttl: {:#}", e));
    }
    if config.scopus.concurrency == 0 {
        errors.push("scopus.concurrency: must be greater than zero".to_string());
    }
    if config.review.max_rounds == 0 {
        errors.push("review.max_rounds: must be greater than zero".to_string());
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
    use crate::scoring::{GradingWeights, ScoringConfig};

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("nope.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "search:\n  min_results: 5\nreview:\n  max_rounds: 2\n",
        )
        .unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.search.min_results, 5);
        assert_eq!(config.review.max_rounds, 2);
        assert!(config.scoring.is_none());
    }

    #[test]
    fn test_load_invalid_yaml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "search: [unclosed").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut weights = GradingWeights::default();
        weights.impact.citations_max = -5.0;
        let mut config = Config {
            scoring: Some(ScoringConfig {
                weights: Some(weights),
                ..ScoringConfig::default()
            }),
            ..Config::default()
        };
        config.scopus.request_timeout = "later".to_string();
        config.review.max_rounds = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("scoring.weights.impact.citations_max"));
        assert!(errors.iter().any(|e| e.starts_with("scopus.request_timeout")));
        assert!(errors.iter().any(|e| e.starts_with("review.max_rounds")));
    }
}
