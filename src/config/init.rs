use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, RetrievalConfig, SearchConfig, SearchKeywords};
use crate::paper::write_text;
use crate::prompt::{typewriter, Prompter};
use crate::scoring::{normalize_weights, GradingWeights, ScoringConfig, WeightConfiguration};

/// Display name of a weight criterion.
fn criterion_label(criterion: &str) -> &str {
    match criterion {
        "class_relevance.multilevel_strong" => "Multilevel (strong)",
        "class_relevance.multilevel_weak" => "Multilevel (weak)",
        "class_relevance.mixed_methods_explicit" => "Mixed Methods (explicit)",
        "class_relevance.mixed_methods_implicit" => "Mixed Methods (implicit)",
        "phd_relevance.vbhc" => "VBHC",
        "phd_relevance.nhs_context" => "NHS Context",
        "phd_relevance.portugal" => "Portugal",
        "journal_quality.citescore_max" => "CiteScore",
        "journal_quality.sjr_max" => "SJR",
        "impact.citations_max" => "Citations",
        other => other,
    }
}

fn print_weights(weights: &GradingWeights) {
    let mut section = "";
    for (criterion, value) in weights.criteria() {
        let group = criterion.split('.').next().unwrap_or(criterion);
        if group != section {
            section = group;
            println!();
            println!("{}:", group);
        }
        println!("  - {}: {}", criterion_label(criterion), value);
    }
}

/// Ask for every weight, keeping `current` on empty input. Negative or
/// non-numeric answers are re-prompted.
pub fn prompt_weights(prompter: &Prompter, current: &GradingWeights) -> Result<GradingWeights> {
    let mut weights = *current;
    println!("(Press Enter to keep the current value)");
    for (criterion, value) in current.criteria() {
        let label = criterion_label(criterion);
        let new_value = loop {
            let input = prompter.prompt_with_default(label, &value.to_string())?;
            match input.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => break v,
                Ok(_) => println!("  Invalid: must be non-negative. Try again."),
                Err(_) => println!("  Invalid: must be a non-negative number. Try again."),
            }
        };
        weights.set(criterion, new_value);
    }
    Ok(weights)
}

/// Offer to change the grading weights, then rescale them to 100.
///
/// Declining keeps `current`. Entered weights that cannot be normalized
/// (all zeros) are returned as a `ScoringError` and nothing is graded.
pub fn customize_weights(
    prompter: &Prompter,
    current: &WeightConfiguration,
) -> Result<WeightConfiguration> {
    println!();
    println!("Current weights (Total: {} points):", current.total());
    print_weights(&current.to_raw());
    println!();

    if !prompter.prompt_yes_no("Would you like to customize these weights?", false)? {
        println!("Using current weights.");
        return Ok(*current);
    }

    let raw = prompt_weights(prompter, &current.to_raw())?;
    let total = raw.total();
    println!();
    println!("Total of entered weights: {}", total);

    let weights = normalize_weights(&raw)?;
    if weights.to_raw() != raw {
        println!("Weights normalized to sum to 100:");
        print_weights(&weights.to_raw());
    }
    Ok(weights)
}

fn prompt_terms(prompter: &Prompter, label: &str, current: &[String]) -> Result<Vec<String>> {
    let input = prompter.prompt_with_default(label, &current.join(", "))?;
    Ok(input
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

fn prompt_count(prompter: &Prompter, label: &str, default: usize) -> Result<usize> {
    loop {
        let input = prompter.prompt_with_default(label, &default.to_string())?;
        match input.parse::<usize>() {
            Ok(v) if v > 0 => return Ok(v),
            _ => println!("  Invalid: must be a positive whole number. Try again."),
        }
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the suggested config file path.
pub fn run_init_wizard(prompter: &Prompter, default_path: Option<PathBuf>) -> Result<PathBuf> {
    println!();
    typewriter("Literature Review Configuration Wizard", prompter);
    println!("======================================");

    // 1. Grading weights
    println!();
    typewriter(
        "Papers are graded out of 100 points. Weights that don't add up to 100 are rescaled.",
        prompter,
    );
    let weights = customize_weights(prompter, &WeightConfiguration::default())?;

    // 2. Search keywords
    println!();
    typewriter(
        "The search requires one multilevel term and one mixed-methods term. The strict query also requires a VBHC and a context term.",
        prompter,
    );
    let defaults = SearchKeywords::default();
    let keywords = if prompter.prompt_yes_no("Edit search keywords? (n accepts defaults)", false)? {
        println!("(Comma-separated)");
        let mut keywords = SearchKeywords {
            multilevel: prompt_terms(prompter, "Multilevel terms", &defaults.multilevel)?,
            mixed_methods: prompt_terms(prompter, "Mixed-methods terms", &defaults.mixed_methods)?,
            vbhc: prompt_terms(prompter, "VBHC terms", &defaults.vbhc)?,
            context: prompt_terms(prompter, "Context terms", &defaults.context)?,
        };
        if keywords.multilevel.is_empty() {
            println!("  Multilevel terms are required. Using defaults.");
            keywords.multilevel = defaults.multilevel.clone();
        }
        if keywords.mixed_methods.is_empty() {
            println!("  Mixed-methods terms are required. Using defaults.");
            keywords.mixed_methods = defaults.mixed_methods.clone();
        }
        keywords
    } else {
        defaults
    };

    let search_defaults = SearchConfig::default();
    let max_results = prompt_count(prompter, "Maximum results per query", search_defaults.max_results)?;
    let min_results = prompt_count(
        prompter,
        "Minimum strict results before relaxing the query",
        search_defaults.min_results,
    )?;

    // 3. Retrieval
    println!();
    typewriter(
        "Unpaywall finds open-access copies but asks for a contact e-mail. Leave empty to skip it.",
        prompter,
    );
    let email = prompter.prompt("Contact e-mail for Unpaywall: ")?;
    let open_browser = prompter.prompt_yes_no("Open the paper page when a manual download is needed?", true)?;

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompter.prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompter.prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(config_path);
        }
    }

    // 5. Write config
    let config = Config {
        scoring: Some(ScoringConfig {
            weights: Some(weights.to_raw()),
            ..ScoringConfig::default()
        }),
        search: SearchConfig {
            keywords,
            max_results,
            min_results,
        },
        retrieval: RetrievalConfig {
            unpaywall_email: Some(email).filter(|e| !e.is_empty()),
            open_browser,
            ..RetrievalConfig::default()
        },
        ..Config::default()
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    write_text(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Set SCOPUS_API_KEY and at least one LLM key (or add them to .env), then run `lit-review run`.");

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use crate::scoring::ScoringError;

    fn script(answers: &[&str]) -> Prompter {
        Prompter::scripted(answers.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_declined_customization_keeps_weights() {
        let current = WeightConfiguration::default();
        let weights = customize_weights(&script(&["n"]), &current).unwrap();
        assert_eq!(weights, current);
    }

    #[test]
    fn test_customized_weights_are_normalized() {
        // Double the first criterion, keep the rest: total 120
        let answers = ["y", "40", "", "", "", "", "", "", "", "", ""];
        let weights = customize_weights(&script(&answers), &WeightConfiguration::default()).unwrap();
        assert!((weights.total() - 100.0).abs() < 0.05);
        assert_eq!(weights.class_relevance().multilevel_strong, 33.33);
        assert_eq!(weights.impact().citations_max, 4.17);
    }

    #[test]
    fn test_invalid_weight_is_reprompted() {
        let answers = ["-3", "abc", "7"];
        let weights = prompt_weights(&script(&answers), &GradingWeights::default()).unwrap();
        assert_eq!(weights.class_relevance.multilevel_strong, 7.0);
        assert_eq!(weights.class_relevance.multilevel_weak, 10.0);
    }

    #[test]
    fn test_all_zero_weights_are_rejected() {
        let mut answers = vec!["y"];
        answers.extend(std::iter::repeat("0").take(10));
        let err = customize_weights(&script(&answers), &WeightConfiguration::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScoringError>(),
            Some(ScoringError::InvalidWeightConfiguration { .. })
        ));
    }

    #[test]
    fn test_wizard_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lit-review").join("config.yaml");
        let answers = [
            "n",              // keep weights
            "n",              // keep keywords
            "50",             // max results
            "",               // min results
            "me@example.org", // unpaywall
            "n",              // open browser
            "",               // path
        ];

        let written = run_init_wizard(&script(&answers), Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.min_results, 20);
        assert_eq!(config.retrieval.unpaywall_email.as_deref(), Some("me@example.org"));
        assert!(!config.retrieval.open_browser);
        assert_eq!(
            config.effective_scoring().weight_configuration().unwrap(),
            WeightConfiguration::default()
        );
    }
}
