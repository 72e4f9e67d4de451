use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::catalog::{ProviderInfo, PROVIDERS};
use crate::paper::{read_json, write_json};
use crate::prompt::Prompter;

pub const LLM_CONFIG_FILE: &str = "llm_config.json";

/// The two model roles of the review workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Development,
    DevilsAdvocate,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Development => "Development",
            Role::DevilsAdvocate => "Devil's Advocate",
        }
    }

    fn recommended(&self, provider: &ProviderInfo) -> &'static str {
        match self {
            Role::Development => provider.recommended_dev,
            Role::DevilsAdvocate => provider.recommended_advocate,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Development => f.write_str("development"),
            Role::DevilsAdvocate => f.write_str("devils_advocate"),
        }
    }
}

/// A chosen provider and model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSelection {
    pub provider: String,
    pub model_key: String,
    pub model_id: String,
}

impl LlmSelection {
    /// The provider's recommended model for `role`.
    pub fn recommended(provider: &ProviderInfo, role: Role) -> Self {
        let key = role.recommended(provider);
        let id = provider.model(key).map(|m| m.id).unwrap_or(key);
        Self {
            provider: provider.id.to_string(),
            model_key: key.to_string(),
            model_id: id.to_string(),
        }
    }
}

impl fmt::Display for LlmSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.provider, self.model_key)
    }
}

/// Phase 0 result: which model plays which role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    pub development: LlmSelection,
    pub devils_advocate: LlmSelection,
    pub created_at: DateTime<Utc>,
}

impl LlmConfig {
    pub fn selection(&self, role: Role) -> &LlmSelection {
        match role {
            Role::Development => &self.development,
            Role::DevilsAdvocate => &self.devils_advocate,
        }
    }

    /// Recommended models of the first catalog provider. Used when phase 0
    /// was skipped.
    pub fn fallback() -> Self {
        let provider = &PROVIDERS[0];
        Self {
            development: LlmSelection::recommended(provider, Role::Development),
            devils_advocate: LlmSelection::recommended(provider, Role::DevilsAdvocate),
            created_at: Utc::now(),
        }
    }

    pub fn load(run_dir: &Path) -> Result<Self> {
        read_json(&run_dir.join(LLM_CONFIG_FILE))
            .context("LLM configuration not found. Run `lit-review setup-llm` first.")
    }

    /// Load the run's configuration, or fall back to the defaults with a warning.
    pub fn load_or_fallback(run_dir: &Path) -> Self {
        match Self::load(run_dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Using default LLM selection");
                Self::fallback()
            }
        }
    }

    pub fn save(&self, run_dir: &Path) -> Result<()> {
        write_json(&run_dir.join(LLM_CONFIG_FILE), self)
    }
}

/// Print providers and their models, flagging recommended ones.
pub fn display_llm_options(available: &[&ProviderInfo]) {
    println!();
    println!("Available LLM providers:");
    for (i, provider) in available.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, provider.name);
        for model in provider.models {
            let marker = if model.key == provider.recommended_dev
                || model.key == provider.recommended_advocate
            {
                " (recommended)"
            } else {
                ""
            };
            println!("     - {}: {}{}", model.key, model.id, marker);
        }
    }
}

/// Pick a provider and then one of its models for `role`.
pub fn select_llm(prompter: &Prompter, available: &[&ProviderInfo], role: Role) -> Result<LlmSelection> {
    println!();
    println!("Select {} LLM", role.label());
    println!("Provider:");
    for (i, provider) in available.iter().enumerate() {
        println!("  {}. {}", i + 1, provider.name);
    }
    let choice = prompter.prompt_choice(
        &format!("Enter choice (1-{})", available.len()),
        available.len(),
        1,
    )?;
    let provider = available[choice - 1];

    let recommended = role.recommended(provider);
    let default = provider
        .models
        .iter()
        .position(|m| m.key == recommended)
        .map(|i| i + 1)
        .unwrap_or(1);

    println!("Model from {}:", provider.name);
    for (i, model) in provider.models.iter().enumerate() {
        let marker = if model.key == recommended { "  [recommended]" } else { "" };
        println!("  {}. {} ({}){}", i + 1, model.key, model.id, marker);
    }
    let choice = prompter.prompt_choice(
        &format!("Enter choice (1-{})", provider.models.len()),
        provider.models.len(),
        default,
    )?;
    let model = provider.models[choice - 1];

    Ok(LlmSelection {
        provider: provider.id.to_string(),
        model_key: model.key.to_string(),
        model_id: model.id.to_string(),
    })
}

/// Phase 0: choose the development and devil's advocate models.
pub fn setup_llms(prompter: &Prompter, available: &[&ProviderInfo]) -> Result<LlmConfig> {
    if available.is_empty() {
        let vars: Vec<_> = PROVIDERS.iter().map(|p| p.env_var).collect();
        anyhow::bail!(
            "No LLM API keys found. Add at least one of: {}",
            vars.join(", ")
        );
    }

    display_llm_options(available);
    let development = select_llm(prompter, available, Role::Development)?;
    let devils_advocate = select_llm(prompter, available, Role::DevilsAdvocate)?;

    Ok(LlmConfig {
        development,
        devils_advocate,
        created_at: Utc::now(),
    })
}
