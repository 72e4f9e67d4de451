pub mod catalog;
pub mod config;
pub mod usage;

pub use catalog::{detect_available, provider, ModelOption, ProviderInfo, PROVIDERS};
pub use config::{setup_llms, LlmConfig, LlmSelection, Role, LLM_CONFIG_FILE};
pub use usage::{RoleUsage, TrackedModel, UsageTracker};

use anyhow::Result;
use std::sync::Arc;

/// A text generation backend: prompt in, text out.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable "provider - model" label
    fn describe(&self) -> String;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Stand-in for a real provider API. Always answers with the same marker
/// text naming the provider and model.
#[derive(Debug, Clone)]
pub struct PlaceholderModel {
    provider: String,
    model_id: String,
}

impl PlaceholderModel {
    pub fn new(provider: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model_id: model_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for PlaceholderModel {
    fn describe(&self) -> String {
        format!("{} - {}", self.provider, self.model_id)
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(format!(
            "[PLACEHOLDER: This would be the {} {} response to the question]",
            self.provider, self.model_id
        ))
    }
}

/// Build the model for `role` from the run's selection, counted by `tracker`.
pub fn build_model(config: &LlmConfig, role: Role, tracker: Arc<UsageTracker>) -> TrackedModel {
    let selection = config.selection(role);
    let inner = PlaceholderModel::new(&selection.provider, &selection.model_id);
    TrackedModel::new(Box::new(inner), role, tracker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_names_provider_and_model() {
        let model = PlaceholderModel::new("xai", "grok-4.1");
        assert_eq!(model.describe(), "xai - grok-4.1");
        assert_eq!(
            model.generate("anything").await.unwrap(),
            "[PLACEHOLDER: This would be the xai grok-4.1 response to the question]"
        );
    }

    #[tokio::test]
    async fn test_build_model_uses_role_selection() {
        let tracker = Arc::new(UsageTracker::new());
        let config = LlmConfig::fallback();
        let advocate = build_model(&config, Role::DevilsAdvocate, tracker.clone());
        assert_eq!(advocate.describe(), "anthropic - claude-haiku-4.5");
        advocate.generate("x").await.unwrap();
        assert_eq!(tracker.get(Role::DevilsAdvocate).calls, 1);
    }
}
