use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::config::Role;
use super::LanguageModel;

/// Counters for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleUsage {
    pub calls: u64,
    pub prompt_chars: u64,
    pub response_chars: u64,
}

/// Per-run record of model calls, shared by every tracked model of the run.
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: Mutex<BTreeMap<Role, RoleUsage>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, role: Role, prompt: &str, response: &str) {
        if let Ok(mut usage) = self.usage.lock() {
            let entry = usage.entry(role).or_default();
            entry.calls += 1;
            entry.prompt_chars += prompt.chars().count() as u64;
            entry.response_chars += response.chars().count() as u64;
        }
    }

    pub fn get(&self, role: Role) -> RoleUsage {
        self.usage
            .lock()
            .ok()
            .and_then(|usage| usage.get(&role).copied())
            .unwrap_or_default()
    }

    pub fn total_calls(&self) -> u64 {
        self.usage
            .lock()
            .map(|usage| usage.values().map(|u| u.calls).sum())
            .unwrap_or(0)
    }

    pub fn reset(&self) {
        if let Ok(mut usage) = self.usage.lock() {
            usage.clear();
        }
    }

    /// One line per role that was used.
    pub fn summary(&self) -> String {
        let usage = match self.usage.lock() {
            Ok(usage) => usage.clone(),
            Err(_) => return String::new(),
        };
        if usage.is_empty() {
            return "No LLM calls".to_string();
        }
        usage
            .iter()
            .map(|(role, u)| {
                format!(
                    "{}: {} calls, {} prompt chars, {} response chars",
                    role.label(),
                    u.calls,
                    u.prompt_chars,
                    u.response_chars
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Wraps a model so every call is counted against `role`.
pub struct TrackedModel {
    inner: Box<dyn LanguageModel>,
    role: Role,
    tracker: Arc<UsageTracker>,
}

impl TrackedModel {
    pub fn new(inner: Box<dyn LanguageModel>, role: Role, tracker: Arc<UsageTracker>) -> Self {
        Self {
            inner,
            role,
            tracker,
        }
    }
}

#[async_trait::async_trait]
impl LanguageModel for TrackedModel {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self.inner.generate(prompt).await?;
        self.tracker.record(self.role, prompt, &response);
        tracing::debug!(role = %self.role, prompt_chars = prompt.len(), "LLM call");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::PlaceholderModel;

    #[tokio::test]
    async fn test_tracked_model_counts_calls() {
        let tracker = Arc::new(UsageTracker::new());
        let model = TrackedModel::new(
            Box::new(PlaceholderModel::new("openai", "gpt-5.1")),
            Role::Development,
            tracker.clone(),
        );

        let response = model.generate("abc").await.unwrap();
        model.generate("de").await.unwrap();

        let usage = tracker.get(Role::Development);
        assert_eq!(usage.calls, 2);
        assert_eq!(usage.prompt_chars, 5);
        assert_eq!(usage.response_chars, 2 * response.chars().count() as u64);
        assert_eq!(tracker.get(Role::DevilsAdvocate), RoleUsage::default());
        assert!(tracker.summary().starts_with("Development: 2 calls"));
    }

    #[test]
    fn test_reset() {
        let tracker = UsageTracker::new();
        tracker.record(Role::DevilsAdvocate, "p", "r");
        assert_eq!(tracker.total_calls(), 1);
        tracker.reset();
        assert_eq!(tracker.total_calls(), 0);
        assert_eq!(tracker.summary(), "No LLM calls");
    }
}
