use crate::credentials::get_env_secret;

/// One selectable model of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    pub key: &'static str,
    pub id: &'static str,
}

/// A supported LLM provider and the models offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Environment variable holding the API key
    pub env_var: &'static str,
    pub models: &'static [ModelOption],
    pub recommended_dev: &'static str,
    pub recommended_advocate: &'static str,
}

impl ProviderInfo {
    pub fn model(&self, key: &str) -> Option<&'static ModelOption> {
        self.models.iter().find(|m| m.key == key)
    }
}

const fn model(key: &'static str, id: &'static str) -> ModelOption {
    ModelOption { key, id }
}

pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "anthropic",
        name: "Anthropic Claude",
        env_var: "ANTHROPIC_API_KEY",
        models: &[
            model("opus_4.1", "claude-opus-4.1"),
            model("sonnet_4.5", "claude-sonnet-4.5"),
            model("haiku_4.5", "claude-haiku-4.5"),
        ],
        recommended_dev: "sonnet_4.5",
        recommended_advocate: "haiku_4.5",
    },
    ProviderInfo {
        id: "openai",
        name: "OpenAI GPT",
        env_var: "OPENAI_API_KEY",
        models: &[
            model("gpt_5.1", "gpt-5.1"),
            model("gpt_5_mini", "gpt-5-mini"),
            model("gpt_5_nano", "gpt-5-nano"),
            model("gpt_4.1", "gpt-4.1"),
            model("o1", "o1"),
            model("o1_mini", "o1-mini"),
        ],
        recommended_dev: "gpt_5.1",
        recommended_advocate: "gpt_5_nano",
    },
    ProviderInfo {
        id: "google",
        name: "Google Gemini",
        env_var: "GOOGLE_API_KEY",
        models: &[
            model("gemini_3_pro", "gemini-3-pro-preview"),
            model("gemini_2.5_pro", "gemini-2.5-pro"),
            model("gemini_2.5_flash", "gemini-2.5-flash"),
            model("gemini_2.5_flash_lite", "gemini-2.5-flash-lite"),
        ],
        recommended_dev: "gemini_2.5_pro",
        recommended_advocate: "gemini_2.5_flash",
    },
    ProviderInfo {
        id: "xai",
        name: "xAI Grok",
        env_var: "XAI_API_KEY",
        models: &[
            model("grok_4.1", "grok-4.1"),
            model("grok_4.1_fast", "grok-4.1-fast"),
            model("grok_4", "grok-4"),
        ],
        recommended_dev: "grok_4.1",
        recommended_advocate: "grok_4.1_fast",
    },
];

pub fn provider(id: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Providers whose API key is present in the environment, in catalog order.
pub fn detect_available() -> Vec<&'static ProviderInfo> {
    detect_available_with(|var| get_env_secret(var).is_some())
}

pub fn detect_available_with(has_key: impl Fn(&str) -> bool) -> Vec<&'static ProviderInfo> {
    PROVIDERS.iter().filter(|p| has_key(p.env_var)).collect()
}
