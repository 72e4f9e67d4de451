pub mod prompt;

/// Environment variable for the Elsevier/Scopus API key
pub const SCOPUS_KEY_VAR: &str = "SCOPUS_API_KEY";

// Re-export prompt functions for convenience
pub use prompt::{prompt_for_api_key, resolve_scopus_key};

/// Read a non-empty, trimmed value from an environment variable.
pub fn get_env_secret(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Scopus key from the environment or the config file, whichever comes first.
pub fn find_scopus_key(config_key: Option<&str>) -> Option<String> {
    pick_key(get_env_secret(SCOPUS_KEY_VAR), config_key)
}

fn pick_key(env_key: Option<String>, config_key: Option<&str>) -> Option<String> {
    env_key.or_else(|| {
        config_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    })
}
