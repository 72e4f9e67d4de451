use anyhow::{Context, Result};

use super::{find_scopus_key, SCOPUS_KEY_VAR};

/// Prompts user to enter the Scopus API key (input hidden)
pub fn prompt_for_api_key() -> Result<String> {
    println!("Scopus API key required.");
    println!("Create one at: https://dev.elsevier.com/apikey/manage");
    println!("Tip: export {} or add it to .env to skip this prompt", SCOPUS_KEY_VAR);
    println!();

    let key = rpassword::prompt_password("Enter API key: ")
        .context("Failed to read API key from stdin")?;

    let key = key.trim();

    if key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    Ok(key.to_string())
}

/// Resolve the Scopus key: environment, then config, then an interactive
/// prompt when `interactive` is set.
pub fn resolve_scopus_key(config_key: Option<&str>, interactive: bool) -> Result<String> {
    if let Some(key) = find_scopus_key(config_key) {
        return Ok(key);
    }
    if !interactive {
        anyhow::bail!(
            "No Scopus API key found. Set {} or scopus.api_key in the config file.",
            SCOPUS_KEY_VAR
        );
    }
    prompt_for_api_key()
}
