use anyhow::{Context, Result};

/// Open a paper page (DOI resolver, Scopus record or Scholar search) in the
/// user's default browser.
///
/// # Errors
/// Returns error if the URL is not http(s) or no browser can be opened
pub fn open_url(url: &str) -> Result<()> {
    check_web_url(url)?;
    tracing::debug!(url, "Opening browser");
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

fn check_web_url(url: &str) -> Result<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        anyhow::bail!("Refusing to open non-web URL: {}", url)
    }
}
