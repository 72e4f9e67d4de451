use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::paper::Paper;
use crate::prompt::Prompter;

/// Path of a PDF copied in place of the manual download, for unattended runs.
pub const DEMO_PDF_VAR: &str = "LIT_REVIEW_DEMO_PDF";

/// File name the user is asked to save the paper under.
pub const MANUAL_PDF_NAME: &str = "paper.pdf";

pub fn demo_pdf_from_env() -> Option<PathBuf> {
    std::env::var(DEMO_PDF_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Google Scholar search for the paper's title.
pub fn scholar_url(title: &str) -> String {
    let query = title.split_whitespace().collect::<Vec<_>>().join("+");
    format!("https://scholar.google.com/scholar?q={}", query)
}

fn print_instructions(paper: &Paper, dir: &Path) {
    println!();
    println!("Manual PDF upload required");
    println!("Automatic download failed. Please download the paper yourself:");
    println!();
    println!("Title: {}", paper.title);
    println!("DOI:   {}", paper.doi.as_deref().unwrap_or("unknown"));
    println!();
    println!("Suggested sources:");
    if let Some(ref doi) = paper.doi {
        println!("  - https://doi.org/{}", doi);
    }
    println!("  - Google Scholar: {}", scholar_url(&paper.title));
    println!("  - The publisher's website");
    println!();
    println!("Save the PDF to: {}", dir.display());
    println!("File name:       {}", MANUAL_PDF_NAME);
}

/// `paper.pdf` in `dir`, or the only `*.pdf` there if exactly one exists.
pub fn find_local_pdf(dir: &Path) -> Result<Option<PathBuf>> {
    let preferred = dir.join(MANUAL_PDF_NAME);
    if preferred.is_file() {
        return Ok(Some(preferred));
    }

    let pattern = format!("{}/*.pdf", glob::Pattern::escape(&dir.to_string_lossy()));
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .context("Invalid PDF search pattern")?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    match found.len() {
        1 => Ok(found.pop()),
        0 => Ok(None),
        n => {
            tracing::warn!(count = n, dir = %dir.display(), "Several PDFs found, expected {}", MANUAL_PDF_NAME);
            Ok(None)
        }
    }
}

/// Ask the user to place the PDF by hand.
///
/// With a demo PDF the file is copied in without waiting. Otherwise the user
/// is asked to press Enter once the file is in place.
pub fn manual_fallback(
    paper: &Paper,
    dir: &Path,
    prompter: &Prompter,
    open_browser: bool,
    demo_pdf: Option<&Path>,
) -> Result<Option<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    print_instructions(paper, dir);

    if let Some(demo) = demo_pdf {
        if demo.is_file() {
            let target = dir.join(MANUAL_PDF_NAME);
            println!("\n[DEMO MODE] Copying PDF from {}", demo.display());
            std::fs::copy(demo, &target)
                .with_context(|| format!("Failed to copy demo PDF {}", demo.display()))?;
            return Ok(Some(target));
        }
        tracing::warn!(path = %demo.display(), "Demo PDF does not exist, falling back to manual upload");
    }

    if open_browser {
        if let Some(url) = paper.web_url() {
            if let Err(e) = crate::browser::open_url(&url) {
                tracing::warn!(error = %e, "Could not open browser");
            }
        }
    }

    prompter.wait_for_enter("\nPress Enter once you've placed the PDF in the folder...")?;

    let found = find_local_pdf(dir)?;
    match found {
        Some(ref path) => println!("PDF found: {}", path.display()),
        None => println!("PDF not found in {}", dir.display()),
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scholar_url() {
        assert_eq!(
            scholar_url("Multilevel  models of care"),
            "https://scholar.google.com/scholar?q=Multilevel+models+of+care"
        );
    }

    #[test]
    fn test_find_local_pdf_prefers_paper_pdf() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("paper.pdf"), b"%PDF").unwrap();
        assert_eq!(
            find_local_pdf(dir.path()).unwrap(),
            Some(dir.path().join("paper.pdf"))
        );
    }

    #[test]
    fn test_find_local_pdf_single_or_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_local_pdf(dir.path()).unwrap(), None);

        std::fs::write(dir.path().join("download (1).pdf"), b"%PDF").unwrap();
        assert_eq!(
            find_local_pdf(dir.path()).unwrap(),
            Some(dir.path().join("download (1).pdf"))
        );

        std::fs::write(dir.path().join("second.pdf"), b"%PDF").unwrap();
        assert_eq!(find_local_pdf(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_demo_pdf_is_copied() {
        let source = tempfile::tempdir().unwrap();
        let demo = source.path().join("demo.pdf");
        std::fs::write(&demo, b"%PDF-demo").unwrap();

        let target = tempfile::tempdir().unwrap();
        let dir = target.path().join("selected_paper");
        let prompter = Prompter::scripted(vec![]);

        let path = manual_fallback(&Paper::new("1", "T"), &dir, &prompter, false, Some(&demo))
            .unwrap()
            .unwrap();
        assert_eq!(path, dir.join(MANUAL_PDF_NAME));
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-demo");
    }

    #[test]
    fn test_manual_without_file_returns_none() {
        let target = tempfile::tempdir().unwrap();
        let prompter = Prompter::scripted(vec![String::new()]);
        let found = manual_fallback(&Paper::new("1", "T"), target.path(), &prompter, false, None).unwrap();
        assert!(found.is_none());
    }
}
