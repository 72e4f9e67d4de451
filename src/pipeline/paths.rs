use anyhow::{Context, Result};
use chrono::Local;
use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::report::{FINAL_REPORT_FILE, PRESENTATION_FILE, TOP_PAPERS_FILE};

pub const SCOPUS_RESULTS_FILE: &str = "scopus_results.json";
pub const GRADED_PAPERS_FILE: &str = "graded_papers.json";
/// Normalized weights the last grading pass used
pub const GRADING_WEIGHTS_FILE: &str = "grading_weights.json";
pub const SELECTED_PAPER_DIR: &str = "selected_paper";

const RUN_PREFIX: &str = "run_";

/// Layout of one run folder. Every phase reads and writes inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    root: PathBuf,
}

impl RunPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `<output_dir>/run_YYYYmmdd_HHMMSS`, with a numeric suffix if
    /// that folder already exists.
    pub fn create_new(output_dir: &Path) -> Result<Self> {
        let base = format!("{}{}", RUN_PREFIX, Local::now().format("%Y%m%d_%H%M%S"));
        let mut candidate = output_dir.join(&base);
        let mut suffix = 2;
        while candidate.exists() {
            candidate = output_dir.join(format!("{}_{}", base, suffix));
            suffix += 1;
        }
        std::fs::create_dir_all(&candidate)
            .with_context(|| format!("Failed to create run folder {}", candidate.display()))?;
        tracing::info!(path = %candidate.display(), "Created run folder");
        Ok(Self::new(candidate))
    }

    /// Most recent `run_*` folder in `output_dir`, by name.
    pub fn latest(output_dir: &Path) -> Result<Option<Self>> {
        let pattern = format!(
            "{}/{}*",
            Pattern::escape(&output_dir.to_string_lossy()),
            RUN_PREFIX
        );
        let latest = glob::glob(&pattern)
            .context("Invalid run folder pattern")?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_dir())
            .max_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(latest.map(Self::new))
    }

    /// The run folder a phase command works in: `explicit` if given, else the
    /// latest run in `output_dir`, else a new one.
    pub fn resolve(explicit: Option<PathBuf>, output_dir: &Path) -> Result<Self> {
        if let Some(dir) = explicit {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create run folder {}", dir.display()))?;
            return Ok(Self::new(dir));
        }
        match Self::latest(output_dir)? {
            Some(paths) => {
                tracing::debug!(path = %paths.root.display(), "Using latest run folder");
                Ok(paths)
            }
            None => Self::create_new(output_dir),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scopus_results(&self) -> PathBuf {
        self.root.join(SCOPUS_RESULTS_FILE)
    }

    pub fn graded_papers(&self) -> PathBuf {
        self.root.join(GRADED_PAPERS_FILE)
    }

    pub fn grading_weights(&self) -> PathBuf {
        self.root.join(GRADING_WEIGHTS_FILE)
    }

    pub fn top_papers(&self) -> PathBuf {
        self.root.join(TOP_PAPERS_FILE)
    }

    pub fn selected_paper(&self) -> PathBuf {
        self.root.join(SELECTED_PAPER_DIR)
    }

    pub fn final_report(&self) -> PathBuf {
        self.root.join(FINAL_REPORT_FILE)
    }

    pub fn presentation(&self) -> PathBuf {
        self.root.join(PRESENTATION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_new_adds_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let first = RunPaths::create_new(dir.path()).unwrap();
        let second = RunPaths::create_new(dir.path()).unwrap();
        assert!(first.root().is_dir());
        assert!(second.root().is_dir());
        assert_ne!(first, second);
        let name = first.root().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("run_"));
    }

    #[test]
    fn test_latest_picks_newest_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunPaths::latest(dir.path()).unwrap().is_none());

        std::fs::create_dir(dir.path().join("run_20250101_090000")).unwrap();
        std::fs::create_dir(dir.path().join("run_20251120_143000")).unwrap();
        std::fs::write(dir.path().join("run_99999999_999999"), "not a folder").unwrap();
        std::fs::create_dir(dir.path().join("other")).unwrap();

        let latest = RunPaths::latest(dir.path()).unwrap().unwrap();
        assert_eq!(latest.root(), dir.path().join("run_20251120_143000"));
    }

    #[test]
    fn test_resolve_explicit_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("mine");
        let paths = RunPaths::resolve(Some(explicit.clone()), dir.path()).unwrap();
        assert_eq!(paths.root(), explicit);
        assert!(explicit.is_dir());

        let fresh = RunPaths::resolve(None, dir.path()).unwrap();
        assert!(fresh.root().starts_with(dir.path()));
        assert_eq!(RunPaths::resolve(None, dir.path()).unwrap(), fresh);
    }

    #[test]
    fn test_file_layout() {
        let paths = RunPaths::new("/tmp/run_x");
        assert_eq!(paths.graded_papers(), PathBuf::from("/tmp/run_x/graded_papers.json"));
        assert_eq!(paths.top_papers(), PathBuf::from("/tmp/run_x/top_papers.md"));
        assert_eq!(paths.selected_paper(), PathBuf::from("/tmp/run_x/selected_paper"));
    }
}
