use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::types::Paper;

/// Load a paper list from a JSON file.
///
/// Returns an error if the file is missing or is not a JSON array; phases
/// that need the previous phase's output should say which phase to run
/// first. Records that are not valid papers are skipped with a warning.
pub fn load_papers(path: &Path) -> Result<Vec<Paper>> {
    let records: Vec<serde_json::Value> = read_json(path)?;
    let total = records.len();
    let papers: Vec<Paper> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(paper) => Some(paper),
            Err(e) => {
                tracing::warn!(index, error = %e, path = %path.display(), "Skipping malformed paper record");
                None
            }
        })
        .collect();
    if papers.len() < total {
        tracing::warn!(skipped = total - papers.len(), total, "Some paper records could not be loaded");
    }
    Ok(papers)
}

/// Save a paper list to a JSON file atomically.
pub fn save_papers(path: &Path, papers: &[Paper]) -> Result<()> {
    write_json(path, papers)
}

/// Drop papers whose Scopus id was already seen. First occurrence wins and
/// order is preserved.
pub fn dedupe_papers(papers: Vec<Paper>) -> Vec<Paper> {
    let mut seen = HashSet::new();
    papers
        .into_iter()
        .filter(|p| seen.insert(p.scopus_id.clone()))
        .collect()
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Write pretty JSON through a temp file so readers never see half a file.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;

    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

/// Write a text artifact (Markdown report, extracted text) atomically.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    write_bytes(path, contents.as_bytes())
}

/// Write raw bytes (downloaded PDFs) atomically.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
