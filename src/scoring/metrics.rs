use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bibliometric indicators of a journal. Any of them may be unknown.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
pub struct JournalMetrics {
    pub citescore: Option<f64>,
    pub sjr: Option<f64>,
    pub snip: Option<f64>,
}

/// Source of journal metrics keyed by ISSN.
///
/// `None` covers every failure mode (unknown journal, network error, bad
/// payload); the grading engine treats them all as "unknown".
pub trait MetricsProvider {
    fn lookup(&self, issn: &str) -> Option<JournalMetrics>;
}

/// Pre-resolved metrics, filled once per distinct ISSN before grading.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    entries: HashMap<String, JournalMetrics>,
}

impl MetricsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, issn: impl Into<String>, metrics: JournalMetrics) {
        self.entries.insert(normalize_issn(&issn.into()), metrics);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetricsProvider for MetricsTable {
    fn lookup(&self, issn: &str) -> Option<JournalMetrics> {
        self.entries.get(&normalize_issn(issn)).copied()
    }
}

/// Canonical ISSN form: digits and `X` only, uppercase (`1234-567x` -> `1234567X`).
pub fn normalize_issn(issn: &str) -> String {
    issn.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
