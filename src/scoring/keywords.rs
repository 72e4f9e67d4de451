use serde::{Deserialize, Serialize};

/// Points per matched keyword for the high-signal lists.
pub const STRONG_POINTS: f64 = 10.0;
/// Points per matched keyword for fallback and topical lists.
pub const WEAK_POINTS: f64 = 5.0;

pub const STRONG_MULTILEVEL_TERMS: &[&str] = &[
    "hierarchical linear model",
    "HLM",
    "multilevel model",
    "nested data",
];

pub const WEAK_MULTILEVEL_TERMS: &[&str] = &["multilevel", "multi-level", "hierarchical"];

pub const EXPLICIT_MIXED_METHODS_TERMS: &[&str] = &[
    "mixed method",
    "mixed-method",
    "qualitative and quantitative",
];

pub const IMPLICIT_MIXED_METHODS_TERMS: &[&str] =
    &["multi-method", "triangulation", "convergent design"];

/// Count distinct keywords present in `text`, case-insensitively, and award
/// `per_match` points each up to `cap`.
///
/// A keyword occurring several times still counts once.
pub fn keyword_score<S: AsRef<str>>(text: &str, keywords: &[S], per_match: f64, cap: f64) -> f64 {
    let haystack = text.to_lowercase();
    let count = keywords
        .iter()
        .filter(|k| {
            let needle = k.as_ref().to_lowercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .count();
    (count as f64 * per_match).min(cap)
}

/// Keyword lists for the topical (PhD relevance) criteria.
///
/// Unlike the class relevance lists these are part of the config file, so a
/// different research context can be plugged in without touching the rubric.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct TopicKeywords {
    pub vbhc: Vec<String>,
    pub nhs_context: Vec<String>,
    pub portugal: Vec<String>,
}

impl Default for TopicKeywords {
    fn default() -> Self {
        fn owned(terms: &[&str]) -> Vec<String> {
            terms.iter().map(|s| s.to_string()).collect()
        }
        Self {
            vbhc: owned(&[
                "value-based healthcare",
                "VBHC",
                "value based care",
                "value-based care",
            ]),
            nhs_context: owned(&["national health service", "NHS", "Beveridge"]),
            portugal: owned(&["Portugal", "Portuguese"]),
        }
    }
}
