use serde::{Deserialize, Deserializer, Serialize};

use crate::scoring::GradingResult;

/// One candidate document from the bibliographic search.
///
/// Unknown bibliographic values are `None` and persist as JSON `null`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Paper {
    #[serde(deserialize_with = "identifier")]
    pub scopus_id: String,
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "known")]
    pub authors: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub publication_name: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub cover_date: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub issn: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub eissn: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub r#abstract: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub cited_by_count: u64,
    #[serde(default, deserialize_with = "known")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "known")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grading: Option<GradingResult>,
}

impl Paper {
    pub fn new(scopus_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            scopus_id: scopus_id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Text the keyword criteria are matched against: title and abstract.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.title, self.r#abstract.as_deref().unwrap_or(""))
    }

    /// ISSN used for journal metrics, falling back to the electronic one.
    pub fn journal_issn(&self) -> Option<&str> {
        self.issn.as_deref().or(self.eissn.as_deref())
    }

    /// Publication year from the cover date ("2021-05-01" -> "2021").
    pub fn year(&self) -> Option<&str> {
        self.cover_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }

    /// Total score of the last grading pass, 0 when ungraded.
    pub fn total_score(&self) -> f64 {
        self.grading.as_ref().map(|g| g.total_score).unwrap_or(0.0)
    }

    /// Landing page for a human: the DOI resolver if known, else the Scopus link.
    pub fn web_url(&self) -> Option<String> {
        self.doi
            .as_ref()
            .map(|doi| format!("https://doi.org/{}", doi))
            .or_else(|| self.link.clone())
    }
}

/// Treat legacy placeholders as unknown.
pub(crate) fn normalize_known(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "N/A" && !s.eq_ignore_ascii_case("unknown"))
}

/// String form of a scalar; null, arrays and objects have none.
fn scalar_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Optional text field. Values of the wrong type are unknown.
fn known<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(normalize_known(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    }))
}

/// Title text; null or a non-string value becomes empty.
fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Scopus ids may be stored as numbers. A record without one is rejected.
fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    scalar_string(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| serde::de::Error::custom("scopus_id must be a non-empty string or number"))
}

/// Citation counts arrive as numbers or numeric strings; anything else is 0.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_count(&value))
}

pub(crate) fn parse_count(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_text_without_abstract() {
        let paper = Paper::new("1", "Nested data in hospitals");
        assert_eq!(paper.scoring_text(), "Nested data in hospitals ");
    }

    #[test]
    fn test_scoring_text_with_abstract() {
        let mut paper = Paper::new("1", "Title");
        paper.r#abstract = Some("Body".to_string());
        assert_eq!(paper.scoring_text(), "Title Body");
    }

    #[test]
    fn test_journal_issn_falls_back_to_eissn() {
        let mut paper = Paper::new("1", "t");
        assert!(paper.journal_issn().is_none());
        paper.eissn = Some("1873-5347".to_string());
        assert_eq!(paper.journal_issn(), Some("1873-5347"));
        paper.issn = Some("0277-9536".to_string());
        assert_eq!(paper.journal_issn(), Some("0277-9536"));
    }

    #[test]
    fn test_year() {
        let mut paper = Paper::new("1", "t");
        assert!(paper.year().is_none());
        paper.cover_date = Some("2021-05-01".to_string());
        assert_eq!(paper.year(), Some("2021"));
        paper.cover_date = Some("May".to_string());
        assert!(paper.year().is_none());
    }

    #[test]
    fn test_legacy_placeholders_load_as_unknown() {
        let json = r#"{
            "scopus_id": "85000000001",
            "title": "A study",
            "authors": "N/A",
            "doi": "unknown",
            "abstract": "",
            "issn": "0277-9536",
            "cited_by_count": "42"
        }"#;
        let paper: Paper = serde_json::from_str(json).unwrap();
        assert!(paper.authors.is_none());
        assert!(paper.doi.is_none());
        assert!(paper.r#abstract.is_none());
        assert_eq!(paper.issn.as_deref(), Some("0277-9536"));
        assert_eq!(paper.cited_by_count, 42);
        assert!(paper.grading.is_none());
    }

    #[test]
    fn test_wrongly_typed_fields_degrade() {
        let json = r#"{
            "scopus_id": 85000000002,
            "title": null,
            "authors": ["Silva A."],
            "doi": 42,
            "publication_name": {"name": "Health Policy"},
            "cited_by_count": null
        }"#;
        let paper: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.scopus_id, "85000000002");
        assert_eq!(paper.title, "");
        assert!(paper.authors.is_none());
        assert!(paper.doi.is_none());
        assert!(paper.publication_name.is_none());
        assert_eq!(paper.cited_by_count, 0);
    }

    #[test]
    fn test_missing_scopus_id_is_rejected() {
        assert!(serde_json::from_str::<Paper>(r#"{"title": "No id"}"#).is_err());
        assert!(serde_json::from_str::<Paper>(r#"{"scopus_id": null, "title": "t"}"#).is_err());
        assert!(serde_json::from_str::<Paper>(r#"{"scopus_id": " ", "title": "t"}"#).is_err());
    }

    #[test]
    fn test_unknown_serializes_as_null() {
        let paper = Paper::new("1", "t");
        let value = serde_json::to_value(&paper).unwrap();
        assert!(value["doi"].is_null());
        assert_eq!(value["cited_by_count"], 0);
        assert!(value.get("grading").is_none());
    }

    #[test]
    fn test_parse_count_variants() {
        assert_eq!(parse_count(&serde_json::json!(7)), 7);
        assert_eq!(parse_count(&serde_json::json!("12")), 12);
        assert_eq!(parse_count(&serde_json::json!("n/a")), 0);
        assert_eq!(parse_count(&serde_json::json!(-3)), 0);
        assert_eq!(parse_count(&serde_json::Value::Null), 0);
    }

    #[test]
    fn test_web_url_prefers_doi() {
        let mut paper = Paper::new("1", "t");
        paper.link = Some("https://www.scopus.com/record/1".to_string());
        assert_eq!(paper.web_url().as_deref(), Some("https://www.scopus.com/record/1"));
        paper.doi = Some("10.1000/xyz".to_string());
        assert_eq!(paper.web_url().as_deref(), Some("https://doi.org/10.1000/xyz"));
    }
}
