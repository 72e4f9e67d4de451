use serde::Deserialize;
use serde_json::Value;

use crate::paper::types::{normalize_known, parse_count};
use crate::paper::Paper;
use crate::scoring::JournalMetrics;

/// `/content/search/scopus` response envelope.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "search-results")]
    pub results: SearchResults,
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(rename = "opensearch:totalResults", default)]
    pub total_results: Value,
    #[serde(default)]
    pub entry: Vec<SearchEntry>,
}

impl SearchResults {
    /// Total hits reported by the server (sent as a string).
    pub fn total(&self) -> u64 {
        parse_count(&self.total_results)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchEntry {
    #[serde(rename = "dc:identifier")]
    pub identifier: Option<String>,
    #[serde(rename = "dc:title")]
    pub title: Option<String>,
    #[serde(rename = "dc:creator")]
    pub creator: Option<String>,
    #[serde(rename = "prism:publicationName")]
    pub publication_name: Option<String>,
    #[serde(rename = "prism:coverDate")]
    pub cover_date: Option<String>,
    #[serde(rename = "prism:doi")]
    pub doi: Option<String>,
    #[serde(rename = "prism:issn")]
    pub issn: Option<String>,
    #[serde(rename = "prism:eIssn")]
    pub eissn: Option<String>,
    #[serde(rename = "citedby-count", default)]
    pub cited_by_count: Value,
    #[serde(rename = "dc:description")]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Vec<EntryLink>,
    #[serde(default)]
    pub affiliation: Vec<EntryAffiliation>,
    /// Set on the placeholder entry Scopus returns for an empty result
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryLink {
    #[serde(rename = "@href")]
    pub href: Option<String>,
    #[serde(rename = "@ref")]
    pub rel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EntryAffiliation {
    pub affilname: Option<String>,
}

impl SearchEntry {
    /// Scopus id without the `SCOPUS_ID:` prefix.
    pub fn scopus_id(&self) -> Option<String> {
        let raw = self.identifier.as_deref()?.trim();
        let id = raw.strip_prefix("SCOPUS_ID:").unwrap_or(raw).trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Convert to a paper; `None` for error placeholders and id-less entries.
    pub fn into_paper(self) -> Option<Paper> {
        if self.error.is_some() {
            return None;
        }
        let scopus_id = self.scopus_id()?;
        let link = self
            .link
            .iter()
            .find(|l| l.rel.as_deref() == Some("scopus"))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone());

        Some(Paper {
            scopus_id,
            title: self.title.unwrap_or_default(),
            authors: normalize_known(self.creator),
            publication_name: normalize_known(self.publication_name),
            cover_date: normalize_known(self.cover_date),
            doi: normalize_known(self.doi),
            issn: normalize_known(self.issn),
            eissn: normalize_known(self.eissn),
            r#abstract: normalize_known(self.description),
            cited_by_count: parse_count(&self.cited_by_count),
            link: normalize_known(link),
            affiliation: normalize_known(self.affiliation.into_iter().next().and_then(|a| a.affilname)),
            grading: None,
        })
    }
}

/// Numbers arrive either as JSON numbers or as strings.
fn metric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Extract journal metrics from a `/content/serial/title/issn/{issn}` body.
///
/// Returns `None` when the response carries no serial entry at all.
pub fn parse_serial_metrics(body: &Value) -> Option<JournalMetrics> {
    let entry = body
        .get("serial-metadata-response")?
        .get("entry")?
        .as_array()?
        .first()?;

    let citescore = entry
        .pointer("/citeScoreYearInfoList/citeScoreCurrentMetric")
        .and_then(metric_value);
    let sjr = entry.pointer("/SJRList/SJR/0/$").and_then(metric_value);
    let snip = entry.pointer("/SNIPList/SNIP/0/$").and_then(metric_value);

    Some(JournalMetrics { citescore, sjr, snip })
}

/// A reference or citing paper; only what is needed to fetch it.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, PartialEq)]
pub struct RelatedPaper {
    pub title: Option<String>,
    pub doi: Option<String>,
    pub scopus_id: Option<String>,
}

/// References listed in an abstract retrieval response (`view=REF`).
pub fn parse_references(body: &Value, limit: usize) -> Vec<RelatedPaper> {
    let references = match body.pointer("/abstracts-retrieval-response/references/reference") {
        Some(Value::Array(items)) => items.clone(),
        // A single reference is sent as an object
        Some(item @ Value::Object(_)) => vec![item.clone()],
        _ => Vec::new(),
    };

    references
        .iter()
        .take(limit)
        .map(|reference| {
            let info = reference.get("ref-info");
            let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
            RelatedPaper {
                title: normalize_known(text(
                    info.and_then(|i| i.pointer("/ref-title/ref-titletext")),
                )),
                doi: normalize_known(text(info.and_then(|i| {
                    i.pointer("/refd-itemidlist/itemid/0/$")
                        .or_else(|| i.pointer("/refd-itemidlist/itemid/$"))
                }))),
                scopus_id: normalize_known(text(reference.get("scopus-id"))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_entry() -> Value {
        json!({
            "dc:identifier": "SCOPUS_ID:85012345678",
            "dc:title": "Multilevel models of NHS waiting times",
            "dc:creator": "Silva A.",
            "prism:publicationName": "Social Science & Medicine",
            "prism:coverDate": "2022-03-01",
            "prism:doi": "10.1016/j.socscimed.2022.1",
            "prism:issn": "02779536",
            "citedby-count": "57",
            "dc:description": "We use nested data.",
            "link": [
                {"@ref": "self", "@href": "https://api.elsevier.com/content/abstract/scopus_id/85012345678"},
                {"@ref": "scopus", "@href": "https://www.scopus.com/inward/record.uri?eid=2-s2.0-85012345678"}
            ],
            "affiliation": [{"affilname": "Universidade Nova de Lisboa"}]
        })
    }

    #[test]
    fn test_entry_into_paper() {
        let entry: SearchEntry = serde_json::from_value(sample_entry()).unwrap();
        let paper = entry.into_paper().unwrap();
        assert_eq!(paper.scopus_id, "85012345678");
        assert_eq!(paper.title, "Multilevel models of NHS waiting times");
        assert_eq!(paper.cited_by_count, 57);
        assert_eq!(paper.issn.as_deref(), Some("02779536"));
        assert!(paper.eissn.is_none());
        assert_eq!(paper.r#abstract.as_deref(), Some("We use nested data."));
        assert!(paper.link.unwrap().starts_with("https://www.scopus.com"));
        assert_eq!(paper.affiliation.as_deref(), Some("Universidade Nova de Lisboa"));
    }

    #[test]
    fn test_error_entry_skipped() {
        let body = json!({
            "search-results": {
                "opensearch:totalResults": "0",
                "entry": [{"@_fa": "true", "error": "Result set was empty"}]
            }
        });
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.results.total(), 0);
        let papers: Vec<Paper> = response
            .results
            .entry
            .into_iter()
            .filter_map(SearchEntry::into_paper)
            .collect();
        assert!(papers.is_empty());
    }

    #[test]
    fn test_parse_serial_metrics_strings_and_numbers() {
        let body = json!({
            "serial-metadata-response": {
                "entry": [{
                    "citeScoreYearInfoList": {"citeScoreCurrentMetric": "8.4"},
                    "SJRList": {"SJR": [{"@year": "2023", "$": "1.9"}]},
                    "SNIPList": {"SNIP": [{"@year": "2023", "$": 1.5}]}
                }]
            }
        });
        let metrics = parse_serial_metrics(&body).unwrap();
        assert_eq!(metrics.citescore, Some(8.4));
        assert_eq!(metrics.sjr, Some(1.9));
        assert_eq!(metrics.snip, Some(1.5));
    }

    #[test]
    fn test_parse_serial_metrics_missing_pieces() {
        let body = json!({"serial-metadata-response": {"entry": [{"dc:title": "X"}]}});
        let metrics = parse_serial_metrics(&body).unwrap();
        assert_eq!(metrics, JournalMetrics::default());

        assert!(parse_serial_metrics(&json!({"service-error": {}})).is_none());
    }

    #[test]
    fn test_parse_references() {
        let body = json!({
            "abstracts-retrieval-response": {
                "references": {
                    "reference": [
                        {
                            "scopus-id": "111",
                            "ref-info": {
                                "ref-title": {"ref-titletext": "Cited one"},
                                "refd-itemidlist": {"itemid": [{"@idtype": "DOI", "$": "10.1/a"}]}
                            }
                        },
                        {"scopus-id": "222", "ref-info": {}},
                        {"scopus-id": "333"}
                    ]
                }
            }
        });
        let refs = parse_references(&body, 2);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].title.as_deref(), Some("Cited one"));
        assert_eq!(refs[0].doi.as_deref(), Some("10.1/a"));
        assert_eq!(refs[1].scopus_id.as_deref(), Some("222"));
        assert!(refs[1].doi.is_none());
    }
}
