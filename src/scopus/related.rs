use super::client::ScopusClient;
use super::error::ScopusError;
use super::types::{parse_references, RelatedPaper, SearchResponse};

/// Papers cited by `scopus_id`, from the abstract's reference list.
pub async fn references(
    client: &ScopusClient,
    scopus_id: &str,
    limit: usize,
) -> Result<Vec<RelatedPaper>, ScopusError> {
    let path = format!("/content/abstract/scopus_id/{}", scopus_id);
    let body = client.get_json(&path, &[("view", "REF".to_string())]).await?;
    Ok(parse_references(&body, limit))
}

/// Papers that cite `scopus_id`.
pub async fn citing_papers(
    client: &ScopusClient,
    scopus_id: &str,
    limit: usize,
) -> Result<Vec<RelatedPaper>, ScopusError> {
    let body = client
        .get_json(
            "/content/search/scopus",
            &[
                ("query", format!("REF({})", scopus_id)),
                ("count", limit.to_string()),
            ],
        )
        .await?;
    let response: SearchResponse = serde_json::from_value(body)?;

    Ok(response
        .results
        .entry
        .into_iter()
        .filter_map(|entry| entry.into_paper())
        .take(limit)
        .map(|paper| RelatedPaper {
            title: Some(paper.title).filter(|t| !t.is_empty()),
            doi: paper.doi,
            scopus_id: Some(paper.scopus_id),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ScopusClient {
        ScopusClient::with_base_url(&server.uri(), "k", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_references_use_ref_view() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/abstract/scopus_id/42"))
            .and(query_param("view", "REF"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "abstracts-retrieval-response": {
                    "references": {
                        "reference": {
                            "scopus-id": "7",
                            "ref-info": {"ref-title": {"ref-titletext": "Only one"}}
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let refs = references(&client(&server), "42", 10).await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].title.as_deref(), Some("Only one"));
        assert_eq!(refs[0].scopus_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_citing_papers_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/search/scopus"))
            .and(query_param("query", "REF(42)"))
            .and(query_param("count", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search-results": {
                    "opensearch:totalResults": "3",
                    "entry": [
                        {"dc:identifier": "SCOPUS_ID:1", "dc:title": "A", "prism:doi": "10.1/a"},
                        {"dc:identifier": "SCOPUS_ID:2", "dc:title": "B"}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let citing = citing_papers(&client(&server), "42", 2).await.unwrap();
        assert_eq!(citing.len(), 2);
        assert_eq!(citing[0].doi.as_deref(), Some("10.1/a"));
        assert!(citing[1].doi.is_none());
    }
}
