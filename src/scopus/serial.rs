use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;

use super::cache::MetricsCache;
use super::client::ScopusClient;
use super::error::ScopusError;
use super::types::parse_serial_metrics;
use crate::scoring::{normalize_issn, JournalMetrics, MetricsTable};

/// Default number of serial lookups in flight
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Look up one journal by ISSN.
///
/// `Ok(None)` when Scopus does not know the ISSN.
pub async fn journal_metrics(
    client: &ScopusClient,
    issn: &str,
) -> Result<Option<JournalMetrics>, ScopusError> {
    let path = format!("/content/serial/title/issn/{}", normalize_issn(issn));
    match client.get_json(&path, &[]).await {
        Ok(body) => Ok(parse_serial_metrics(&body)),
        Err(ScopusError::Status { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

async fn resolve(
    client: ScopusClient,
    cache: MetricsCache,
    issn: String,
) -> (String, Option<JournalMetrics>) {
    if let Some(metrics) = cache.get(&issn) {
        tracing::debug!(%issn, "Journal metrics from cache");
        return (issn, Some(metrics));
    }

    match journal_metrics(&client, &issn).await {
        Ok(found) => {
            // Unknown journals are cached as empty metrics so they are not re-queried
            let metrics = found.unwrap_or_default();
            if let Err(e) = cache.put(&issn, metrics) {
                tracing::warn!(%issn, error = %e, "Failed to cache journal metrics");
            }
            (issn, found)
        }
        Err(e) => {
            tracing::warn!(%issn, error = %e, "Journal metrics lookup failed");
            (issn, None)
        }
    }
}

/// Resolve metrics for every distinct ISSN with at most `concurrency`
/// lookups in flight.
///
/// Failed lookups are logged and left out of the table, which the grading
/// engine treats as unknown metrics.
pub async fn prefetch_metrics<I, S>(
    client: &ScopusClient,
    issns: I,
    concurrency: usize,
    cache: &MetricsCache,
) -> MetricsTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let unique: Vec<String> = issns
        .into_iter()
        .map(|issn| issn.as_ref().trim().to_string())
        .filter(|issn| !issn.is_empty() && seen.insert(normalize_issn(issn)))
        .collect();

    tracing::info!(journals = unique.len(), "Fetching journal metrics");

    let mut table = MetricsTable::new();
    let mut futures = FuturesUnordered::new();
    let mut issn_iter = unique.into_iter();

    // Fill initial batch
    for _ in 0..concurrency.max(1) {
        if let Some(issn) = issn_iter.next() {
            futures.push(resolve(client.clone(), cache.clone(), issn));
        }
    }

    // Process results and feed new tasks
    while let Some((issn, metrics)) = futures.next().await {
        if let Some(metrics) = metrics {
            table.insert(issn, metrics);
        }
        if let Some(next) = issn_iter.next() {
            futures.push(resolve(client.clone(), cache.clone(), next));
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scopus::cache::CacheConfig;
    use crate::scoring::MetricsProvider;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn serial_body(citescore: &str, sjr: &str) -> serde_json::Value {
        json!({
            "serial-metadata-response": {
                "entry": [{
                    "citeScoreYearInfoList": {"citeScoreCurrentMetric": citescore},
                    "SJRList": {"SJR": [{"$": sjr}]}
                }]
            }
        })
    }

    fn no_cache() -> MetricsCache {
        MetricsCache::at(
            std::env::temp_dir().join("lit-review-unused-cache"),
            CacheConfig {
                enabled: false,
                ttl: Duration::ZERO,
            },
        )
    }

    fn client(server: &MockServer) -> ScopusClient {
        ScopusClient::with_base_url(&server.uri(), "k", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_journal_metrics_unknown_issn() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let found = journal_metrics(&client(&server), "0000-0000").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_prefetch_dedupes_issns() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/serial/title/issn/02779536"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serial_body("10.0", "2.5")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/content/serial/title/issn/11111111"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let table = prefetch_metrics(
            &client(&server),
            ["0277-9536", "02779536", " ", "1111-1111"],
            2,
            &no_cache(),
        )
        .await;

        assert_eq!(table.len(), 1);
        let metrics = table.lookup("0277-9536").unwrap();
        assert_eq!(metrics.citescore, Some(10.0));
        assert_eq!(metrics.sjr, Some(2.5));
        assert!(table.lookup("1111-1111").is_none());
    }

    #[tokio::test]
    async fn test_prefetch_uses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serial_body("4.0", "1.0")))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = MetricsCache::at(
            dir.path().to_path_buf(),
            CacheConfig {
                enabled: true,
                ttl: Duration::from_secs(3600),
            },
        );
        let client = client(&server);

        let first = prefetch_metrics(&client, ["12345678"], 8, &cache).await;
        let second = prefetch_metrics(&client, ["12345678"], 8, &cache).await;
        assert_eq!(first.lookup("12345678"), second.lookup("12345678"));
        assert_eq!(second.lookup("12345678").unwrap().citescore, Some(4.0));
    }
}
