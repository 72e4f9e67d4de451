use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::client::ScopusClient;
use super::error::ScopusError;
use super::types::{SearchEntry, SearchResponse};
use crate::config::{SearchConfig, SearchKeywords};
use crate::paper::Paper;

const SEARCH_PATH: &str = "/content/search/scopus";

/// Scopus' per-request page limit for the standard view
pub const PAGE_SIZE: usize = 25;

/// Result of the strict-then-relaxed search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub papers: Vec<Paper>,
    pub query: String,
    pub strict: bool,
}

fn quoted_group(terms: &[String]) -> String {
    let joined = terms
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "")))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({})", joined)
}

/// Build the boolean query.
///
/// The relaxed form only requires a multilevel term and a mixed-methods term;
/// the strict form additionally needs a VBHC term and a context term. Empty
/// optional groups are left out rather than producing `()`.
pub fn build_search_query(keywords: &SearchKeywords, strict: bool) -> String {
    let mut groups = vec![
        quoted_group(&keywords.multilevel),
        quoted_group(&keywords.mixed_methods),
    ];
    if strict {
        for extra in [&keywords.vbhc, &keywords.context] {
            if !extra.is_empty() {
                groups.push(quoted_group(extra));
            }
        }
    }
    groups.join(" AND ")
}

async fn fetch_page(
    client: &ScopusClient,
    query: &str,
    start: usize,
    count: usize,
) -> Result<SearchResponse, ScopusError> {
    // Retry strategy: exponential backoff with 3 attempts, transient failures only
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .max_delay(std::time::Duration::from_secs(5))
        .take(3);

    let body = RetryIf::spawn(
        retry_strategy,
        || async {
            client
                .get_json(
                    SEARCH_PATH,
                    &[
                        ("query", query.to_string()),
                        ("count", count.to_string()),
                        ("start", start.to_string()),
                    ],
                )
                .await
        },
        |e: &ScopusError| e.is_transient(),
    )
    .await?;

    Ok(serde_json::from_value(body)?)
}

/// Run one query, paging until `max_results`, the reported total, or an
/// empty page.
///
/// A failure on the first page is returned as an error. A failure on a later
/// page ends the search with what was collected so far.
pub async fn search(
    client: &ScopusClient,
    query: &str,
    max_results: usize,
) -> Result<Vec<Paper>, ScopusError> {
    let count = max_results.clamp(1, PAGE_SIZE);
    let mut papers = Vec::new();
    let mut start = 0;

    while papers.len() < max_results {
        let page = match fetch_page(client, query, start, count).await {
            Ok(page) => page,
            Err(e) if start == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(start, error = %e, "Search page failed, keeping partial results");
                break;
            }
        };

        let total = page.results.total();
        let received = page.results.entry.len();
        if received == 0 {
            break;
        }

        papers.extend(
            page.results
                .entry
                .into_iter()
                .filter_map(SearchEntry::into_paper),
        );
        tracing::debug!(start, received, total, "Fetched search page");

        start += received;
        if start as u64 >= total {
            break;
        }
    }

    papers.truncate(max_results);
    Ok(papers)
}

/// Strict query first; if it yields fewer than `min_results`, the relaxed
/// query's results replace it.
pub async fn execute_search(
    client: &ScopusClient,
    config: &SearchConfig,
) -> Result<SearchOutcome, ScopusError> {
    let strict_query = build_search_query(&config.keywords, true);
    tracing::info!(query = %strict_query, "Running strict search");
    let papers = search(client, &strict_query, config.max_results).await?;

    if papers.len() >= config.min_results {
        return Ok(SearchOutcome {
            papers,
            query: strict_query,
            strict: true,
        });
    }

    let relaxed_query = build_search_query(&config.keywords, false);
    tracing::info!(
        strict_results = papers.len(),
        min_results = config.min_results,
        query = %relaxed_query,
        "Too few strict results, running relaxed search"
    );
    let papers = search(client, &relaxed_query, config.max_results).await?;

    Ok(SearchOutcome {
        papers,
        query: relaxed_query,
        strict: false,
    })
}
