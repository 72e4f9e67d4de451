pub mod download;
pub mod manual;
pub mod pdf;

pub use download::{doi_file_stem, Downloader, PdfSource};
pub use manual::{demo_pdf_from_env, find_local_pdf, manual_fallback, scholar_url};
pub use pdf::extract_pdf_text;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paper::{write_bytes, write_json, write_text, Paper};
use crate::prompt::Prompter;
use crate::scopus::{self, RelatedPaper};

pub const PAPER_TEXT_FILE: &str = "paper_text.txt";
pub const PAPER_METADATA_FILE: &str = "paper_metadata.json";
pub const RELATED_METADATA_FILE: &str = "related_papers_metadata.json";

/// Related-paper lookup results saved next to the selected paper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelatedPapers {
    pub cited_papers: Vec<RelatedPaper>,
    pub citing_papers: Vec<RelatedPaper>,
    pub cited_downloaded: usize,
    pub citing_downloaded: usize,
}

/// Outcome of fetching the selected paper.
#[derive(Debug, Clone)]
pub struct RetrievedPaper {
    pub pdf_path: PathBuf,
    pub source: PdfSource,
    /// Characters of extracted text, `None` when extraction failed
    pub text_chars: Option<usize>,
}

/// Options for the manual fallback step.
#[derive(Debug, Clone, Default)]
pub struct ManualOptions {
    pub open_browser: bool,
    pub demo_pdf: Option<PathBuf>,
}

/// Obtain the selected paper's PDF into `dir`, extract its text and save its
/// metadata.
///
/// Returns `Ok(None)` when no PDF could be obtained, automatically or by hand.
pub async fn retrieve_paper(
    downloader: &Downloader,
    paper: &Paper,
    dir: &Path,
    prompter: &Prompter,
    manual: &ManualOptions,
) -> Result<Option<RetrievedPaper>> {
    let (pdf_path, source) = match downloader.download(paper).await {
        Some((source, bytes)) => {
            let stem = match (source, paper.doi.as_deref()) {
                (PdfSource::Scopus, _) | (_, None) => paper.scopus_id.clone(),
                (_, Some(doi)) => doi_file_stem(doi),
            };
            let path = dir.join(format!("{}.pdf", stem));
            write_bytes(&path, &bytes)?;
            println!("Downloaded from {}", source);
            (path, source)
        }
        None => {
            println!("All automatic download methods failed");
            match manual_fallback(
                paper,
                dir,
                prompter,
                manual.open_browser,
                manual.demo_pdf.as_deref(),
            )? {
                Some(path) => (path, PdfSource::Manual),
                None => return Ok(None),
            }
        }
    };

    let text_chars = match extract_pdf_text(&pdf_path) {
        Ok(text) => {
            write_text(&dir.join(PAPER_TEXT_FILE), &text)?;
            let chars = text.chars().count();
            println!("Text extracted: {} characters", chars);
            Some(chars)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Text extraction failed, the PDF is still available");
            None
        }
    };

    write_json(&dir.join(PAPER_METADATA_FILE), paper)?;

    Ok(Some(RetrievedPaper {
        pdf_path,
        source,
        text_chars,
    }))
}

fn short_title(related: &RelatedPaper) -> String {
    let title = related.title.as_deref().unwrap_or("(untitled)");
    let mut short: String = title.chars().take(60).collect();
    if title.chars().count() > 60 {
        short.push_str("...");
    }
    short
}

/// Fetch open-access copies of `papers` into `dir` as `{prefix}_{i}_{doi}.pdf`.
async fn download_open_access(
    downloader: &Downloader,
    papers: &[RelatedPaper],
    dir: &Path,
    prefix: &str,
) -> Result<usize> {
    let mut downloaded = 0;
    for (i, related) in papers.iter().enumerate() {
        let index = i + 1;
        println!("  [{}/{}] {}", index, papers.len(), short_title(related));
        let Some(ref doi) = related.doi else {
            continue;
        };
        if let Some(bytes) = downloader.from_unpaywall(doi).await {
            let path = dir.join(format!("{}_{}_{}.pdf", prefix, index, doi_file_stem(doi)));
            write_bytes(&path, &bytes)?;
            downloaded += 1;
            println!("    Downloaded");
        }
    }
    Ok(downloaded)
}

/// Look up references and citing papers of `paper`, download what is open
/// access, and save the lookup as `related_papers_metadata.json`.
///
/// Lookup failures leave the corresponding list empty.
pub async fn download_related(
    downloader: &Downloader,
    paper: &Paper,
    dir: &Path,
    limit: usize,
) -> Result<RelatedPapers> {
    let cited_dir = dir.join("cited_papers");
    let citing_dir = dir.join("citing_papers");
    std::fs::create_dir_all(&cited_dir)?;
    std::fs::create_dir_all(&citing_dir)?;

    let (cited_papers, citing_papers) = match downloader.scopus() {
        Some(client) => {
            let cited = scopus::references(client, &paper.scopus_id, limit)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to fetch cited papers");
                    Vec::new()
                });
            let citing = scopus::citing_papers(client, &paper.scopus_id, limit)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to fetch citing papers");
                    Vec::new()
                });
            (cited, citing)
        }
        None => (Vec::new(), Vec::new()),
    };

    println!("[1/2] Cited papers (references): {} found", cited_papers.len());
    let cited_downloaded = download_open_access(downloader, &cited_papers, &cited_dir, "cited").await?;
    println!("Downloaded {}/{} cited papers", cited_downloaded, cited_papers.len());

    println!("[2/2] Citing papers: {} found", citing_papers.len());
    let citing_downloaded =
        download_open_access(downloader, &citing_papers, &citing_dir, "citing").await?;
    println!("Downloaded {}/{} citing papers", citing_downloaded, citing_papers.len());

    let related = RelatedPapers {
        cited_papers,
        citing_papers,
        cited_downloaded,
        citing_downloaded,
    };
    write_json(&dir.join(RELATED_METADATA_FILE), &related)?;
    Ok(related)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader(server: &MockServer) -> Downloader {
        let scopus =
            crate::scopus::ScopusClient::with_base_url(&server.uri(), "k", Duration::from_secs(5))
                .unwrap();
        Downloader::new(Some(scopus), Some("me@uni.pt".into()), Duration::from_secs(5))
            .unwrap()
            .with_endpoints(&format!("{}/doi", server.uri()), &format!("{}/unpaywall", server.uri()))
    }

    #[tokio::test]
    async fn test_retrieve_saves_pdf_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/article/scopus_id/77"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.4 not really".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let paper = Paper::new("77", "Selected");
        let retrieved = retrieve_paper(
            &downloader(&server),
            &paper,
            dir.path(),
            &Prompter::scripted(vec![]),
            &ManualOptions::default(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(retrieved.source, PdfSource::Scopus);
        assert_eq!(retrieved.pdf_path, dir.path().join("77.pdf"));
        // Broken PDF: extraction fails without failing the phase
        assert!(retrieved.text_chars.is_none());
        let saved: Paper = crate::paper::read_json(&dir.path().join(PAPER_METADATA_FILE)).unwrap();
        assert_eq!(saved, paper);
    }

    #[tokio::test]
    async fn test_related_downloads_open_access() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content/abstract/scopus_id/77"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "abstracts-retrieval-response": {"references": {"reference": [
                    {"scopus-id": "1", "ref-info": {
                        "ref-title": {"ref-titletext": "Open one"},
                        "refd-itemidlist": {"itemid": [{"$": "10.5/open"}]}
                    }},
                    {"scopus-id": "2", "ref-info": {"ref-title": {"ref-titletext": "No DOI"}}}
                ]}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/content/search/scopus"))
            .and(query_param("query", "REF(77)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "search-results": {"opensearch:totalResults": "1", "entry": [
                    {"dc:identifier": "SCOPUS_ID:3", "dc:title": "Closed", "prism:doi": "10.5/closed"}
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/unpaywall/10.5/open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "best_oa_location": {"url_for_pdf": format!("{}/files/open.pdf", server.uri())}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/open.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/unpaywall/10.5/closed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"best_oa_location": null})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let related = download_related(&downloader(&server), &Paper::new("77", "Selected"), dir.path(), 10)
            .await
            .unwrap();

        assert_eq!(related.cited_papers.len(), 2);
        assert_eq!(related.citing_papers.len(), 1);
        assert_eq!(related.cited_downloaded, 1);
        assert_eq!(related.citing_downloaded, 0);
        assert!(dir.path().join("cited_papers/cited_1_10.5_open.pdf").is_file());

        let saved: RelatedPapers = crate::paper::read_json(&dir.path().join(RELATED_METADATA_FILE)).unwrap();
        assert_eq!(saved, related);
    }
}
