use chrono::{DateTime, Local};
use std::path::Path;

use super::{or_unknown, paper_breakdown, TOP_PAPERS_FILE};
use crate::evaluation::{EVALUATION_DRAFT_FILE, EVALUATION_FINAL_FILE};
use crate::llm::LLM_CONFIG_FILE;
use crate::paper::Paper;
use crate::retrieval::{PAPER_METADATA_FILE, PAPER_TEXT_FILE, RELATED_METADATA_FILE};
use crate::review::{REVIEWS_DIR, SHORTCOMINGS_FILE};
use crate::scoring::WeightConfiguration;

pub const FINAL_REPORT_FILE: &str = "final_report.md";

const METHODOLOGY: &str = "## Methodology

### Overview

The paper was found, scored and analyzed by an automated workflow built for the
Multilevel and Mixed Methods Approaches class. Each phase reads the files the
previous one wrote, so any phase can be re-run on its own.

### Workflow Phases

#### Phase 0: LLM Configuration
- Picks the Development and Devil's Advocate models from the providers with an API key.
- **Output**: `llm_config.json`

#### Phase 1: Search Strategy & Data Retrieval
- Queries Scopus for papers that are both multilevel and mixed-methods.
- A strict query also requires value-based healthcare and NHS/Beveridgean context terms.
- Falls back to the relaxed query when the strict one returns too few papers.
- **Output**: `scopus_results.json`

#### Phase 2: Grading Algorithm
- Scores every paper out of 100 points.
- Criteria: class relevance, PhD relevance, journal quality (CiteScore, SJR) and citation impact.
- Weights are configurable and re-normalized to 100.
- **Output**: `graded_papers.json`, `top_papers.md`

#### Phase 3: Paper Selection & Retrieval
- Downloads the selected paper from Scopus, the DOI resolver or Unpaywall, with a manual fallback.
- Extracts the text and downloads open-access cited and citing papers.
- **Output**: `selected_paper/`

#### Phase 4: Evaluation Question Answering
- The Development model answers the evaluation checklist with evidence and a confidence score.
- **Output**: `evaluation_draft.md`

#### Phase 4.5: Adversarial Review & Refinement
- The Devil's Advocate model critiques the draft and the Development model revises it.
- Rounds repeat, optionally with user comments, until the reviewer stops.
- **Output**: `evaluation_final.md`, `shortcomings_assessment.md`

#### Phase 5: Final Report Generation
- **Output**: this document

#### Phase 6: Presentation Creation
- An 8-slide, 15-minute deck outline.
- **Output**: `presentation.md`
";

/// Remove the heading lines `render_draft` puts on top of an evaluation.
pub fn strip_draft_header(evaluation: &str) -> String {
    evaluation
        .replace("# Evaluation Draft", "")
        .replace("## Paper Analysis - Initial Answers", "")
        .trim()
        .to_string()
}

/// The final evaluation of the run, falling back to the draft.
pub fn load_evaluation(run_dir: &Path) -> Option<String> {
    if let Ok(text) = std::fs::read_to_string(run_dir.join(EVALUATION_FINAL_FILE)) {
        return Some(text);
    }
    tracing::warn!("{} not found, using draft", EVALUATION_FINAL_FILE);
    std::fs::read_to_string(run_dir.join(EVALUATION_DRAFT_FILE)).ok()
}

fn render_paper_summary(paper: &Paper, weights: &WeightConfiguration) -> String {
    let mut out = String::from("## Selected Paper\n\n### Citation\n\n");
    out.push_str(&format!("**Title**: {}\n\n", paper.title));
    out.push_str(&format!("**Authors**: {}\n\n", or_unknown(paper.authors.as_deref())));
    out.push_str(&format!(
        "**Journal**: {}\n\n",
        or_unknown(paper.publication_name.as_deref())
    ));
    out.push_str(&format!("**Year**: {}\n\n", or_unknown(paper.year())));
    match paper.doi {
        Some(ref doi) => out.push_str(&format!("**DOI**: [{}](https://doi.org/{})\n\n", doi, doi)),
        None => out.push_str("**DOI**: unknown\n\n"),
    }
    out.push_str(&format!("**Citations**: {}\n\n", paper.cited_by_count));

    out.push_str("### Selection Rationale\n\n");
    out.push_str(&format!("**Total Score**: {}/100\n\n", paper.total_score()));
    out.push_str("**Score Breakdown**:\n\n");
    out.push_str(&paper_breakdown(paper, weights));
    out.push('\n');

    out.push_str("### Abstract\n\n");
    out.push_str(or_unknown(paper.r#abstract.as_deref()));
    out.push('\n');
    out
}

fn render_appendix() -> String {
    let files = [
        (LLM_CONFIG_FILE.to_string(), "LLM configuration"),
        ("scopus_results.json".to_string(), "Search results"),
        ("graded_papers.json".to_string(), "Scored papers"),
        (TOP_PAPERS_FILE.to_string(), "Ranked papers"),
        ("selected_paper/paper.pdf".to_string(), "Full text PDF"),
        (format!("selected_paper/{}", PAPER_TEXT_FILE), "Extracted text"),
        (format!("selected_paper/{}", PAPER_METADATA_FILE), "Paper metadata"),
        (
            format!("selected_paper/{}", RELATED_METADATA_FILE),
            "Cited and citing papers",
        ),
        (EVALUATION_DRAFT_FILE.to_string(), "Initial evaluation"),
        (format!("{}/", REVIEWS_DIR), "Critiques and revised drafts per round"),
        (EVALUATION_FINAL_FILE.to_string(), "Final evaluation"),
        (SHORTCOMINGS_FILE.to_string(), "Shortcomings assessment"),
    ];

    let mut out = String::from("## Appendix\n\n### Generated Files\n\n");
    for (file, description) in files {
        out.push_str(&format!("- `{}` - {}\n", file, description));
    }
    out
}

/// The phase 5 deliverable.
pub fn render_final_report(
    paper: &Paper,
    weights: &WeightConfiguration,
    evaluation: Option<&str>,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::from("# Final Report: Paper Analysis\n\n");
    out.push_str(&format!(
        "**Generated**: {}\n\n---\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str(METHODOLOGY);
    out.push_str("\n---\n\n");

    out.push_str(&render_paper_summary(paper, weights));
    out.push_str("\n---\n\n");

    out.push_str("## Evaluation Answers\n\n");
    match evaluation.map(strip_draft_header).filter(|e| !e.is_empty()) {
        Some(text) => {
            out.push_str(&text);
            out.push('\n');
        }
        None => out.push_str("*Evaluation answers not yet generated*\n"),
    }
    out.push_str("\n---\n\n");

    out.push_str(&render_appendix());
    out
}
