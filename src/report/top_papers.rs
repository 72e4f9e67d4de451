use super::{or_unknown, paper_breakdown};
use crate::paper::Paper;
use crate::scoring::WeightConfiguration;

pub const TOP_PAPERS_FILE: &str = "top_papers.md";

const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// First 300 characters of an abstract, with "..." when cut.
pub fn abstract_preview(text: &str) -> String {
    match text.char_indices().nth(ABSTRACT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Markdown listing of the `top_n` best papers of an already ranked list.
pub fn render_top_papers(papers: &[Paper], weights: &WeightConfiguration, top_n: usize) -> String {
    let shown = top_n.min(papers.len());
    let mut out = format!("# Top {} Papers - Grading Report\n\n", shown);
    out.push_str(&format!("**Total papers graded**: {}\n\n", papers.len()));
    out.push_str("---\n\n");

    for (i, paper) in papers.iter().take(top_n).enumerate() {
        out.push_str(&format!("## {}. {}\n\n", i + 1, paper.title));
        out.push_str(&format!("**Total Score**: {}/100\n\n", paper.total_score()));
        out.push_str(&format!("**Authors**: {}\n\n", or_unknown(paper.authors.as_deref())));
        out.push_str(&format!(
            "**Journal**: {}\n\n",
            or_unknown(paper.publication_name.as_deref())
        ));
        out.push_str(&format!("**Year**: {}\n\n", or_unknown(paper.year())));
        out.push_str(&format!("**Citations**: {}\n\n", paper.cited_by_count));
        out.push_str(&format!("**DOI**: {}\n\n", or_unknown(paper.doi.as_deref())));

        out.push_str("### Score Breakdown\n\n");
        out.push_str(&paper_breakdown(paper, weights));
        out.push('\n');

        if let Some(ref text) = paper.r#abstract {
            out.push_str(&format!("**Abstract**: {}\n\n", abstract_preview(text)));
        }
        out.push_str("---\n\n");
    }
    out
}
