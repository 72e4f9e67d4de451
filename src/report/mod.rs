pub mod final_report;
pub mod presentation;
pub mod top_papers;

pub use final_report::{load_evaluation, render_final_report, strip_draft_header, FINAL_REPORT_FILE};
pub use presentation::{render_presentation, PRESENTATION_FILE};
pub use top_papers::{abstract_preview, render_top_papers, TOP_PAPERS_FILE};

use crate::paper::Paper;
use crate::scoring::{GradingResult, WeightConfiguration};

/// Text for a bibliographic field that may be unknown.
pub(crate) fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

pub(crate) fn raw_metric(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Score breakdown as a Markdown bullet list, each criterion shown against
/// its configured maximum.
pub fn render_breakdown(grading: &GradingResult, weights: &WeightConfiguration) -> String {
    let b = &grading.breakdown;
    let cw = weights.class_relevance();
    let pw = weights.phd_relevance();
    let jw = weights.journal_quality();
    let iw = weights.impact();

    let class_max = cw.multilevel_strong
        + cw.multilevel_weak
        + cw.mixed_methods_explicit
        + cw.mixed_methods_implicit;
    let phd_max = pw.vbhc + pw.nhs_context + pw.portugal;
    let journal_max = jw.citescore_max + jw.sjr_max;

    let mut out = String::new();
    out.push_str(&format!(
        "- **Class Relevance** ({}/{}):\n",
        b.class_relevance.subtotal, class_max
    ));
    out.push_str(&format!(
        "  - Multilevel (strong): {}/{}\n",
        b.class_relevance.multilevel_strong, cw.multilevel_strong
    ));
    out.push_str(&format!(
        "  - Multilevel (weak): {}/{}\n",
        b.class_relevance.multilevel_weak, cw.multilevel_weak
    ));
    out.push_str(&format!(
        "  - Mixed Methods (explicit): {}/{}\n",
        b.class_relevance.mixed_methods_explicit, cw.mixed_methods_explicit
    ));
    out.push_str(&format!(
        "  - Mixed Methods (implicit): {}/{}\n\n",
        b.class_relevance.mixed_methods_implicit, cw.mixed_methods_implicit
    ));

    out.push_str(&format!(
        "- **PhD Relevance** ({}/{}):\n",
        b.phd_relevance.subtotal, phd_max
    ));
    out.push_str(&format!("  - VBHC: {}/{}\n", b.phd_relevance.vbhc, pw.vbhc));
    out.push_str(&format!(
        "  - NHS Context: {}/{}\n",
        b.phd_relevance.nhs_context, pw.nhs_context
    ));
    out.push_str(&format!(
        "  - Portugal: {}/{}\n\n",
        b.phd_relevance.portugal, pw.portugal
    ));

    out.push_str(&format!(
        "- **Journal Quality** ({}/{}):\n",
        b.journal_quality.subtotal, journal_max
    ));
    out.push_str(&format!(
        "  - CiteScore: {}/{} (raw: {})\n",
        b.journal_quality.citescore,
        jw.citescore_max,
        raw_metric(b.journal_quality.raw_citescore)
    ));
    out.push_str(&format!(
        "  - SJR: {}/{} (raw: {})\n\n",
        b.journal_quality.sjr,
        jw.sjr_max,
        raw_metric(b.journal_quality.raw_sjr)
    ));

    out.push_str(&format!(
        "- **Impact** ({}/{}):\n",
        b.impact.subtotal, iw.citations_max
    ));
    out.push_str(&format!(
        "  - Citations: {}/{} (raw: {})\n",
        b.impact.citations, iw.citations_max, b.impact.raw_citations
    ));
    out
}

/// Breakdown of a paper, or a note when it was never graded.
pub(crate) fn paper_breakdown(paper: &Paper, weights: &WeightConfiguration) -> String {
    match paper.grading {
        Some(ref grading) => render_breakdown(grading, weights),
        None => "*Not graded*\n".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::paper::Paper;
    use crate::scoring::{grade_paper, MetricsTable, ScoringOptions, WeightConfiguration};

    pub fn graded_paper(id: &str, title: &str, abstract_text: &str) -> Paper {
        let mut paper = Paper::new(id, title);
        paper.authors = Some("Silva A.".into());
        paper.publication_name = Some("Health Services Research".into());
        paper.cover_date = Some("2021-05-01".into());
        paper.doi = Some("10.1000/xyz".into());
        paper.cited_by_count = 250;
        paper.r#abstract = Some(abstract_text.into());
        paper.grading = Some(grade_paper(
            &paper,
            &WeightConfiguration::default(),
            &MetricsTable::new(),
            &ScoringOptions::default(),
        ));
        paper
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::graded_paper;
    use super::*;

    #[test]
    fn test_breakdown_against_default_maxima() {
        let paper = graded_paper("1", "A multilevel model study", "Mixed methods in the NHS.");
        let text = paper_breakdown(&paper, &WeightConfiguration::default());

        assert!(text.contains("- **Class Relevance** (20/50):"));
        assert!(text.contains("  - Multilevel (strong): 10/20"));
        assert!(text.contains("  - Mixed Methods (explicit): 10/15"));
        assert!(text.contains("- **PhD Relevance** (5/25):"));
        assert!(text.contains("  - CiteScore: 0/12 (raw: unknown)"));
        assert!(text.contains("  - SJR: 0/8 (raw: unknown)"));
        assert!(text.contains("  - Citations: 2.5/5 (raw: 250)"));
    }

    #[test]
    fn test_ungraded_paper() {
        let paper = Paper::new("1", "t");
        assert_eq!(paper_breakdown(&paper, &WeightConfiguration::default()), "*Not graded*\n");
    }
}
