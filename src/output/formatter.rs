use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::paper::Paper;
use crate::report::raw_metric;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a total score with one decimal, trailing ".0" dropped
pub fn format_score(score: f64) -> String {
    let formatted = format!("{:.1}", score);
    formatted
        .strip_suffix(".0")
        .map(str::to_string)
        .unwrap_or(formatted)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn journal_name(paper: &Paper) -> &str {
    paper.publication_name.as_deref().unwrap_or("-")
}

/// Format ranked papers as a table with columns: Index, Score, Title, Journal
/// No headers
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 5 chars wide (fits "100.0")
/// Journal column is capped at 30 chars
pub fn format_ranked_table(papers: &[Paper], use_colors: bool) -> String {
    format_ranked_table_width(papers, use_colors, get_terminal_width())
}

fn format_ranked_table_width(papers: &[Paper], use_colors: bool, term_width: Option<usize>) -> String {
    if papers.is_empty() {
        return "No papers found.".to_string();
    }

    let index_width = 3;
    let score_width = 5;
    let journal_width = 30;
    let separator = "  ";

    papers
        .iter()
        .enumerate()
        .map(|(idx, paper)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_padded = format!("{:>width$}", format_score(paper.total_score()), width = score_width);
            let journal = truncate_title(journal_name(paper), journal_width);

            let fixed_width =
                index_width + 1 + score_width + separator.len() * 2 + journal.chars().count();

            let title = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_title(&paper.title, width - fixed_width)
                }
                // Very narrow terminal
                Some(_) => truncate_title(&paper.title, 20),
                None => paper.title.clone(),
            };

            let gated = paper.grading.map(|g| g.gated).unwrap_or(false);

            if use_colors {
                let score = if gated {
                    score_padded.red().to_string()
                } else {
                    score_padded.bold().to_string()
                };
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    score,
                    separator,
                    title,
                    separator,
                    journal.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, score_padded, separator, title, separator, journal
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single paper with its score breakdown (for `open` and verbose mode)
pub fn format_paper_detail(paper: &Paper, use_colors: bool) -> String {
    let authors = paper.authors.as_deref().unwrap_or("unknown");
    let year = paper.year().unwrap_or("unknown");
    let url = paper.web_url().unwrap_or_else(|| "-".to_string());

    let mut lines = if use_colors {
        vec![
            paper.title.bold().to_string(),
            format!("  Authors: {}", authors.yellow()),
            format!("  Journal: {} ({})", journal_name(paper).cyan(), year),
            format!("  Citations: {}", paper.cited_by_count),
            format!("  URL: {}", url.underline()),
        ]
    } else {
        vec![
            paper.title.clone(),
            format!("  Authors: {}", authors),
            format!("  Journal: {} ({})", journal_name(paper), year),
            format!("  Citations: {}", paper.cited_by_count),
            format!("  URL: {}", url),
        ]
    };

    match paper.grading {
        Some(grading) => {
            let b = grading.breakdown;
            let total = format!("  Score: {}/100", format_score(grading.total_score));
            lines.push(if use_colors { total.bold().to_string() } else { total });
            if grading.gated {
                lines.push("    (no class relevance, total zeroed)".to_string());
            }
            lines.push(format!(
                "    Class relevance: {} (multilevel {}+{}, mixed methods {}+{})",
                b.class_relevance.subtotal,
                b.class_relevance.multilevel_strong,
                b.class_relevance.multilevel_weak,
                b.class_relevance.mixed_methods_explicit,
                b.class_relevance.mixed_methods_implicit
            ));
            lines.push(format!(
                "    PhD relevance: {} (VBHC {}, NHS {}, Portugal {})",
                b.phd_relevance.subtotal,
                b.phd_relevance.vbhc,
                b.phd_relevance.nhs_context,
                b.phd_relevance.portugal
            ));
            lines.push(format!(
                "    Journal quality: {} (CiteScore {} raw {}, SJR {} raw {})",
                b.journal_quality.subtotal,
                b.journal_quality.citescore,
                raw_metric(b.journal_quality.raw_citescore),
                b.journal_quality.sjr,
                raw_metric(b.journal_quality.raw_sjr)
            ));
            lines.push(format!(
                "    Impact: {} ({} citations)",
                b.impact.subtotal, b.impact.raw_citations
            ));
        }
        None => lines.push("  Score: not graded".to_string()),
    }

    lines.join("\n")
}

/// Format papers as tab-separated values for scripting
/// Columns: score, scopus_id, doi, title, journal (no headers, no colors)
pub fn format_tsv(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return String::new();
    }

    papers
        .iter()
        .map(|paper| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                paper.total_score(),
                paper.scopus_id,
                paper.doi.as_deref().unwrap_or(""),
                paper.title,
                paper.publication_name.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
