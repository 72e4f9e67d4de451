use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::llm::LanguageModel;
use crate::paper::write_text;

pub const EVALUATION_DRAFT_FILE: &str = "evaluation_draft.md";
pub const EVALUATION_FINAL_FILE: &str = "evaluation_final.md";

/// Characters of paper text included in each prompt
pub const EXCERPT_CHARS: usize = 5000;

/// The evaluation checklist.
pub const QUESTIONS: [&str; 12] = [
    "Does the paper clearly state the research question and objectives?",
    "Does the paper demonstrate multilevel/hierarchical analysis?",
    "What multilevel modeling techniques are used (e.g., HLM, mixed-effects models)?",
    "Does the paper use mixed methods (both qualitative and quantitative)?",
    "How are the qualitative and quantitative methods integrated?",
    "What is the justification for using a multilevel approach?",
    "Are cross-level interactions or mediation effects examined?",
    "How are aggregation/emergence processes addressed?",
    "What are the main findings related to multilevel analysis?",
    "What are the limitations of the multilevel approach used?",
    "How does this relate to Value-Based Healthcare (if applicable)?",
    "What are the implications for health systems research?",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationAnswer {
    pub question: String,
    pub answer: String,
    pub evidence: String,
    /// 0.0-1.0, `None` when the model gave no usable rating
    pub confidence: Option<f64>,
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(question: &str, paper_text: &str) -> String {
    format!(
        "You are analyzing an academic paper for a class on Multilevel and Mixed Methods Approaches.

Paper text (excerpt):
{}...

Question: {}

Please provide:
1. A detailed answer to the question based on the paper
2. Specific evidence/quotes from the paper
3. A confidence score (0.0-1.0) indicating how well the paper addresses this question

Format your response as:
ANSWER: [your answer]
EVIDENCE: [specific quotes or sections]
CONFIDENCE: [0.0-1.0]
",
        excerpt(paper_text, EXCERPT_CHARS),
        question
    )
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Answer,
    Evidence,
    Confidence,
}

fn section_marker(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim_start();
    for (marker, section) in [
        ("ANSWER:", Section::Answer),
        ("EVIDENCE:", Section::Evidence),
        ("CONFIDENCE:", Section::Confidence),
    ] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Some((section, rest));
        }
    }
    None
}

fn parse_confidence(raw: &str) -> Option<f64> {
    let token: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    token
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
}

/// Split a model response into its ANSWER / EVIDENCE / CONFIDENCE sections.
///
/// Without any marker the whole response is the answer.
pub fn parse_response(question: &str, response: &str) -> EvaluationAnswer {
    let mut answer = Vec::new();
    let mut evidence = Vec::new();
    let mut confidence = Vec::new();
    let mut current: Option<Section> = None;

    for line in response.lines() {
        let text = match section_marker(line) {
            Some((section, rest)) => {
                current = Some(section);
                rest
            }
            None => line,
        };
        match current {
            Some(Section::Answer) => answer.push(text),
            Some(Section::Evidence) => evidence.push(text),
            Some(Section::Confidence) => confidence.push(text),
            None => answer.push(text),
        }
    }

    EvaluationAnswer {
        question: question.to_string(),
        answer: answer.join("\n").trim().to_string(),
        evidence: evidence.join("\n").trim().to_string(),
        confidence: parse_confidence(&confidence.join(" ")),
    }
}

/// Ask the model every checklist question about `paper_text`.
pub async fn answer_questions(
    model: &dyn LanguageModel,
    paper_text: &str,
    questions: &[&str],
) -> Result<Vec<EvaluationAnswer>> {
    let mut answers = Vec::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        println!("Answering question {}/{}...", i + 1, questions.len());
        let response = model
            .generate(&build_prompt(question, paper_text))
            .await
            .with_context(|| format!("Model failed on question {}", i + 1))?;
        answers.push(parse_response(question, &response));
    }
    Ok(answers)
}

pub fn render_draft(answers: &[EvaluationAnswer]) -> String {
    let mut out = String::from("# Evaluation Draft\n\n## Paper Analysis - Initial Answers\n\n---\n\n");
    for (i, answer) in answers.iter().enumerate() {
        let confidence = answer
            .confidence
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "unrated".to_string());
        let evidence = if answer.evidence.is_empty() {
            "(none provided)"
        } else {
            answer.evidence.as_str()
        };
        out.push_str(&format!("### Question {}\n\n", i + 1));
        out.push_str(&format!("**Q:** {}\n\n", answer.question));
        out.push_str(&format!("**Answer:**\n{}\n\n", answer.answer));
        out.push_str(&format!("**Evidence:**\n{}\n\n", evidence));
        out.push_str(&format!("**Confidence:** {}\n\n", confidence));
        out.push_str("---\n\n");
    }
    out
}

/// Phase 4: answer the checklist and save `evaluation_draft.md` in `run_dir`.
pub async fn run_evaluation(
    model: &dyn LanguageModel,
    paper_text: &str,
    run_dir: &Path,
) -> Result<Vec<EvaluationAnswer>> {
    if paper_text.trim().is_empty() {
        anyhow::bail!("Paper text is empty. Run `lit-review retrieve` first.");
    }
    println!("Using Development LLM: {}", model.describe());

    let answers = answer_questions(model, paper_text, &QUESTIONS).await?;
    write_text(&run_dir.join(EVALUATION_DRAFT_FILE), &render_draft(&answers))?;
    println!("Generated {} answers", answers.len());
    Ok(answers)
}
