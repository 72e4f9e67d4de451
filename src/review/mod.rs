use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::evaluation::EVALUATION_FINAL_FILE;
use crate::llm::{LanguageModel, LlmConfig, LlmSelection};
use crate::paper::{write_json, write_text};
use crate::prompt::Prompter;

pub const REVIEWS_DIR: &str = "adversarial_reviews";
pub const SHORTCOMINGS_FILE: &str = "shortcomings_assessment.md";
pub const DEFAULT_MAX_ROUNDS: usize = 5;

pub fn critique_prompt(draft: &str) -> String {
    format!(
        "You are a critical reviewer for an academic paper analysis. Your role is to challenge the answers and identify weaknesses.

Review the following evaluation draft and provide critical feedback:

{}

For each answer, identify:
1. Logical gaps or unsupported claims
2. Missing evidence or citations from the paper
3. Overgeneralizations or assumptions
4. Areas where the answer could be more specific
5. Questions that are not adequately addressed

Be constructive but thorough in your critique. Focus on improving the quality and accuracy of the analysis.
",
        draft
    )
}

pub fn refinement_prompt(draft: &str, critique: &str) -> String {
    format!(
        "You are refining an academic paper analysis based on critical feedback.

Original draft:
{}

Critical feedback:
{}

Please revise the answers to address all points raised in the feedback. For each answer:
1. Address the specific critiques
2. Add missing evidence or citations
3. Clarify any ambiguous points
4. Strengthen weak arguments
5. Update confidence scores based on the quality of evidence

Maintain the same format as the original draft.
",
        draft, critique
    )
}

pub fn shortcomings_prompt(final_draft: &str) -> String {
    format!(
        "Review this final evaluation and identify any remaining shortcomings or gaps:

{}

Provide:
1. List of remaining shortcomings (if any)
2. Overall assessment of how well the paper meets the class requirements
3. Recommendation: Is this paper suitable, or should we consider alternatives?
4. If alternatives needed, what specific criteria should we prioritize?
",
        final_draft
    )
}

/// User comments go first; without comments the critique stands alone.
pub fn combine_critique(critique: &str, user_comments: &str) -> String {
    if user_comments.trim().is_empty() {
        return critique.to_string();
    }
    format!(
        "# Combined Critique\n\n## User Comments\n\n{}\n\n---\n\n## Devil's Advocate Review\n\n{}\n",
        user_comments, critique
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationRecord {
    pub round: usize,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub has_user_comments: bool,
    pub version: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewLlms {
    pub development: LlmSelection,
    pub devils_advocate: LlmSelection,
}

/// Saved as `iteration_metadata.json` in the iteration folder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewSession {
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub llm_config: ReviewLlms,
    pub iterations: Vec<IterationRecord>,
    pub total_rounds: usize,
    pub final_version: usize,
}

/// Result of a review loop.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub iteration_dir: PathBuf,
    pub final_draft: String,
    pub rounds: usize,
    pub final_version: usize,
}

/// Create `adversarial_reviews/iteration_HHMMSS`, adding a numeric suffix if
/// a folder with that time already exists.
pub fn create_iteration_dir(run_dir: &Path) -> Result<PathBuf> {
    let reviews = run_dir.join(REVIEWS_DIR);
    std::fs::create_dir_all(&reviews)
        .with_context(|| format!("Failed to create {}", reviews.display()))?;

    let base = format!("iteration_{}", Local::now().format("%H%M%S"));
    let mut candidate = reviews.join(&base);
    let mut suffix = 2;
    while candidate.exists() {
        candidate = reviews.join(format!("{}_{}", base, suffix));
        suffix += 1;
    }
    std::fs::create_dir_all(&candidate)
        .with_context(|| format!("Failed to create {}", candidate.display()))?;
    Ok(candidate)
}

fn ask_user_comments(prompter: &Prompter) -> Result<String> {
    println!();
    println!("You can add your own comments on top of the Devil's Advocate critique.");
    if !prompter.prompt_yes_no("Add comments?", false)? {
        return Ok(String::new());
    }
    let comments = prompter.read_multiline("Enter your comments:")?;
    if !comments.is_empty() {
        println!("Added {} lines of comments", comments.lines().count());
    }
    Ok(comments)
}

/// The two models taking part in a review.
pub struct Reviewers<'a> {
    pub development: &'a dyn LanguageModel,
    pub advocate: &'a dyn LanguageModel,
}

/// Phase 4.5: critique and refine `draft` until the user stops or
/// `max_rounds` is reached, then finalize and assess what is left.
pub async fn run_review(
    reviewers: &Reviewers<'_>,
    llm_config: &LlmConfig,
    draft: &str,
    run_dir: &Path,
    prompter: &Prompter,
    max_rounds: usize,
) -> Result<ReviewOutcome> {
    let max_rounds = max_rounds.max(1);
    let dir = create_iteration_dir(run_dir)?;
    let dir_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("Iteration folder: {}/{}", REVIEWS_DIR, dir_name);

    write_text(&dir.join("evaluation_draft_v1.md"), draft)?;

    let mut session = ReviewSession {
        start_time: Local::now(),
        end_time: None,
        llm_config: ReviewLlms {
            development: llm_config.development.clone(),
            devils_advocate: llm_config.devils_advocate.clone(),
        },
        iterations: Vec::new(),
        total_rounds: 0,
        final_version: 1,
    };

    let mut current = draft.to_string();
    let mut version = 1;
    let mut round = 1;

    loop {
        println!();
        println!("Iteration {}", round);
        let start_time = Local::now();

        println!("[Round {}] Devil's Advocate reviewing...", round);
        let critique = reviewers
            .advocate
            .generate(&critique_prompt(&current))
            .await
            .context("Devil's advocate call failed")?;

        let comments = ask_user_comments(prompter)?;
        if !comments.is_empty() {
            write_text(
                &dir.join(format!("user_comments_round{}.md", round)),
                &format!("# User Comments - Round {}\n\n{}", round, comments),
            )?;
        }

        let combined = combine_critique(&critique, &comments);
        write_text(&dir.join(format!("adversarial_critique_round{}.md", round)), &combined)?;

        println!("[Round {}] Development LLM refining...", round);
        let refined = reviewers
            .development
            .generate(&refinement_prompt(&current, &combined))
            .await
            .context("Development model call failed")?;

        version += 1;
        write_text(&dir.join(format!("evaluation_draft_v{}.md", version)), &refined)?;

        session.iterations.push(IterationRecord {
            round,
            start_time,
            end_time: Local::now(),
            has_user_comments: !comments.is_empty(),
            version,
        });
        current = refined;

        if round >= max_rounds {
            println!("Reached the maximum of {} rounds", max_rounds);
            break;
        }
        if !prompter.prompt_yes_no("\nContinue with another iteration?", false)? {
            break;
        }
        round += 1;
    }

    session.end_time = Some(Local::now());
    session.total_rounds = round;
    session.final_version = version;
    write_json(&dir.join("iteration_metadata.json"), &session)?;

    write_text(&dir.join(EVALUATION_FINAL_FILE), &current)?;
    write_text(&run_dir.join(EVALUATION_FINAL_FILE), &current)?;

    println!("Identifying remaining shortcomings...");
    let assessment = reviewers
        .development
        .generate(&shortcomings_prompt(&current))
        .await
        .context("Shortcomings assessment failed")?;
    let assessment = format!("# Shortcomings Assessment\n\n{}", assessment);
    write_text(&dir.join(SHORTCOMINGS_FILE), &assessment)?;
    write_text(&run_dir.join(SHORTCOMINGS_FILE), &assessment)?;

    Ok(ReviewOutcome {
        iteration_dir: dir,
        final_draft: current,
        rounds: round,
        final_version: version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::read_json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Numbered {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl Numbered {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl LanguageModel for Numbered {
        fn describe(&self) -> String {
            self.name.to_string()
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("{} output {}", self.name, n))
        }
    }

    fn script(answers: &[&str]) -> Prompter {
        Prompter::scripted(answers.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_combine_critique() {
        assert_eq!(combine_critique("crit", "  "), "crit");
        let combined = combine_critique("crit", "mine");
        assert!(combined.starts_with("# Combined Critique\n\n## User Comments\n\nmine"));
        assert!(combined.ends_with("## Devil's Advocate Review\n\ncrit\n"));
    }

    #[test]
    fn test_prompts_embed_inputs() {
        assert!(critique_prompt("DRAFT").contains("\n\nDRAFT\n\n"));
        let refine = refinement_prompt("DRAFT", "CRIT");
        assert!(refine.contains("Original draft:\nDRAFT\n\nCritical feedback:\nCRIT"));
        assert!(refine.contains("Maintain the same format as the original draft."));
        assert!(shortcomings_prompt("FINAL").contains("FINAL"));
    }

    #[test]
    fn test_iteration_dir_is_unique() {
        let run = tempfile::tempdir().unwrap();
        let a = create_iteration_dir(run.path()).unwrap();
        let b = create_iteration_dir(run.path()).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with(run.path().join(REVIEWS_DIR)));
    }

    #[tokio::test]
    async fn test_single_round_with_comments() {
        let run = tempfile::tempdir().unwrap();
        let dev = Numbered::new("dev");
        let adv = Numbered::new("adv");
        let reviewers = Reviewers {
            development: &dev,
            advocate: &adv,
        };
        // comments yes, two lines, terminator, then stop
        let prompter = script(&["y", "Check sample size.", "", "", "n"]);

        let outcome = run_review(&reviewers, &LlmConfig::fallback(), "draft v1", run.path(), &prompter, 5)
            .await
            .unwrap();

        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.final_version, 2);
        assert_eq!(outcome.final_draft, "dev output 1");

        let dir = &outcome.iteration_dir;
        assert_eq!(std::fs::read_to_string(dir.join("evaluation_draft_v1.md")).unwrap(), "draft v1");
        let comments = std::fs::read_to_string(dir.join("user_comments_round1.md")).unwrap();
        assert_eq!(comments, "# User Comments - Round 1\n\nCheck sample size.");
        let critique = std::fs::read_to_string(dir.join("adversarial_critique_round1.md")).unwrap();
        assert!(critique.contains("adv output 1"));
        assert!(critique.starts_with("# Combined Critique"));

        let root_final = std::fs::read_to_string(run.path().join(EVALUATION_FINAL_FILE)).unwrap();
        assert_eq!(root_final, "dev output 1");
        let assessment = std::fs::read_to_string(run.path().join(SHORTCOMINGS_FILE)).unwrap();
        assert_eq!(assessment, "# Shortcomings Assessment\n\ndev output 2");

        let session: ReviewSession = read_json(&dir.join("iteration_metadata.json")).unwrap();
        assert_eq!(session.total_rounds, 1);
        assert_eq!(session.final_version, 2);
        assert!(session.iterations[0].has_user_comments);
        assert!(session.end_time.is_some());
    }

    #[tokio::test]
    async fn test_max_rounds_bounds_loop() {
        let run = tempfile::tempdir().unwrap();
        let dev = Numbered::new("dev");
        let adv = Numbered::new("adv");
        let reviewers = Reviewers {
            development: &dev,
            advocate: &adv,
        };
        // Never add comments, always ask to continue
        let prompter = script(&["n", "y", "n", "y", "n", "y", "n", "y"]);

        let outcome = run_review(&reviewers, &LlmConfig::fallback(), "d", run.path(), &prompter, 2)
            .await
            .unwrap();

        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.final_version, 3);
        assert!(outcome.iteration_dir.join("evaluation_draft_v3.md").is_file());
        assert!(!outcome.iteration_dir.join("user_comments_round1.md").exists());
        assert_eq!(adv.calls.load(Ordering::SeqCst), 2);
    }
}
