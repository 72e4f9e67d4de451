use anyhow::{Context, Result};
use chrono::Local;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use super::{PipelineError, RunContext};
use crate::browser::open_url;
use crate::config::init::customize_weights;
use crate::evaluation::{run_evaluation, EVALUATION_DRAFT_FILE};
use crate::llm::{build_model, detect_available, setup_llms, LanguageModel, LlmConfig, Role};
use crate::output::{format_paper_detail, format_ranked_table, format_tsv, should_use_colors};
use crate::paper::{dedupe_papers, load_papers, read_json, save_papers, write_json, write_text, Paper};
use crate::report::{load_evaluation, render_final_report, render_presentation, render_top_papers};
use crate::retrieval::manual::MANUAL_PDF_NAME;
use crate::retrieval::{
    demo_pdf_from_env, download_related, retrieve_paper, Downloader, ManualOptions, RetrievedPaper,
    PAPER_METADATA_FILE, PAPER_TEXT_FILE,
};
use crate::review::{run_review, Reviewers};
use crate::scopus::{execute_search, prefetch_metrics};
use crate::scoring::{normalize_weights, rank_papers, GradingWeights, MetricsTable, WeightConfiguration};

fn banner(title: &str) {
    let line = "=".repeat(60);
    println!();
    println!("{}", line);
    if should_use_colors() {
        println!("{}", title.bold());
    } else {
        println!("{}", title);
    }
    println!("{}", line);
}

/// Papers saved by an earlier phase; `missing` says which phase to run.
fn load_phase_papers(path: &Path, missing: &str) -> Result<Vec<Paper>> {
    if !path.exists() {
        anyhow::bail!("{}", missing);
    }
    load_papers(path).with_context(|| format!("Failed to load papers from {}", path.display()))
}

fn load_graded(ctx: &RunContext) -> Result<Vec<Paper>> {
    load_phase_papers(
        &ctx.paths.graded_papers(),
        "No graded papers found. Run `lit-review grade` first.",
    )
}

fn load_selected(ctx: &RunContext) -> Result<Paper> {
    read_json(&ctx.paths.selected_paper().join(PAPER_METADATA_FILE))
        .context("Selected paper not found. Run `lit-review retrieve` first.")
}

/// Weights of the last grading pass, else the configured ones.
fn run_weights(ctx: &RunContext) -> Result<WeightConfiguration> {
    let path = ctx.paths.grading_weights();
    if path.exists() {
        let raw: GradingWeights = read_json(&path)?;
        return Ok(normalize_weights(&raw)?);
    }
    Ok(ctx.scoring().weight_configuration()?)
}

/// Phase 0: pick the models and save `llm_config.json`.
pub fn setup_llm(ctx: &RunContext) -> Result<LlmConfig> {
    banner("PHASE 0: LLM CONFIGURATION");
    let available = detect_available();
    let config = match setup_llms(&ctx.prompter, &available) {
        Ok(config) => config,
        Err(e) if available.is_empty() => {
            return Err(PipelineError::Auth(format!("{:#}", e)).into())
        }
        Err(e) => return Err(e),
    };
    config.save(ctx.paths.root())?;

    println!();
    println!("Development LLM: {}", config.development);
    println!("Devil's Advocate LLM: {}", config.devils_advocate);
    Ok(config)
}

/// Phase 1: query Scopus and save `scopus_results.json`.
pub async fn search(ctx: &RunContext) -> Result<Vec<Paper>> {
    banner("PHASE 1: SEARCH STRATEGY & DATA RETRIEVAL");
    let client = ctx.scopus_client()?;
    let outcome = execute_search(&client, &ctx.config.search)
        .await
        .context("Scopus search failed")?;

    let kind = if outcome.strict { "strict" } else { "relaxed" };
    let papers = dedupe_papers(outcome.papers);
    println!("Query ({}): {}", kind, outcome.query);
    println!("Found {} unique papers", papers.len());
    if papers.is_empty() {
        tracing::warn!("Search returned no papers");
    }

    save_papers(&ctx.paths.scopus_results(), &papers)?;
    Ok(papers)
}

/// Phase 2: fetch journal metrics, grade and rank the search results.
///
/// With `customize` the user may change the weights first.
pub async fn grade(ctx: &RunContext, customize: bool) -> Result<Vec<Paper>> {
    banner("PHASE 2: GRADING ALGORITHM");
    let papers = load_phase_papers(
        &ctx.paths.scopus_results(),
        "No search results found. Run `lit-review search` first.",
    )?;
    let scoring = ctx.scoring();

    let mut weights = scoring.weight_configuration()?;
    if customize {
        weights = customize_weights(&ctx.prompter, &weights)?;
    }

    let issns: Vec<&str> = papers.iter().filter_map(|p| p.journal_issn()).collect();
    let table = if issns.is_empty() {
        MetricsTable::new()
    } else {
        match ctx.scopus_client() {
            Ok(client) => {
                println!("Fetching journal metrics for {} papers...", issns.len());
                prefetch_metrics(&client, issns, ctx.config.scopus.concurrency, &ctx.metrics_cache())
                    .await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Journal metrics unavailable, grading them as unknown");
                MetricsTable::new()
            }
        }
    };
    tracing::debug!(journals = table.len(), "Journal metrics resolved");

    println!("Grading {} papers...", papers.len());
    let ranked = rank_papers(papers, &weights, &table, &scoring.options());

    save_papers(&ctx.paths.graded_papers(), &ranked)?;
    write_json(&ctx.paths.grading_weights(), &weights)?;
    let top_n = scoring.top_n();
    write_text(
        &ctx.paths.top_papers(),
        &render_top_papers(&ranked, &weights, top_n),
    )?;

    println!();
    println!(
        "{}",
        format_ranked_table(&ranked[..top_n.min(ranked.len())], should_use_colors())
    );
    println!();
    println!("Ranked papers saved to {}", ctx.paths.top_papers().display());
    Ok(ranked)
}

/// Print the graded papers.
pub fn list(ctx: &RunContext, tsv: bool, verbose: bool) -> Result<()> {
    let papers = load_graded(ctx)?;
    if tsv {
        println!("{}", format_tsv(&papers));
        return Ok(());
    }

    let use_colors = should_use_colors();
    if verbose && !papers.is_empty() {
        for paper in &papers {
            println!("{}", format_paper_detail(paper, use_colors));
            println!();
        }
    } else {
        println!("{}", format_ranked_table(&papers, use_colors));
    }
    Ok(())
}

/// Show a graded paper by its 1-based index and open it in the browser.
pub fn open(ctx: &RunContext, index: usize) -> Result<()> {
    let papers = load_graded(ctx)?;
    if index < 1 || index > papers.len() {
        return Err(PipelineError::Usage(format!(
            "Invalid index {}. Must be between 1 and {}.",
            index,
            papers.len()
        ))
        .into());
    }

    let paper = &papers[index - 1];
    println!("{}", format_paper_detail(paper, should_use_colors()));

    let url = paper
        .web_url()
        .ok_or_else(|| anyhow::anyhow!("Paper {} has neither a DOI nor a link", paper.scopus_id))?;
    open_url(&url)?;
    println!("Opening paper #{} in browser: {}", index, url);
    Ok(())
}

/// Choose the paper to analyze: `select` if given, else ask among the top
/// ranked papers.
pub fn select_paper(ctx: &RunContext, select: Option<usize>) -> Result<Paper> {
    let papers = load_graded(ctx)?;
    if papers.is_empty() {
        anyhow::bail!("No graded papers to choose from. Run `lit-review search` again with broader keywords.");
    }

    let index = match select {
        Some(n) if (1..=papers.len()).contains(&n) => n,
        Some(n) => {
            return Err(PipelineError::Usage(format!(
                "Invalid selection {}. Must be between 1 and {}.",
                n,
                papers.len()
            ))
            .into())
        }
        None => {
            let top_n = ctx.scoring().top_n().clamp(1, papers.len());
            println!("{}", format_ranked_table(&papers[..top_n], should_use_colors()));
            println!();
            ctx.prompter.prompt_choice(
                &format!("Select paper number (1-{})", top_n),
                top_n,
                1,
            )?
        }
    };

    let paper = papers[index - 1].clone();
    println!("Selected: {}", paper.title);
    Ok(paper)
}

/// Phase 3: download the selected paper, extract its text, and fetch
/// related papers.
pub async fn retrieve(ctx: &RunContext, select: Option<usize>) -> Result<RetrievedPaper> {
    banner("PHASE 3: PAPER SELECTION & RETRIEVAL");
    let paper = select_paper(ctx, select)?;
    let dir = ctx.paths.selected_paper();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let scopus = match ctx.scopus_client() {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "Scopus download and related papers unavailable");
            None
        }
    };
    let downloader = Downloader::new(
        scopus,
        ctx.config.retrieval.unpaywall_email.clone(),
        ctx.config.scopus.timeout()?,
    )?;
    let manual = ManualOptions {
        open_browser: ctx.config.retrieval.open_browser,
        demo_pdf: demo_pdf_from_env(),
    };

    let retrieved = retrieve_paper(&downloader, &paper, &dir, &ctx.prompter, &manual)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No PDF obtained for the selected paper. Save it as {} and run `lit-review retrieve` again.",
                dir.join(MANUAL_PDF_NAME).display()
            )
        })?;

    println!();
    println!("Downloading related papers...");
    match download_related(&downloader, &paper, &dir, ctx.config.retrieval.related_limit).await {
        Ok(related) => println!(
            "Related papers: {} cited ({} downloaded), {} citing ({} downloaded)",
            related.cited_papers.len(),
            related.cited_downloaded,
            related.citing_papers.len(),
            related.citing_downloaded
        ),
        Err(e) => tracing::warn!(error = %e, "Related paper download failed"),
    }

    Ok(retrieved)
}

/// Phase 4: answer the evaluation checklist with the development model.
pub async fn evaluate(ctx: &RunContext) -> Result<()> {
    banner("PHASE 4: EVALUATION QUESTION ANSWERING");
    let text_path = ctx.paths.selected_paper().join(PAPER_TEXT_FILE);
    let text = std::fs::read_to_string(&text_path).with_context(|| {
        format!(
            "Paper text not found at {}. Run `lit-review retrieve` first.",
            text_path.display()
        )
    })?;

    let llm = LlmConfig::load_or_fallback(ctx.paths.root());
    let model = build_model(&llm, Role::Development, ctx.usage.clone());
    run_evaluation(&model, &text, ctx.paths.root()).await?;
    println!(
        "Draft saved to {}",
        ctx.paths.root().join(EVALUATION_DRAFT_FILE).display()
    );
    Ok(())
}

/// Phase 4.5: critique and refine the draft.
pub async fn review(ctx: &RunContext) -> Result<()> {
    banner("PHASE 4.5: ADVERSARIAL REVIEW & REFINEMENT");
    let draft_path = ctx.paths.root().join(EVALUATION_DRAFT_FILE);
    let draft = std::fs::read_to_string(&draft_path)
        .context("Evaluation draft not found. Run `lit-review evaluate` first.")?;

    let llm = LlmConfig::load_or_fallback(ctx.paths.root());
    let development = build_model(&llm, Role::Development, ctx.usage.clone());
    let advocate = build_model(&llm, Role::DevilsAdvocate, ctx.usage.clone());
    println!("Development LLM: {}", development.describe());
    println!("Devil's Advocate LLM: {}", advocate.describe());

    let reviewers = Reviewers {
        development: &development,
        advocate: &advocate,
    };
    let outcome = run_review(
        &reviewers,
        &llm,
        &draft,
        ctx.paths.root(),
        &ctx.prompter,
        ctx.config.review.max_rounds,
    )
    .await?;

    println!();
    println!(
        "Review finished after {} round(s), final version v{}",
        outcome.rounds, outcome.final_version
    );
    println!("Iteration files in {}", outcome.iteration_dir.display());
    Ok(())
}

/// Phase 5: write `final_report.md`.
pub fn report(ctx: &RunContext) -> Result<PathBuf> {
    banner("PHASE 5: FINAL REPORT GENERATION");
    let paper = load_selected(ctx)?;
    let weights = run_weights(ctx)?;
    let evaluation = load_evaluation(ctx.paths.root());
    if evaluation.is_none() {
        tracing::warn!("No evaluation found, the report will be incomplete");
    }

    let path = ctx.paths.final_report();
    write_text(
        &path,
        &render_final_report(&paper, &weights, evaluation.as_deref(), Local::now()),
    )?;
    println!("Final report saved to {}", path.display());
    Ok(path)
}

/// Phase 6: write `presentation.md`.
pub fn present(ctx: &RunContext) -> Result<PathBuf> {
    banner("PHASE 6: PRESENTATION CREATION");
    let paper = load_selected(ctx)?;
    let path = ctx.paths.presentation();
    write_text(&path, &render_presentation(&paper))?;
    println!("Presentation saved to {}", path.display());
    println!("8 slides for a 15-minute talk. Replace the bracketed placeholders with the paper's content.");
    Ok(path)
}

/// Every phase in order, in the context's run folder.
pub async fn run(ctx: &RunContext) -> Result<()> {
    banner("LITERATURE REVIEW WORKFLOW");
    println!("Run folder: {}", ctx.paths.root().display());
    println!();
    println!("Phases:");
    println!("  0. LLM configuration");
    println!("  1. Scopus search");
    println!("  2. Grading and ranking");
    println!("  3. Paper selection and retrieval");
    println!("  4. Evaluation answers");
    println!("  4.5. Adversarial review");
    println!("  5. Final report");
    println!("  6. Presentation");
    println!();

    if !ctx.prompter.prompt_yes_no("Proceed with full workflow?", false)? {
        println!("Cancelled.");
        return Ok(());
    }

    ctx.usage.reset();
    setup_llm(ctx)?;
    search(ctx).await?;
    grade(ctx, true).await?;
    retrieve(ctx, None).await?;
    evaluate(ctx).await?;
    review(ctx).await?;
    report(ctx)?;
    present(ctx)?;

    banner("WORKFLOW COMPLETE");
    println!("All outputs are in {}", ctx.paths.root().display());
    println!();
    println!("LLM usage:");
    println!("{}", ctx.usage.summary());
    Ok(())
}
