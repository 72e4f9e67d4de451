use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lit_review::pipeline::{self, exit_code, RunContext, RunPaths, EXIT_CONFIG, EXIT_SUCCESS};
use lit_review::prompt::Prompter;
use lit_review::scopus::CacheConfig;

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Remove all cached journal metrics
    Clear,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every phase in a new run folder
    Run,
    /// Create a config file interactively
    Init,
    /// Phase 0: choose the development and devil's advocate models
    SetupLlm,
    /// Phase 1: search Scopus
    Search,
    /// Phase 2: grade and rank the search results
    Grade {
        /// Review and change the weights before grading
        #[arg(long)]
        customize: bool,
    },
    /// List graded papers (best first)
    List {
        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Open a graded paper in the browser by its index number
    Open {
        /// Index number of the paper to open (1-based, as shown in list)
        index: usize,
    },
    /// Phase 3: select a paper and download it with related papers
    Retrieve {
        /// Rank of the paper to select instead of prompting
        #[arg(long)]
        select: Option<usize>,
    },
    /// Phase 4: answer the evaluation questions
    Evaluate,
    /// Phase 4.5: adversarial review of the evaluation draft
    Review,
    /// Phase 5: write the final report
    Report,
    /// Phase 6: write the presentation outline
    Present,
    /// Manage the journal metrics cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Parser, Debug)]
#[command(name = "lit-review")]
#[command(about = "Scopus search, paper grading and LLM-assisted review CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lit-review/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Run folder to work in (defaults to the latest run in the output directory)
    #[arg(long, global = true)]
    run_dir: Option<PathBuf>,

    /// Bypass the journal metrics cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(e: anyhow::Error) -> ! {
    eprintln!("Error: {:#}", e);
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let prompter = match Prompter::from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Commands that don't need a config or run folder
    match cli.command {
        Commands::Init => {
            let default_path = cli.config.as_ref().map(PathBuf::from);
            if let Err(e) = lit_review::config::init::run_init_wizard(&prompter, default_path) {
                fail(e);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Cache {
            action: CacheAction::Clear,
        } => {
            if let Err(e) = lit_review::scopus::clear_cache() {
                fail(e);
            }
            println!("Cache cleared.");
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match lit_review::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = lit_review::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let cache = CacheConfig {
        enabled: !cli.no_cache,
        ttl: match config.scopus.cache_ttl() {
            Ok(ttl) => ttl,
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
    };

    let output_dir = config.output_dir();
    let paths = match cli.command {
        Commands::Run => RunPaths::create_new(&output_dir),
        _ => RunPaths::resolve(cli.run_dir, &output_dir),
    };
    let paths = paths.unwrap_or_else(|e| fail(e));
    tracing::debug!(run_dir = %paths.root().display(), "Run folder");

    let ctx = RunContext::new(config, paths, prompter, cache);

    let result = match cli.command {
        Commands::Run => pipeline::run(&ctx).await,
        Commands::SetupLlm => pipeline::setup_llm(&ctx).map(|_| ()),
        Commands::Search => pipeline::search(&ctx).await.map(|_| ()),
        Commands::Grade { customize } => pipeline::grade(&ctx, customize).await.map(|_| ()),
        Commands::List { tsv } => pipeline::list(&ctx, tsv, cli.verbose),
        Commands::Open { index } => pipeline::open(&ctx, index),
        Commands::Retrieve { select } => pipeline::retrieve(&ctx, select).await.map(|_| ()),
        Commands::Evaluate => pipeline::evaluate(&ctx).await,
        Commands::Review => pipeline::review(&ctx).await,
        Commands::Report => pipeline::report(&ctx).map(|_| ()),
        Commands::Present => pipeline::present(&ctx).map(|_| ()),
        Commands::Init | Commands::Cache { .. } => Ok(()),
    };

    if let Err(e) = result {
        fail(e);
    }
    std::process::exit(EXIT_SUCCESS);
}
