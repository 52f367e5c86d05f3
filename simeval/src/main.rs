//! Simplification evaluation CLI

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use simeval::{
    config::Config,
    data::{load_corpus, InputPaths},
    evaluator::{run_evaluation, EvaluatorRegistry},
};

#[derive(Parser)]
#[command(name = "simeval")]
#[command(about = "Score model outputs with a multi-dimensional text quality evaluator")]
#[command(version)]
struct Cli {
    /// Path to a JSONL file with model outputs and optionally source and reference sentences
    hyp_file: PathBuf,

    /// Path to a JSONL/TSV file with source and optionally reference sentences
    #[arg(long = "src_file")]
    src_file: Option<PathBuf>,

    /// Path to a TXT file with reference sentences (assumes only one reference set)
    #[arg(long = "ref_file")]
    ref_file: Option<PathBuf>,

    /// Task to evaluate as (any task known to the evaluator configuration)
    #[arg(long, default_value = "summarization")]
    task: String,

    /// Write the score report as JSON
    #[arg(long = "out_file")]
    out_file: Option<PathBuf>,

    /// Evaluator configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("simeval=debug,info")
    } else {
        EnvFilter::new("simeval=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?;

    let corpus = load_corpus(&InputPaths {
        hyp_file: cli.hyp_file,
        src_file: cli.src_file,
        ref_file: cli.ref_file,
    })?;
    tracing::info!("Aligned {} items", corpus.len());

    let registry = EvaluatorRegistry::new(config);
    let evaluator = registry.get_evaluator(&cli.task)?;

    let report = run_evaluation(evaluator.as_ref(), &corpus, true).await?;

    if let Some(out_file) = cli.out_file {
        report.write_to_file(&out_file)?;
        println!("\nScores written to: {}", out_file.display());
    }

    Ok(())
}
