//! Reshape ASSET human ratings into evaluator meta-evaluation records

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use simeval::reshape::{
    load_ratings, load_reference_sets, ratings_path, reshape, write_records, DEFAULT_NUM_REFS,
    DEFAULT_SEED,
};

#[derive(Parser)]
#[command(name = "simeval-asset")]
#[command(about = "Convert ASSET human ratings into the evaluator's annotated data format")]
#[command(version)]
struct Cli {
    /// ASSET checkout containing dataset/ and human_ratings/
    #[arg(long)]
    asset_dir: PathBuf,

    /// Output JSON file
    #[arg(long, default_value = "data/simplification/asset.json")]
    out_file: PathBuf,

    /// Seed for reference sampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of reference files (asset.test.simp.0 ..)
    #[arg(long, default_value_t = DEFAULT_NUM_REFS)]
    num_refs: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("simeval=debug,info")
    } else {
        EnvFilter::new("simeval=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let references = load_reference_sets(&cli.asset_dir, cli.num_refs)?;
    tracing::info!("Loaded reference sets for {} sentences", references.len());

    let ratings_file = ratings_path(&cli.asset_dir);
    let rows = load_ratings(&ratings_file)?;
    tracing::info!("Loaded {} ratings from {}", rows.len(), ratings_file.display());

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let records = reshape(rows, &references, &mut rng)?;

    write_records(&cli.out_file, &records)?;
    println!(
        "Collected {} annotated data points. See {}",
        records.len(),
        cli.out_file.display()
    );
    Ok(())
}
