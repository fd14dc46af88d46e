use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use evaluations::fixtures::{self, FixtureSettings, DEFAULT_CLASSES, DEFAULT_SAMPLES};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Write random y_true/y_pred fixtures as CSV and JSON", long_about = None)]
struct Args {
    /// Number of labelled samples
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Number of classes; labels are drawn from 0..classes
    #[arg(long, default_value_t = DEFAULT_CLASSES, value_parser = clap::value_parser!(u32).range(1..))]
    classes: u32,

    /// Seed for reproducible fixtures
    #[arg(long, env = "EVAL_FIXTURE_SEED")]
    seed: Option<u64>,

    /// Directory receiving test_results.csv and test_results.json
    #[arg(long, default_value = "backend")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let args = Args::parse();
    let settings = FixtureSettings {
        samples: args.samples,
        classes: args.classes,
        seed: args.seed,
    };
    let results = fixtures::generate(&settings).context("generating test fixtures")?;
    let paths = fixtures::write_fixtures(&results, &args.out_dir)
        .with_context(|| format!("writing fixtures to {}", args.out_dir.display()))?;

    info!(path = %paths.csv.display(), "CSV test dataset saved");
    info!(path = %paths.json.display(), "JSON test dataset saved");
    Ok(())
}
