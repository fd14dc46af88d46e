use anyhow::Context;
use common::utils::config::get_config;
use evaluations::{args, report};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let parsed = args::parse();
    let config = get_config().context("loading evaluation configuration")?;
    let input = parsed.resolve_input(&config);

    info!(
        input = %input.display(),
        reports_dir = %config.reports_dir.display(),
        model = config.model_name.as_str(),
        dataset = config.dataset_name.as_str(),
        "Starting evaluation run"
    );

    let outcome = evaluations::run_evaluation(&config, &input)
        .with_context(|| format!("evaluating test results from {}", input.display()))?;

    println!(
        "[{}] {} -> {}",
        config.model_name,
        report::summary_line(&outcome.metrics),
        outcome.paths
    );

    Ok(())
}
