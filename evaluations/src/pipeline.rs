//! One evaluation run: load, score, then write every report artifact.

use std::{fs, path::Path};

use common::{error::EvalError, utils::config::EvalConfig};
use tracing::info;

use crate::{
    confusion::{self, ConfusionMatrix, HeatmapRenderer, MatrixRenderer},
    datasets, export, metadata,
    metrics::{self, MetricsResult},
    report::{self, ReportPaths},
};

#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub metrics: MetricsResult,
    pub paths: ReportPaths,
}

/// Run the full pipeline for `input` under `config` with the plotters heat map.
pub fn run_evaluation(config: &EvalConfig, input: &Path) -> Result<EvaluationOutcome, EvalError> {
    run_evaluation_with(config, input, &HeatmapRenderer)
}

/// Run the full pipeline, drawing the confusion matrix with `renderer`.
///
/// All validation happens before the first write, so a rejected input
/// leaves the reports directory untouched.
pub fn run_evaluation_with(
    config: &EvalConfig,
    input: &Path,
    renderer: &dyn MatrixRenderer,
) -> Result<EvaluationOutcome, EvalError> {
    let results = datasets::load_test_results(input)?;
    info!(
        input = %input.display(),
        samples = results.y_true.len(),
        "Loaded test results"
    );

    let metrics = metrics::evaluate(&results.y_true, &results.y_pred)?;
    let vocabulary = results.vocabulary()?;
    let matrix = ConfusionMatrix::build(&results.y_true, &results.y_pred, &vocabulary)?;
    info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        classes = vocabulary.len(),
        "Evaluation metrics computed"
    );

    let reports_dir = config.reports_dir.as_path();
    fs::create_dir_all(reports_dir)?;

    let confusion_matrix = confusion::save_confusion_matrix(&matrix, reports_dir, renderer)?;
    let metadata = metadata::save_model_metadata(
        reports_dir,
        &config.model_name,
        &config.dataset_name,
        &metrics,
    )?;
    let latest_metrics = report::write_latest_metrics(&metrics, reports_dir)?;

    let csv_export = match config.export_csv.as_deref() {
        Some(path) => {
            export::export_metrics_to_csv(&metrics, path)?;
            Some(path.to_path_buf())
        }
        None => None,
    };
    let pdf_export = match config.export_pdf.as_deref() {
        Some(path) => {
            export::export_metrics_to_pdf(&metrics, path)?;
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(EvaluationOutcome {
        metrics,
        paths: ReportPaths {
            confusion_matrix,
            metadata,
            latest_metrics,
            csv_export,
            pdf_export,
        },
    })
}
