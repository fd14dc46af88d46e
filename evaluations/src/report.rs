use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use common::error::EvalError;
use tracing::info;

use crate::{export, metrics::MetricsResult, versioning};

pub const LATEST_METRICS_FILE: &str = "latest_metrics.json";

/// Everything one pipeline run wrote to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub confusion_matrix: PathBuf,
    pub metadata: PathBuf,
    pub latest_metrics: PathBuf,
    pub csv_export: Option<PathBuf>,
    pub pdf_export: Option<PathBuf>,
}

impl fmt::Display for ReportPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Confusion: {} | Metadata: {} | Latest: {}",
            self.confusion_matrix.display(),
            self.metadata.display(),
            self.latest_metrics.display()
        )?;
        if let Some(path) = &self.csv_export {
            write!(f, " | CSV: {}", path.display())?;
        }
        if let Some(path) = &self.pdf_export {
            write!(f, " | PDF: {}", path.display())?;
        }
        Ok(())
    }
}

/// Overwrite the unversioned `latest_metrics.json` pointer.
pub fn write_latest_metrics(
    metrics: &MetricsResult,
    reports_dir: &Path,
) -> Result<PathBuf, EvalError> {
    let path = reports_dir.join(LATEST_METRICS_FILE);
    let blob = serde_json::to_vec_pretty(metrics)?;
    versioning::write_replacing(&path, |scratch| Ok(fs::write(scratch, &blob)?))?;
    info!(path = %path.display(), "Latest metrics exported");
    Ok(path)
}

pub fn summary_line(metrics: &MetricsResult) -> String {
    export::report_lines(metrics).join(" | ")
}
