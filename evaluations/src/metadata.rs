//! Versioned `model_metadata_v{n}.json` records.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use common::error::EvalError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{metrics::MetricsResult, versioning};

const METADATA_BASE_NAME: &str = "model_metadata";
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One evaluation run's identity and scores. Written once, never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadataRecord {
    pub version: u32,
    pub model_name: String,
    pub dataset: String,
    pub metrics: MetricsResult,
    pub date: String,
}

pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

/// Persist a record under the next free metadata version and return its path.
pub fn save_model_metadata(
    reports_dir: &Path,
    model_name: &str,
    dataset: &str,
    metrics: &MetricsResult,
) -> Result<PathBuf, EvalError> {
    let date = format_timestamp(&Local::now());
    let slot = versioning::write_versioned(reports_dir, METADATA_BASE_NAME, "json", |path, slot| {
        let record = ModelMetadataRecord {
            version: slot.sequence(),
            model_name: model_name.to_string(),
            dataset: dataset.to_string(),
            metrics: *metrics,
            date: date.clone(),
        };
        let blob = serde_json::to_vec_pretty(&record)?;
        fs::write(path, blob)?;
        Ok(())
    })?;

    let path = slot.path();
    info!(path = %path.display(), version = slot.sequence(), "Metadata saved");
    Ok(path)
}
