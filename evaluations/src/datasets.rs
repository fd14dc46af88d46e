//! Loading test results from structured-record (JSON) or tabular (CSV) files.

use std::{fs, path::Path};

use common::error::EvalError;
use serde::{Deserialize, Serialize};

use crate::types::{Label, LabelVocabulary};

const Y_TRUE_COLUMN: &str = "y_true";
const Y_PRED_COLUMN: &str = "y_pred";

/// Input formats recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, EvalError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(EvalError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parallel true/predicted label sequences, plus the optional label vocabulary.
///
/// JSON sequence lengths are not checked here; the metrics engine rejects mismatches.
/// CSV rows always contribute one label to each sequence or fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    pub y_true: Vec<Label>,
    pub y_pred: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<Label>>,
}

impl TestResults {
    /// The supplied labels when present and non-empty, otherwise the sorted union.
    pub fn vocabulary(&self) -> Result<LabelVocabulary, EvalError> {
        match self.labels.as_ref().filter(|labels| !labels.is_empty()) {
            Some(labels) => {
                LabelVocabulary::from_supplied(labels.clone(), &self.y_true, &self.y_pred)
            }
            None => Ok(LabelVocabulary::derive(&self.y_true, &self.y_pred)),
        }
    }
}

pub fn load_test_results(path: &Path) -> Result<TestResults, EvalError> {
    match InputFormat::from_path(path)? {
        InputFormat::Json => load_json(path),
        InputFormat::Csv => load_csv(path),
    }
}

fn load_json(path: &Path) -> Result<TestResults, EvalError> {
    let contents = fs::read(path)?;
    let mut results: TestResults = serde_json::from_slice(&contents)?;
    if results.labels.as_ref().is_some_and(Vec::is_empty) {
        results.labels = None;
    }
    Ok(results)
}

fn load_csv(path: &Path) -> Result<TestResults, EvalError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| EvalError::MissingColumn(name.to_string()))
    };
    let true_index = column(Y_TRUE_COLUMN)?;
    let pred_index = column(Y_PRED_COLUMN)?;

    let mut y_true = Vec::new();
    let mut y_pred = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // Data rows are numbered from 1, after the header.
        let row = index + 1;
        let cell = |column_index: usize, name: &str| {
            record
                .get(column_index)
                .filter(|value| !value.trim().is_empty())
                .map(Label::parse_cell)
                .ok_or_else(|| EvalError::MissingValue {
                    row,
                    column: name.to_string(),
                })
        };
        y_true.push(cell(true_index, Y_TRUE_COLUMN)?);
        y_pred.push(cell(pred_index, Y_PRED_COLUMN)?);
    }

    Ok(TestResults {
        y_true,
        y_pred,
        labels: None,
    })
}
