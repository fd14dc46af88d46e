use thiserror::Error;

// Core evaluation errors
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Unsupported file format `{0}`. Use JSON or CSV.")]
    UnsupportedFormat(String),
    #[error("Length mismatch: y_true has {expected} labels but y_pred has {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Empty input: no labels to evaluate")]
    EmptyInput,
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Missing value: row {row} has no `{column}`")]
    MissingValue { row: usize, column: String },
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
    #[error("Version conflict: {0}")]
    VersionConflict(String),
    #[error("Render error: {0}")]
    Render(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
