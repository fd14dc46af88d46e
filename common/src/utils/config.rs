use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings threaded through one evaluation run.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
    #[serde(default = "default_input")]
    pub default_input: PathBuf,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,
    /// Tabular export of the metrics row, skipped when unset.
    #[serde(default)]
    pub export_csv: Option<PathBuf>,
    /// Printable export of the metrics, skipped when unset.
    #[serde(default)]
    pub export_pdf: Option<PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            default_input: default_input(),
            model_name: default_model_name(),
            dataset_name: default_dataset_name(),
            export_csv: None,
            export_pdf: None,
        }
    }
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("backend/reports")
}

fn default_input() -> PathBuf {
    PathBuf::from("backend/test_results.json")
}

fn default_model_name() -> String {
    "transformer_v1".to_string()
}

fn default_dataset_name() -> String {
    "intent_dataset_v2".to_string()
}

/// Loads `evaluation.{toml,yaml,json}` if present, overridden by `EVAL_*` variables.
pub fn get_config() -> Result<EvalConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("evaluation").required(false))
        .add_source(Environment::with_prefix("EVAL"))
        .build()?;

    config.try_deserialize()
}
