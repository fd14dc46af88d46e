//! Random test-result fixtures in both supported input formats.

use std::{
    fs,
    path::{Path, PathBuf},
};

use common::error::EvalError;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{datasets::TestResults, types::Label};

pub const DEFAULT_SAMPLES: usize = 20;
pub const DEFAULT_CLASSES: u32 = 3;
pub const CSV_FILE_NAME: &str = "test_results.csv";
pub const JSON_FILE_NAME: &str = "test_results.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureSettings {
    pub samples: usize,
    pub classes: u32,
    /// Fixed seed for reproducible fixtures; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            classes: DEFAULT_CLASSES,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// Draw independent uniform true and predicted labels in `0..classes`.
pub fn generate(settings: &FixtureSettings) -> Result<TestResults, EvalError> {
    if settings.samples == 0 || settings.classes == 0 {
        return Err(EvalError::EmptyInput);
    }
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let draw = |rng: &mut StdRng| -> Vec<Label> {
        (0..settings.samples)
            .map(|_| Label::Int(i64::from(rng.gen_range(0..settings.classes))))
            .collect()
    };
    let y_true = draw(&mut rng);
    let y_pred = draw(&mut rng);
    let labels = (0..settings.classes).map(|class| Label::Int(i64::from(class))).collect();

    Ok(TestResults {
        y_true,
        y_pred,
        labels: Some(labels),
    })
}

/// Tabular form: `y_true,y_pred` columns, no vocabulary.
pub fn write_csv(results: &TestResults, path: &Path) -> Result<(), EvalError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["y_true", "y_pred"])?;
    for (truth, prediction) in results.y_true.iter().zip(&results.y_pred) {
        writer.write_record([truth.to_string(), prediction.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Structured-record form, including the vocabulary.
pub fn write_json(results: &TestResults, path: &Path) -> Result<(), EvalError> {
    let blob = serde_json::to_vec_pretty(results)?;
    fs::write(path, blob)?;
    Ok(())
}

pub fn write_fixtures(results: &TestResults, out_dir: &Path) -> Result<FixturePaths, EvalError> {
    fs::create_dir_all(out_dir)?;
    let paths = FixturePaths {
        csv: out_dir.join(CSV_FILE_NAME),
        json: out_dir.join(JSON_FILE_NAME),
    };
    write_csv(results, &paths.csv)?;
    write_json(results, &paths.json)?;
    Ok(paths)
}
