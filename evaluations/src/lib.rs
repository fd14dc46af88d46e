pub mod args;
pub mod confusion;
pub mod datasets;
pub mod export;
pub mod fixtures;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod versioning;

pub use pipeline::{run_evaluation, run_evaluation_with, EvaluationOutcome};
