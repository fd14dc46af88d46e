use std::path::PathBuf;

use clap::Parser;
use common::utils::config::EvalConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Evaluate model from test results", long_about = None)]
pub struct Args {
    /// Test results file (.json or .csv); defaults to the configured input
    pub test_file: Option<PathBuf>,
}

impl Args {
    pub fn resolve_input(&self, config: &EvalConfig) -> PathBuf {
        self.test_file
            .clone()
            .unwrap_or_else(|| config.default_input.clone())
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_input_wins() {
        let args = Args::try_parse_from(["evaluate", "data/results.csv"]).unwrap();
        assert_eq!(
            args.resolve_input(&EvalConfig::default()),
            PathBuf::from("data/results.csv")
        );
    }

    #[test]
    fn falls_back_to_configured_input() {
        let args = Args::try_parse_from(["evaluate"]).unwrap();
        assert_eq!(
            args.resolve_input(&EvalConfig::default()),
            PathBuf::from("backend/test_results.json")
        );
    }

    #[test]
    fn rejects_extra_arguments() {
        assert!(Args::try_parse_from(["evaluate", "a.json", "b.json"]).is_err());
        assert!(Args::try_parse_from(["evaluate", "--reports", "x"]).is_err());
    }
}
