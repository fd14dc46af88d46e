//! Accuracy and support-weighted precision, recall and F1.

use std::collections::BTreeMap;

use common::error::EvalError;
use serde::{Deserialize, Serialize};

use crate::types::Label;

/// The four headline scores of one evaluation run, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F1-Score")]
    pub f1: f64,
}

impl MetricsResult {
    /// Metric names paired with values, in report order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("Accuracy", self.accuracy),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("F1-Score", self.f1),
        ]
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ClassCounts {
    true_positives: usize,
    predicted: usize,
    support: usize,
}

impl ClassCounts {
    fn precision(&self) -> f64 {
        ratio(self.true_positives, self.predicted)
    }

    fn recall(&self) -> f64 {
        ratio(self.true_positives, self.support)
    }

    fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }
}

/// Zero when the denominator is zero.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Score predictions against ground truth.
///
/// Classes predicted but never present in `y_true` carry zero support and
/// therefore zero weight; classes never predicted score zero precision.
pub fn evaluate(y_true: &[Label], y_pred: &[Label]) -> Result<MetricsResult, EvalError> {
    if y_true.len() != y_pred.len() {
        return Err(EvalError::LengthMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EvalError::EmptyInput);
    }

    let mut classes: BTreeMap<&Label, ClassCounts> = BTreeMap::new();
    let mut correct = 0usize;
    for (truth, prediction) in y_true.iter().zip(y_pred) {
        classes.entry(truth).or_default().support += 1;
        classes.entry(prediction).or_default().predicted += 1;
        if truth == prediction {
            classes.entry(truth).or_default().true_positives += 1;
            correct += 1;
        }
    }

    let total = y_true.len();
    let weighted = |score: fn(&ClassCounts) -> f64| {
        classes
            .values()
            .map(|counts| counts.support as f64 * score(counts))
            .sum::<f64>()
            / total as f64
    };

    Ok(MetricsResult {
        accuracy: ratio(correct, total),
        precision: weighted(ClassCounts::precision),
        recall: weighted(ClassCounts::recall),
        f1: weighted(ClassCounts::f1),
    })
}
