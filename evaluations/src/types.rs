//! Label values and the vocabulary that orders them.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use common::error::EvalError;
use serde::{Deserialize, Serialize};

/// A categorical class label. Integers sort before strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl Label {
    /// Interpret a tabular cell, preferring an integer reading.
    pub fn parse_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Int)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Ordered set of distinct labels used for confusion matrix axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<Label>,
    positions: HashMap<Label, usize>,
}

impl LabelVocabulary {
    /// Sorted union of every value appearing in either sequence.
    pub fn derive(y_true: &[Label], y_pred: &[Label]) -> Self {
        let distinct: BTreeSet<&Label> = y_true.iter().chain(y_pred).collect();
        Self::from_ordered(distinct.into_iter().cloned().collect())
    }

    /// Use a caller-supplied ordering. Every observed value must be present.
    pub fn from_supplied(
        labels: Vec<Label>,
        y_true: &[Label],
        y_pred: &[Label],
    ) -> Result<Self, EvalError> {
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = labels.iter().find(|label| !seen.insert(*label)) {
            return Err(EvalError::UnknownLabel(format!(
                "`{duplicate}` is listed more than once in labels"
            )));
        }

        let vocabulary = Self::from_ordered(labels);
        if let Some(missing) = y_true
            .iter()
            .chain(y_pred)
            .find(|label| vocabulary.position(label).is_none())
        {
            return Err(EvalError::UnknownLabel(format!(
                "`{missing}` does not appear in the supplied labels"
            )));
        }
        Ok(vocabulary)
    }

    fn from_ordered(labels: Vec<Label>) -> Self {
        let positions = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.clone(), index))
            .collect();
        Self { labels, positions }
    }

    pub fn position(&self, label: &Label) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Label> {
        values.iter().copied().map(Label::Int).collect()
    }

    #[test]
    fn parse_cell_prefers_integers() {
        assert_eq!(Label::parse_cell(" 2 "), Label::Int(2));
        assert_eq!(Label::parse_cell("-7"), Label::Int(-7));
        assert_eq!(Label::parse_cell("Intent A"), Label::from("Intent A"));
    }

    #[test]
    fn derived_vocabulary_is_sorted_union() {
        let vocabulary = LabelVocabulary::derive(&ints(&[2, 0, 2]), &ints(&[1, 0, 3]));
        assert_eq!(vocabulary.labels(), ints(&[0, 1, 2, 3]).as_slice());
        assert_eq!(vocabulary.position(&Label::Int(3)), Some(3));
    }

    #[test]
    fn integers_sort_before_text() {
        let y_true = vec![Label::from("b"), Label::Int(10)];
        let y_pred = vec![Label::from("a"), Label::Int(2)];
        let vocabulary = LabelVocabulary::derive(&y_true, &y_pred);
        assert_eq!(
            vocabulary.labels(),
            &[
                Label::Int(2),
                Label::Int(10),
                Label::from("a"),
                Label::from("b")
            ]
        );
    }

    #[test]
    fn supplied_vocabulary_keeps_caller_order() {
        let vocabulary =
            LabelVocabulary::from_supplied(ints(&[2, 1, 0]), &ints(&[0, 1]), &ints(&[2, 2]))
                .unwrap();
        assert_eq!(vocabulary.position(&Label::Int(2)), Some(0));
        assert_eq!(vocabulary.len(), 3);
    }

    #[test]
    fn supplied_vocabulary_rejects_unseen_values() {
        let err = LabelVocabulary::from_supplied(ints(&[0, 1]), &ints(&[0, 1]), &ints(&[2, 0]))
            .unwrap_err();
        assert!(matches!(err, EvalError::UnknownLabel(ref msg) if msg.contains('2')));
    }

    #[test]
    fn supplied_vocabulary_rejects_duplicates() {
        let err = LabelVocabulary::from_supplied(ints(&[0, 1, 0]), &ints(&[0]), &ints(&[1]))
            .unwrap_err();
        assert!(matches!(err, EvalError::UnknownLabel(_)));
    }
}
