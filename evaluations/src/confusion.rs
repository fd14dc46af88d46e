//! Confusion matrix counting and heat-map rendering.

use std::path::{Path, PathBuf};

use common::error::EvalError;
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use tracing::info;

use crate::{
    types::{Label, LabelVocabulary},
    versioning,
};

const CONFUSION_BASE_NAME: &str = "confusion_matrix";
const IMAGE_SIZE: (u32, u32) = (600, 400);
const GRID_LEFT: i32 = 110;
const GRID_TOP: i32 = 50;
const GRID_WIDTH: i32 = 460;
const GRID_HEIGHT: i32 = 280;
const LIGHTEST: RGBColor = RGBColor(247, 251, 255);
const DARKEST: RGBColor = RGBColor(8, 48, 107);

/// Square count matrix indexed by `(true position, predicted position)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<Label>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn build(
        y_true: &[Label],
        y_pred: &[Label],
        vocabulary: &LabelVocabulary,
    ) -> Result<Self, EvalError> {
        if y_true.len() != y_pred.len() {
            return Err(EvalError::LengthMismatch {
                expected: y_true.len(),
                actual: y_pred.len(),
            });
        }

        let size = vocabulary.len();
        let mut counts = vec![vec![0usize; size]; size];
        let locate = |label: &Label| {
            vocabulary
                .position(label)
                .ok_or_else(|| EvalError::UnknownLabel(format!("`{label}` is not in the vocabulary")))
        };
        for (truth, prediction) in y_true.iter().zip(y_pred) {
            let row = locate(truth)?;
            let column = locate(prediction)?;
            if let Some(cell) = counts.get_mut(row).and_then(|cells| cells.get_mut(column)) {
                *cell += 1;
            }
        }

        Ok(Self {
            labels: vocabulary.labels().to_vec(),
            counts,
        })
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn count(&self, truth: usize, prediction: usize) -> Option<usize> {
        self.counts.get(truth)?.get(prediction).copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Turns a confusion matrix into an image file at the given path.
pub trait MatrixRenderer {
    fn render(&self, matrix: &ConfusionMatrix, path: &Path) -> Result<(), EvalError>;
}

/// Blue heat map drawn with plotters.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeatmapRenderer;

impl MatrixRenderer for HeatmapRenderer {
    fn render(&self, matrix: &ConfusionMatrix, path: &Path) -> Result<(), EvalError> {
        render_heatmap(matrix, path)
    }
}

/// Render the matrix as an annotated heat map; the format follows the path extension.
///
/// Rows are true labels top to bottom, columns are predicted labels left to right.
pub fn render_heatmap(matrix: &ConfusionMatrix, path: &Path) -> Result<(), EvalError> {
    let size = i32::try_from(matrix.labels().len())
        .map_err(|_| EvalError::Render("too many labels to plot".into()))?
        .max(1);
    let cell_width = GRID_WIDTH / size;
    let cell_height = GRID_HEIGHT / size;
    let peak = matrix.max_count().max(1) as f64;

    let root = BitMapBackend::new(path, IMAGE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    root.draw(&Text::new(
        "Confusion Matrix",
        (GRID_LEFT + GRID_WIDTH / 2, GRID_TOP / 2),
        label_style(22, &BLACK, HPos::Center),
    ))
    .map_err(render_error)?;

    for (row, counts) in (0..size).zip(matrix.rows()) {
        for (column, &count) in (0..size).zip(counts) {
            let left = GRID_LEFT + column * cell_width;
            let top = GRID_TOP + row * cell_height;
            let intensity = count as f64 / peak;
            root.draw(&Rectangle::new(
                [(left, top), (left + cell_width, top + cell_height)],
                shade(intensity).filled(),
            ))
            .map_err(render_error)?;

            let ink = if intensity > 0.5 { WHITE } else { BLACK };
            root.draw(&Text::new(
                count.to_string(),
                (left + cell_width / 2, top + cell_height / 2),
                label_style(18, &ink, HPos::Center),
            ))
            .map_err(render_error)?;
        }
    }

    for (index, label) in (0..size).zip(matrix.labels()) {
        root.draw(&Text::new(
            label.to_string(),
            (
                GRID_LEFT + index * cell_width + cell_width / 2,
                GRID_TOP + GRID_HEIGHT + 14,
            ),
            label_style(14, &BLACK, HPos::Center),
        ))
        .map_err(render_error)?;
        root.draw(&Text::new(
            label.to_string(),
            (GRID_LEFT - 8, GRID_TOP + index * cell_height + cell_height / 2),
            label_style(14, &BLACK, HPos::Right),
        ))
        .map_err(render_error)?;
    }

    root.draw(&Text::new(
        "Predicted",
        (GRID_LEFT + GRID_WIDTH / 2, GRID_TOP + GRID_HEIGHT + 40),
        label_style(16, &BLACK, HPos::Center),
    ))
    .map_err(render_error)?;
    root.draw(&Text::new(
        "True",
        (20, GRID_TOP + GRID_HEIGHT / 2),
        ("sans-serif", 16)
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
    .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn label_style(size: u32, color: &RGBColor, anchor: HPos) -> TextStyle<'static> {
    ("sans-serif", size)
        .into_font()
        .color(color)
        .pos(Pos::new(anchor, VPos::Center))
}

fn render_error(err: impl std::fmt::Display) -> EvalError {
    EvalError::Render(err.to_string())
}

/// Blend from the lightest to the darkest blue; `intensity` is clamped to `[0, 1]`.
fn shade(intensity: f64) -> RGBColor {
    let t = intensity.clamp(0.0, 1.0);
    let mix = |light: u8, dark: u8| {
        let value = f64::from(light) + (f64::from(dark) - f64::from(light)) * t;
        value.round().clamp(0.0, 255.0) as u8
    };
    RGBColor(
        mix(LIGHTEST.0, DARKEST.0),
        mix(LIGHTEST.1, DARKEST.1),
        mix(LIGHTEST.2, DARKEST.2),
    )
}

/// Render to the next free `confusion_matrix_v{n}.png` in `reports_dir`.
pub fn save_confusion_matrix(
    matrix: &ConfusionMatrix,
    reports_dir: &Path,
    renderer: &dyn MatrixRenderer,
) -> Result<PathBuf, EvalError> {
    let slot = versioning::write_versioned(reports_dir, CONFUSION_BASE_NAME, "png", |path, _| {
        renderer.render(matrix, path)
    })?;
    let path = slot.path();
    info!(path = %path.display(), version = slot.sequence(), "Confusion matrix saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Label> {
        values.iter().copied().map(Label::Int).collect()
    }

    #[test]
    fn counts_true_against_predicted() {
        let y_true = ints(&[0, 1, 1, 0]);
        let y_pred = ints(&[0, 1, 0, 0]);
        let vocabulary = LabelVocabulary::derive(&y_true, &y_pred);

        let matrix = ConfusionMatrix::build(&y_true, &y_pred, &vocabulary).unwrap();
        assert_eq!(matrix.rows(), &[vec![2, 0], vec![1, 1]]);
        assert_eq!(matrix.total(), 4);
    }

    #[test]
    fn follows_supplied_axis_order() {
        let y_true = ints(&[0, 1, 1, 0]);
        let y_pred = ints(&[0, 1, 0, 0]);
        let vocabulary = LabelVocabulary::from_supplied(ints(&[1, 0, 2]), &y_true, &y_pred).unwrap();

        let matrix = ConfusionMatrix::build(&y_true, &y_pred, &vocabulary).unwrap();
        assert_eq!(matrix.labels(), ints(&[1, 0, 2]).as_slice());
        assert_eq!(
            matrix.rows(),
            &[vec![1, 1, 0], vec![0, 2, 0], vec![0, 0, 0]]
        );
        assert_eq!(matrix.count(1, 0), Some(0));
        assert_eq!(matrix.count(3, 0), None);
    }

    #[test]
    fn rejects_labels_outside_vocabulary() {
        let vocabulary = LabelVocabulary::derive(&ints(&[0]), &ints(&[1]));
        let err = ConfusionMatrix::build(&ints(&[0, 2]), &ints(&[1, 1]), &vocabulary).unwrap_err();
        assert!(matches!(err, EvalError::UnknownLabel(_)));
    }

    #[test]
    fn shade_spans_the_palette() {
        assert_eq!(shade(0.0), LIGHTEST);
        assert_eq!(shade(1.0), DARKEST);
        assert_eq!(shade(7.0), DARKEST);
    }

    struct CountsRenderer;

    impl MatrixRenderer for CountsRenderer {
        fn render(&self, matrix: &ConfusionMatrix, path: &Path) -> Result<(), EvalError> {
            Ok(std::fs::write(path, format!("{:?}", matrix.rows()))?)
        }
    }

    #[test]
    fn saves_through_renderer_into_versioned_slots() {
        let dir = tempfile::tempdir().unwrap();
        let y_true = ints(&[0, 1, 1, 0]);
        let y_pred = ints(&[0, 1, 0, 0]);
        let vocabulary = LabelVocabulary::derive(&y_true, &y_pred);
        let matrix = ConfusionMatrix::build(&y_true, &y_pred, &vocabulary).unwrap();

        let first = save_confusion_matrix(&matrix, dir.path(), &CountsRenderer).unwrap();
        let second = save_confusion_matrix(&matrix, dir.path(), &CountsRenderer).unwrap();

        assert_eq!(first, dir.path().join("confusion_matrix_v1.png"));
        assert_eq!(second, dir.path().join("confusion_matrix_v2.png"));
        assert_eq!(
            std::fs::read_to_string(&first).unwrap(),
            "[[2, 0], [1, 1]]"
        );
    }

    /// Axis labels need a system sans-serif font.
    fn sans_serif_available() -> bool {
        ("sans-serif", 12).into_font().box_size("0").is_ok()
    }

    #[test]
    fn heatmap_writes_png() {
        if !sans_serif_available() {
            eprintln!("skipping heatmap_writes_png: no sans-serif font installed");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let y_true = ints(&[0, 1, 2, 2, 1]);
        let y_pred = ints(&[0, 2, 2, 1, 1]);
        let vocabulary = LabelVocabulary::derive(&y_true, &y_pred);
        let matrix = ConfusionMatrix::build(&y_true, &y_pred, &vocabulary).unwrap();

        let path = save_confusion_matrix(&matrix, dir.path(), &HeatmapRenderer).unwrap();

        assert_eq!(path, dir.path().join("confusion_matrix_v1.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
