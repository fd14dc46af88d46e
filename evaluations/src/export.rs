//! Tabular (CSV) and printable (PDF) exports of a metrics result.

use std::path::Path;

use common::error::EvalError;
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream,
};
use tracing::info;

use crate::{metrics::MetricsResult, versioning};

/// US Letter, in points.
const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const TEXT_LEFT: i64 = 100;
const TITLE_TOP: i64 = 750;
const FIRST_ROW_TOP: i64 = 700;
const ROW_SPACING: i64 = 20;
const FONT_SIZE: i64 = 12;

/// Write the metrics as a header row plus one value row.
pub fn export_metrics_to_csv(metrics: &MetricsResult, path: &Path) -> Result<(), EvalError> {
    versioning::write_replacing(path, |scratch| {
        let mut writer = csv::Writer::from_path(scratch)?;
        writer.serialize(metrics)?;
        writer.flush()?;
        Ok(())
    })?;
    info!(path = %path.display(), "Metrics exported to CSV");
    Ok(())
}

/// Write a one-page report listing each metric to four decimal places.
pub fn export_metrics_to_pdf(metrics: &MetricsResult, path: &Path) -> Result<(), EvalError> {
    let mut document = build_report_document(metrics)?;
    versioning::write_replacing(path, |scratch| {
        document.save(scratch)?;
        Ok(())
    })?;
    info!(path = %path.display(), "Metrics exported to PDF");
    Ok(())
}

pub(crate) fn report_lines(metrics: &MetricsResult) -> Vec<String> {
    metrics
        .entries()
        .iter()
        .map(|(name, value)| format!("{name}: {value:.4}"))
        .collect()
}

fn text_at(operations: &mut Vec<Operation>, left: i64, top: i64, text: &str) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
    operations.push(Operation::new("Td", vec![left.into(), top.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::string_literal(text)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

fn build_report_document(metrics: &MetricsResult) -> Result<Document, EvalError> {
    let mut operations = Vec::new();
    text_at(&mut operations, TEXT_LEFT, TITLE_TOP, "Evaluation Report");
    let mut top = FIRST_ROW_TOP;
    for line in report_lines(metrics) {
        text_at(&mut operations, TEXT_LEFT, top, &line);
        top -= ROW_SPACING;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}
