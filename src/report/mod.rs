//! Sales performance report: chart, detailed data table and PDF output.

mod chart;
mod pdf;
mod table;

pub use chart::{
    CHART_HEIGHT, CHART_TITLE, CHART_WIDTH, ChartBounds, FORECAST_LABEL, HISTORICAL_LABEL,
    MIN_CHART_SIZE, X_CAPTION, Y_CAPTION, encode_jpeg, render_chart,
};
pub use pdf::{JpegImage, ReportDocument, page_count, render_pdf};
pub use table::{PLACEHOLDER, TABLE_HEADER, TableRow, merge_series};

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use tracing::info;

use crate::forecast::{ForecastPayload, Predictor};

pub const REPORT_PREFIX: &str = "Quarterly_Sales_Forecast_";
pub const INTRO_TEXT: &str = "This report summarizes the recent sales performance against the \
generated forecast. The following chart visualizes the comparison, and the table provides the \
underlying data points.";

const NAME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode chart: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format report name: {0}")]
    Name(#[from] time::error::Format),
}

/// Default report name for a creation time.
pub fn report_name_at(created: OffsetDateTime) -> Result<String, ReportError> {
    Ok(format!("{REPORT_PREFIX}{}", created.format(NAME_FORMAT)?))
}

/// `<dir>/<name>.pdf`
pub fn report_path(dir: &Path, report_name: &str) -> PathBuf {
    dir.join(format!("{report_name}.pdf"))
}

/// Forecast, compose and write a report in one call.
pub fn build_report(
    output_path: &Path,
    report_name: &str,
    predictor: &Predictor,
) -> Result<(), ReportError> {
    let payload = predictor.predict_latest();
    let document = compose(report_name, &payload)?;
    write_report(output_path, &document)
}

/// Render the chart and assemble the document for `payload`.
pub fn compose(report_name: &str, payload: &ForecastPayload) -> Result<ReportDocument, ReportError> {
    let raster = render_chart(payload, CHART_WIDTH, CHART_HEIGHT);
    let data = encode_jpeg(&raster)?;
    Ok(ReportDocument {
        title: format!("Sales Performance Report: {report_name}"),
        intro: INTRO_TEXT.to_string(),
        note: payload
            .error
            .as_ref()
            .map(|error| format!("Note: forecast data unavailable ({error}).")),
        chart: JpegImage {
            width: raster.width(),
            height: raster.height(),
            data,
        },
        rows: merge_series(payload),
    })
}

/// Serialize `document` to `output_path` through a sibling temp file.
///
/// Parent directories are created. On failure nothing exists at `output_path`
/// unless a previous report was already there.
pub fn write_report(output_path: &Path, document: &ReportDocument) -> Result<(), ReportError> {
    stage_report(output_path, document)?.persist()
}

/// A fully written report still waiting under a temp name next to its
/// destination. Dropping it deletes the temp file.
#[derive(Debug)]
pub struct StagedReport {
    temp: NamedTempFile,
    output_path: PathBuf,
    rows: usize,
    bytes: usize,
}

impl StagedReport {
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Move the staged bytes to the final path.
    pub fn persist(self) -> Result<(), ReportError> {
        let Self {
            temp,
            output_path,
            rows,
            bytes,
        } = self;
        temp.persist(&output_path)
            .map_err(|err| ReportError::Write {
                path: output_path.clone(),
                source: err.error,
            })?;
        info!(
            "Wrote report {} ({rows} rows, {bytes} bytes)",
            output_path.display()
        );
        Ok(())
    }
}

/// Render `document` into a temp file beside `output_path` without touching
/// the final path.
pub fn stage_report(
    output_path: &Path,
    document: &ReportDocument,
) -> Result<StagedReport, ReportError> {
    let parent = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|source| ReportError::CreateDir {
        path: parent.clone(),
        source,
    })?;
    let bytes = render_pdf(document);
    let write_error = |source| ReportError::Write {
        path: output_path.to_path_buf(),
        source,
    };
    let mut temp = NamedTempFile::new_in(&parent).map_err(write_error)?;
    temp.write_all(&bytes).map_err(write_error)?;
    temp.flush().map_err(write_error)?;
    Ok(StagedReport {
        temp,
        output_path: output_path.to_path_buf(),
        rows: document.rows.len(),
        bytes: bytes.len(),
    })
}
