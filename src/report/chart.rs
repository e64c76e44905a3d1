//! Line chart comparing historical sales with the forecast.
//!
//! Drawn with plotters into an in-memory RGB buffer, so the same raster feeds
//! the dashboard texture and the JPEG embedded in the PDF report.

use std::panic::{self, AssertUnwindSafe};

use image::{ImageError, Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use thiserror::Error;
use tracing::warn;

use crate::forecast::{ForecastPayload, format_compact};

pub const CHART_WIDTH: u32 = 960;
pub const CHART_HEIGHT: u32 = 480;
/// Smallest raster that still fits the caption, axis labels and legend.
pub const MIN_CHART_SIZE: (u32, u32) = (240, 160);
const JPEG_QUALITY: u8 = 90;

pub const CHART_TITLE: &str = "Historical Sales vs. Forecast";
pub const X_CAPTION: &str = "Time Period";
pub const Y_CAPTION: &str = "Revenue (Units)";
pub const HISTORICAL_LABEL: &str = "Actual Sales";
pub const FORECAST_LABEL: &str = "Forecasted Sales";

const BACKGROUND: RGBColor = RGBColor(255, 255, 255);
const GRID: RGBColor = RGBColor(225, 225, 225);
const AXIS: RGBColor = RGBColor(60, 60, 60);
const HISTORICAL: RGBColor = RGBColor(31, 119, 180);
const FORECAST: RGBColor = RGBColor(255, 127, 14);

const GRID_LINES: usize = 5;
const DASH: i32 = 10;
const DASH_GAP: i32 = 6;
const MARKER_RADIUS: i32 = 3;
const LINE_WIDTH: u32 = 2;

/// Data range mapped onto the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartBounds {
    const UNIT: ChartBounds = ChartBounds {
        x_min: 0.0,
        x_max: 1.0,
        y_min: 0.0,
        y_max: 1.0,
    };

    /// Bounds over the finite points of both series, padded by 5% vertically.
    pub fn of(payload: &ForecastPayload) -> Option<Self> {
        let points = finite_points(&payload.historical_x, &payload.historical_y)
            .into_iter()
            .chain(finite_points(&payload.predicted_x, &payload.predicted_y));
        let (x_min, x_max, y_min, y_max) = points.fold(None, |acc, (x, y)| match acc {
            None => Some((x, x, y, y)),
            Some((x0, x1, y0, y1)) => Some((x0.min(x), x1.max(x), y0.min(y), y1.max(y))),
        })?;
        let pad = ((y_max - y_min) * 0.05).max(1.0);
        let bounds = Self {
            x_min,
            x_max: if x_max > x_min { x_max } else { x_min + 1.0 },
            y_min: y_min - pad,
            y_max: y_max + pad,
        };
        [bounds.x_max - bounds.x_min, bounds.y_max - bounds.y_min]
            .iter()
            .all(|span| span.is_finite())
            .then_some(bounds)
    }
}

/// Pairs `xs` with `ys`, dropping any point with a non-finite coordinate.
fn finite_points(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (x, y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect()
}

#[derive(Debug, Error)]
#[error("{0}")]
struct DrawError(String);

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for DrawError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        DrawError(err.to_string())
    }
}

/// Whether captions, tick labels and the legend are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Text {
    Labelled,
    Plain,
}

/// Render the two-series chart. A payload without plottable data yields an
/// empty frame.
///
/// When no system font can be loaded the chart is drawn without text.
pub fn render_chart(payload: &ForecastPayload, width: u32, height: u32) -> RgbImage {
    let size = (width.max(MIN_CHART_SIZE.0), height.max(MIN_CHART_SIZE.1));
    let mut buffer = vec![0u8; size.0 as usize * size.1 as usize * 3];
    // Font discovery can panic when the system font library is missing.
    let labelled = panic::catch_unwind(AssertUnwindSafe(|| {
        draw(&mut buffer, size, payload, Text::Labelled)
    }));
    let fallback_reason = match labelled {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(_) => Some("font lookup panicked".to_string()),
    };
    if let Some(reason) = fallback_reason {
        warn!("Drawing chart without text: {reason}");
        buffer.fill(0);
        if let Err(err) = draw(&mut buffer, size, payload, Text::Plain) {
            warn!("Chart rendering failed: {err}");
            return RgbImage::from_pixel(size.0, size.1, Rgb([255, 255, 255]));
        }
    }
    RgbImage::from_raw(size.0, size.1, buffer)
        .unwrap_or_else(|| RgbImage::from_pixel(size.0, size.1, Rgb([255, 255, 255])))
}

fn draw(
    buffer: &mut [u8],
    size: (u32, u32),
    payload: &ForecastPayload,
    text: Text,
) -> Result<(), DrawError> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&BACKGROUND)?;
    let plotted = ChartBounds::of(payload);
    let bounds = plotted.unwrap_or(ChartBounds::UNIT);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(12);
    if text == Text::Labelled {
        builder
            .caption(CHART_TITLE, ("sans-serif", 22))
            .x_label_area_size(44)
            .y_label_area_size(64);
    } else {
        builder.x_label_area_size(4).y_label_area_size(4);
    }
    let mut chart = builder
        .build_cartesian_2d(bounds.x_min..bounds.x_max, bounds.y_min..bounds.y_max)
        .map_err(DrawError::from)?;

    match text {
        Text::Labelled => chart
            .configure_mesh()
            .x_labels(GRID_LINES * 2)
            .y_labels(GRID_LINES + 1)
            .light_line_style(GRID.stroke_width(1))
            .bold_line_style(GRID.stroke_width(1))
            .axis_style(AXIS.stroke_width(1))
            .x_desc(X_CAPTION)
            .y_desc(Y_CAPTION)
            .x_label_formatter(&|x| format!("{x:.0}"))
            .y_label_formatter(&|y| format_compact(*y))
            .draw()?,
        Text::Plain => {
            let (x_step, y_step) = (
                (bounds.x_max - bounds.x_min) / GRID_LINES as f64,
                (bounds.y_max - bounds.y_min) / GRID_LINES as f64,
            );
            chart.draw_series((0..=GRID_LINES).flat_map(|i| {
                let x = bounds.x_min + x_step * i as f64;
                let y = bounds.y_min + y_step * i as f64;
                [
                    PathElement::new(vec![(bounds.x_min, y), (bounds.x_max, y)], GRID.stroke_width(1)),
                    PathElement::new(vec![(x, bounds.y_min), (x, bounds.y_max)], GRID.stroke_width(1)),
                ]
            }))?;
            chart.draw_series([
                PathElement::new(
                    vec![(bounds.x_min, bounds.y_min), (bounds.x_max, bounds.y_min)],
                    AXIS.stroke_width(1),
                ),
                PathElement::new(
                    vec![(bounds.x_min, bounds.y_min), (bounds.x_min, bounds.y_max)],
                    AXIS.stroke_width(1),
                ),
            ])?;
        }
    }

    if plotted.is_none() {
        root.present()?;
        return Ok(());
    }
    let historical = finite_points(&payload.historical_x, &payload.historical_y);
    let forecast = finite_points(&payload.predicted_x, &payload.predicted_y);

    chart
        .draw_series(LineSeries::new(
            historical.iter().copied(),
            HISTORICAL.stroke_width(LINE_WIDTH),
        ))?
        .label(HISTORICAL_LABEL)
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], HISTORICAL.stroke_width(LINE_WIDTH))
        });
    // The forecast line starts from the last actual point so the series join.
    let bridged: Vec<(f64, f64)> = historical
        .last()
        .copied()
        .into_iter()
        .chain(forecast.iter().copied())
        .collect();
    chart
        .draw_series(DashedLineSeries::new(
            bridged,
            DASH,
            DASH_GAP,
            FORECAST.stroke_width(LINE_WIDTH),
        ))?
        .label(FORECAST_LABEL)
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], FORECAST.stroke_width(LINE_WIDTH))
        });
    chart.draw_series(
        historical
            .iter()
            .map(|&point| Circle::new(point, MARKER_RADIUS, HISTORICAL.filled())),
    )?;
    chart.draw_series(
        forecast
            .iter()
            .map(|&point| Circle::new(point, MARKER_RADIUS, FORECAST.filled())),
    )?;

    if text == Text::Labelled {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(BACKGROUND.mix(0.85).filled())
            .border_style(AXIS.stroke_width(1))
            .draw()?;
    }
    root.present()?;
    Ok(())
}

/// Encode a raster as baseline JPEG.
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(image)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn payload() -> ForecastPayload {
        ForecastPayload {
            historical_x: vec![0.0, 1.0, 2.0],
            historical_y: vec![10.0, 30.0, 20.0],
            predicted_x: vec![3.0, 4.0],
            predicted_y: vec![25.0, 35.0],
            ..ForecastPayload::default()
        }
    }

    fn count(image: &RgbImage, color: RGBColor) -> usize {
        let RGBColor(r, g, b) = color;
        image.pixels().filter(|p| p.0 == [r, g, b]).count()
    }

    #[test]
    fn draws_both_series_colors() {
        let image = render_chart(&payload(), 320, 200);
        assert_eq!(image.dimensions(), (320, 200));
        assert!(count(&image, HISTORICAL) > 0);
        assert!(count(&image, FORECAST) > 0);
    }

    #[test]
    fn empty_payload_draws_frame_only() {
        let image = render_chart(&ForecastPayload::with_error("no trained model"), 320, 200);
        assert!(count(&image, BACKGROUND) > 0);
        assert_eq!(count(&image, HISTORICAL), 0);
        assert_eq!(count(&image, FORECAST), 0);
    }

    #[test]
    fn tiny_sizes_are_raised_to_the_minimum() {
        let image = render_chart(&payload(), 10, 10);
        assert_eq!(image.dimensions(), MIN_CHART_SIZE);
    }

    #[test]
    fn bounds_cover_both_series() {
        let bounds = ChartBounds::of(&payload()).unwrap();
        assert_eq!((bounds.x_min, bounds.x_max), (0.0, 4.0));
        assert!(bounds.y_min < 10.0 && bounds.y_max > 35.0);
        assert!(ChartBounds::of(&ForecastPayload::default()).is_none());
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let payload = ForecastPayload {
            historical_x: vec![0.0, 1.0, 2.0, f64::NAN],
            historical_y: vec![10.0, f64::INFINITY, 20.0, 5.0],
            predicted_x: vec![3.0, 4.0],
            predicted_y: vec![f64::NEG_INFINITY, 35.0],
            ..ForecastPayload::default()
        };
        let bounds = ChartBounds::of(&payload).unwrap();
        assert_eq!((bounds.x_min, bounds.x_max), (0.0, 4.0));
        assert!(bounds.y_max.is_finite() && bounds.y_max < 100.0);

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let image = render_chart(&payload, 320, 200);
            let _ = tx.send(count(&image, HISTORICAL) > 0);
        });
        let drew_history = rx
            .recv_timeout(Duration::from_secs(20))
            .expect("chart with non-finite values renders promptly");
        assert!(drew_history);
    }

    #[test]
    fn extreme_magnitudes_fall_back_to_unit_bounds() {
        let payload = ForecastPayload {
            historical_x: vec![0.0, 1.0],
            historical_y: vec![-f64::MAX, f64::MAX],
            ..ForecastPayload::default()
        };
        assert!(ChartBounds::of(&payload).is_none());
        let image = render_chart(&payload, 320, 200);
        assert_eq!(image.dimensions(), (320, 200));
        assert_eq!(count(&image, HISTORICAL), 0);
    }

    #[test]
    fn jpeg_has_soi_and_eoi_markers() {
        let bytes = encode_jpeg(&render_chart(&payload(), 320, 200)).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }
}
