use image::RgbImage;

use super::{JobContext, JobError};
use crate::forecast::{ForecastPayload, Predictor};
use crate::report::{CHART_HEIGHT, CHART_WIDTH, render_chart};

/// Progress values reported by [`run_forecast`], in order.
pub const FORECAST_MILESTONES: [u8; 3] = [20, 70, 100];

/// Forecast plus its rendered chart, ready for the Overview tab.
#[derive(Debug, Clone)]
pub struct ForecastView {
    pub payload: ForecastPayload,
    /// `None` when the payload has no series to plot.
    pub chart: Option<RgbImage>,
}

/// Load the latest model, forecast and rasterize the chart.
///
/// Never fails on missing or corrupt inputs; those come back as a degraded
/// payload. Only cancellation stops it early.
pub fn run_forecast(ctx: &JobContext, predictor: &Predictor) -> Result<ForecastView, JobError> {
    ctx.checkpoint(20)?;
    let payload = predictor.predict_latest();
    ctx.checkpoint(70)?;
    let chart = payload
        .has_series()
        .then(|| render_chart(&payload, CHART_WIDTH, CHART_HEIGHT));
    ctx.checkpoint(100)?;
    Ok(ForecastView { payload, chart })
}
