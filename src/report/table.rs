use crate::forecast::ForecastPayload;

pub const TABLE_HEADER: [&str; 3] = ["Time Period", "Actual Sales", "Forecasted Sales"];
pub const PLACEHOLDER: &str = "-";

/// One row of the detailed data table, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub period: String,
    pub actual: String,
    pub forecast: String,
}

impl TableRow {
    pub fn cells(&self) -> [&str; 3] {
        [&self.period, &self.actual, &self.forecast]
    }
}

/// Merge the historical and forecast series by period, ascending.
///
/// A period present in only one series shows [`PLACEHOLDER`] in the other
/// column. Periods are rendered as whole numbers.
pub fn merge_series(payload: &ForecastPayload) -> Vec<TableRow> {
    let mut merged: Vec<(i64, Option<f64>, Option<f64>)> = Vec::new();
    let mut upsert = |x: f64, y: f64, forecast: bool| {
        let period = x.round() as i64;
        let slot = match merged.iter().position(|(p, _, _)| *p == period) {
            Some(pos) => &mut merged[pos],
            None => {
                merged.push((period, None, None));
                let last = merged.len() - 1;
                &mut merged[last]
            }
        };
        if forecast {
            slot.2 = Some(y);
        } else {
            slot.1 = Some(y);
        }
    };
    for (&x, &y) in payload.historical_x.iter().zip(&payload.historical_y) {
        upsert(x, y, false);
    }
    for (&x, &y) in payload.predicted_x.iter().zip(&payload.predicted_y) {
        upsert(x, y, true);
    }
    merged.sort_by_key(|(period, _, _)| *period);
    merged
        .into_iter()
        .map(|(period, actual, forecast)| TableRow {
            period: period.to_string(),
            actual: format_cell(actual),
            forecast: format_cell(forecast),
        })
        .collect()
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => PLACEHOLDER.to_string(),
    }
}
