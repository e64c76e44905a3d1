//! Feature pipeline: historical sales records and their calendar features.
//!
//! Rows are built only through [`FeatureRow::new`], so the derived calendar
//! fields always agree with the row date.

mod calendar;
mod error;
mod loader;

pub use calendar::{CalendarFields, HOLIDAY_MONTHS, add_months, is_holiday_month};
pub use error::DataError;
pub use loader::{load_features, parse_features};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::Date;

/// Numeric columns addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Year,
    Month,
    Quarter,
    DayOfYear,
    WeekOfYear,
    MarketingSpend,
    IsHoliday,
    Sales,
}

impl Column {
    /// Every column in canonical order.
    pub const ALL: [Column; 8] = [
        Column::Year,
        Column::Month,
        Column::Quarter,
        Column::DayOfYear,
        Column::WeekOfYear,
        Column::MarketingSpend,
        Column::IsHoliday,
        Column::Sales,
    ];

    /// Feature set used when a training job selects none.
    pub const DEFAULT_FEATURES: [Column; 5] = [
        Column::Year,
        Column::Month,
        Column::Quarter,
        Column::MarketingSpend,
        Column::IsHoliday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Year => "Year",
            Column::Month => "Month",
            Column::Quarter => "Quarter",
            Column::DayOfYear => "DayOfYear",
            Column::WeekOfYear => "WeekOfYear",
            Column::MarketingSpend => "MarketingSpend",
            Column::IsHoliday => "IsHoliday",
            Column::Sales => "Sales",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a column name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown column '{0}'")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| UnknownColumn(name.to_string()))
    }
}

/// One dated sales record plus its derived calendar features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    date: Date,
    calendar: CalendarFields,
    marketing_spend: f64,
    is_holiday: bool,
    sales: Option<f64>,
}

impl FeatureRow {
    /// Build a row, deriving calendar fields from `date`.
    pub fn new(date: Date, marketing_spend: f64, is_holiday: bool, sales: Option<f64>) -> Self {
        Self {
            date,
            calendar: CalendarFields::from_date(date),
            marketing_spend,
            is_holiday,
            sales,
        }
    }

    /// Build a future row to predict; holiday flag comes from the holiday-month set.
    pub fn future(date: Date, marketing_spend: f64) -> Self {
        let is_holiday = is_holiday_month(date.month() as u8);
        Self::new(date, marketing_spend, is_holiday, None)
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn calendar(&self) -> CalendarFields {
        self.calendar
    }

    pub fn marketing_spend(&self) -> f64 {
        self.marketing_spend
    }

    pub fn is_holiday(&self) -> bool {
        self.is_holiday
    }

    /// Observed sales; `None` for rows still to be predicted.
    pub fn sales(&self) -> Option<f64> {
        self.sales
    }

    /// Numeric value of a column, `None` only for missing sales.
    pub fn value(&self, column: Column) -> Option<f64> {
        let calendar = &self.calendar;
        Some(match column {
            Column::Year => calendar.year as f64,
            Column::Month => calendar.month as f64,
            Column::Quarter => calendar.quarter as f64,
            Column::DayOfYear => calendar.day_of_year as f64,
            Column::WeekOfYear => calendar.week_of_year as f64,
            Column::MarketingSpend => self.marketing_spend,
            Column::IsHoliday => {
                if self.is_holiday {
                    1.0
                } else {
                    0.0
                }
            }
            Column::Sales => return self.sales,
        })
    }

    /// Feature vector in the given column order; missing values become NaN.
    pub fn feature_vector(&self, columns: &[Column]) -> Vec<f64> {
        columns
            .iter()
            .map(|&column| self.value(column).unwrap_or(f64::NAN))
            .collect()
    }
}

/// Percentage (0..=100) of rows that look trustworthy.
///
/// A row counts when it is strictly later than the previous row and carries
/// finite, non-negative sales and marketing spend. Empty input scores 0.
pub fn data_quality_score(rows: &[FeatureRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let mut good = 0usize;
    let mut previous: Option<Date> = None;
    for row in rows {
        let ordered = previous.is_none_or(|prev| row.date > prev);
        let sales_ok = row.sales.is_some_and(|s| s.is_finite() && s >= 0.0);
        let spend_ok = row.marketing_spend.is_finite() && row.marketing_spend >= 0.0;
        if ordered && sales_ok && spend_ok {
            good += 1;
        }
        previous = Some(row.date);
    }
    (good as f64 / rows.len() as f64 * 100.0).round()
}
