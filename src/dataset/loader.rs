use std::io::Read;
use std::path::Path;

use time::{Date, format_description::FormatItem, macros::format_description};

use super::{DataError, FeatureRow, calendar::is_holiday_month};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Load and featurize a sales CSV.
///
/// Requires `Date`, `Sales` and `MarketingSpend` headers; `IsHoliday` is
/// optional and derived from the holiday-month set when absent. Rows come back
/// sorted by date. Any malformed row fails the whole load.
pub fn load_features(path: &Path) -> Result<Vec<FeatureRow>, DataError> {
    let file = std::fs::File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DataError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DataError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let rows = parse_features(file, path)?;
    tracing::debug!("Loaded {} historical rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse CSV content; `path` is only used to label errors.
pub fn parse_features(reader: impl Read, path: &Path) -> Result<Vec<FeatureRow>, DataError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let csv_error = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let headers = csv.headers().map_err(csv_error)?.clone();
    let find = |name: &'static str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let require = |name: &'static str| {
        find(name).ok_or(DataError::MissingColumn {
            path: path.to_path_buf(),
            column: name,
        })
    };
    let date_idx = require("Date")?;
    let sales_idx = require("Sales")?;
    let spend_idx = require("MarketingSpend")?;
    let holiday_idx = find("IsHoliday");

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let parse_error = |message: String| DataError::Parse {
            path: path.to_path_buf(),
            line,
            message,
        };
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = Date::parse(field(date_idx), DATE_FORMAT)
            .map_err(|err| parse_error(format!("invalid Date '{}': {err}", field(date_idx))))?;
        let sales = match field(sales_idx) {
            "" => None,
            raw => Some(parse_number(raw).ok_or_else(|| parse_error(format!("invalid Sales '{raw}'")))?),
        };
        let spend_raw = field(spend_idx);
        let marketing_spend = parse_number(spend_raw)
            .ok_or_else(|| parse_error(format!("invalid MarketingSpend '{spend_raw}'")))?;
        let is_holiday = match holiday_idx {
            Some(idx) => parse_flag(field(idx)).ok_or_else(|| {
                parse_error(format!("invalid IsHoliday '{}'", field(idx)))
            })?,
            None => is_holiday_month(date.month() as u8),
        };
        rows.push(FeatureRow::new(date, marketing_spend, is_holiday, sales));
    }
    rows.sort_by_key(|row| row.date());
    Ok(rows)
}

/// Finite decimal with optional thousands separators; `inf`, `NaN` and
/// overflowing literals such as `1e400` are rejected.
fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn parse(text: &str) -> Result<Vec<FeatureRow>, DataError> {
        parse_features(text.as_bytes(), &PathBuf::from("sales.csv"))
    }

    #[test]
    fn parses_and_sorts_rows() {
        let rows = parse(
            "Date,Sales,MarketingSpend,IsHoliday\n\
             2023-02-01,120.5,1000,0\n\
             2023-01-01,100,900,1\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value(Column::Month), Some(1.0));
        assert!(rows[0].is_holiday());
        assert_eq!(rows[1].sales(), Some(120.5));
    }

    #[test]
    fn derives_holiday_flag_when_column_missing() {
        let rows = parse("Date,Sales,MarketingSpend\n2023-05-01,1,2\n2023-06-01,1,2\n").unwrap();
        assert!(rows[0].is_holiday());
        assert!(!rows[1].is_holiday());
    }

    #[test]
    fn empty_sales_cell_is_missing_not_zero() {
        let rows = parse("Date,Sales,MarketingSpend\n2023-05-01,,2\n").unwrap();
        assert_eq!(rows[0].sales(), None);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let err = parse("Date,Sales\n2023-05-01,1\n").unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn {
                column: "MarketingSpend",
                ..
            }
        ));
    }

    #[test]
    fn malformed_row_fails_whole_load() {
        let err = parse("Date,Sales,MarketingSpend\n2023-05-01,1,2\nnot-a-date,1,2\n").unwrap_err();
        match err {
            DataError::Parse { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("not-a-date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_numbers_are_parse_errors() {
        for (row, column) in [
            ("2024-02-01,1e400,5", "Sales"),
            ("2024-02-01,inf,5", "Sales"),
            ("2024-02-01,NaN,5", "Sales"),
            ("2024-02-01,10,-inf", "MarketingSpend"),
            ("2024-02-01,10,nan", "MarketingSpend"),
        ] {
            let text = format!("Date,Sales,MarketingSpend\n2024-01-01,1,2\n{row}\n");
            match parse(&text).unwrap_err() {
                DataError::Parse { line, message, .. } => {
                    assert_eq!(line, 3, "{row}");
                    assert!(message.contains(column), "{row}: {message}");
                }
                other => panic!("unexpected error for {row}: {other}"),
            }
        }
    }

    #[test]
    fn thousands_separators_are_accepted() {
        let rows = parse("Date,Sales,MarketingSpend\n2024-01-01,\"1,250.5\",900\n").unwrap();
        assert_eq!(rows[0].sales(), Some(1250.5));
    }

    #[test]
    fn absent_file_is_data_not_found() {
        let dir = tempdir().unwrap();
        let err = load_features(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }
}
