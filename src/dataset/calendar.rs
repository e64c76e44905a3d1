use time::{Date, Month};

/// Months flagged as holiday periods when the source has no `IsHoliday` column.
pub const HOLIDAY_MONTHS: [u8; 4] = [1, 5, 7, 12];

/// Calendar fields derived from a single date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u8,
    pub quarter: u8,
    pub day_of_year: u16,
    /// ISO-8601 week number (1..=53).
    pub week_of_year: u8,
}

impl CalendarFields {
    pub fn from_date(date: Date) -> Self {
        let month = date.month() as u8;
        Self {
            year: date.year(),
            month,
            quarter: (month - 1) / 3 + 1,
            day_of_year: date.ordinal(),
            week_of_year: date.iso_week(),
        }
    }
}

/// Whether a month number falls in the fixed holiday set.
pub fn is_holiday_month(month: u8) -> bool {
    HOLIDAY_MONTHS.contains(&month)
}

/// Shift `date` by `months`, clamping the day to the target month's length.
///
/// `2024-01-31 + 1` lands on `2024-02-29`. Returns `None` outside the
/// representable year range.
pub fn add_months(date: Date, months: i32) -> Option<Date> {
    let index = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).ok()?;
    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn derives_fields_with_iso_week() {
        // 2021-01-01 belongs to ISO week 53 of 2020.
        let fields = CalendarFields::from_date(date!(2021 - 01 - 01));
        assert_eq!(fields.year, 2021);
        assert_eq!(fields.month, 1);
        assert_eq!(fields.quarter, 1);
        assert_eq!(fields.day_of_year, 1);
        assert_eq!(fields.week_of_year, 53);

        let fields = CalendarFields::from_date(date!(2023 - 12 - 31));
        assert_eq!(fields.quarter, 4);
        assert_eq!(fields.day_of_year, 365);
        assert_eq!(fields.week_of_year, 52);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date!(2024 - 01 - 31), 1), Some(date!(2024 - 02 - 29)));
        assert_eq!(add_months(date!(2023 - 01 - 31), 1), Some(date!(2023 - 02 - 28)));
        assert_eq!(add_months(date!(2023 - 11 - 15), 2), Some(date!(2024 - 01 - 15)));
        assert_eq!(add_months(date!(2023 - 03 - 01), -3), Some(date!(2022 - 12 - 01)));
    }

    #[test]
    fn holiday_months_are_fixed() {
        let flagged: Vec<u8> = (1..=12).filter(|m| is_holiday_month(*m)).collect();
        assert_eq!(flagged, vec![1, 5, 7, 12]);
    }
}
