use std::path::Path;

/// Write `months` of monthly history starting January 2021.
///
/// Sales follow spend plus a December bump so the booster has signal to fit.
pub fn write_history_csv(path: &Path, months: usize) {
    let mut text = String::from("Date,Sales,MarketingSpend,IsHoliday\n");
    for i in 0..months {
        let year = 2021 + i / 12;
        let month = i % 12 + 1;
        let spend = 1_000.0 + 50.0 * (i % 7) as f64;
        let holiday = month == 11 || month == 12;
        let sales = 20_000.0 + 8.0 * spend + if holiday { 5_000.0 } else { 0.0 } + 120.0 * i as f64;
        text.push_str(&format!(
            "{year}-{month:02}-01,{sales:.2},{spend:.2},{}\n",
            u8::from(holiday)
        ));
    }
    std::fs::write(path, text).expect("write history csv");
}
