use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Interpret a cell as a timestamp, date or time of day and return the Excel
/// number format with the serial value.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<(&'static str, f64)> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, crate::utils::time::DATETIME_FMT) {
        return Some(("yyyy-mm-dd hh:mm", excel_serial(&dt)?));
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(("yyyy-mm-dd", excel_serial(&d.and_hms_opt(0, 0, 0)?)?));
    }

    if let Ok(t) = NaiveTime::parse_from_str(s, "%H:%M") {
        let seconds = t.num_seconds_from_midnight() as f64;
        return Some(("hh:mm", seconds / 86400.0));
    }

    None
}

fn excel_serial(dt: &NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let duration = *dt - epoch;

    let days = duration.num_days() as f64;
    let secs = (duration.num_seconds() - duration.num_days() * 86400) as f64;
    Some(days + secs / 86400.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_and_timestamps_become_serials() {
        assert_eq!(parse_to_excel_date("1900-01-01"), Some(("yyyy-mm-dd", 2.0)));
        let (fmt, serial) = parse_to_excel_date("1900-01-01 12:00").unwrap();
        assert_eq!(fmt, "yyyy-mm-dd hh:mm");
        assert!((serial - 2.5).abs() < 1e-9);
        assert_eq!(parse_to_excel_date("ACME"), None);
    }
}
