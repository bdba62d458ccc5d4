//! Time helpers - business timezone conversion for printed documents

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse `YYYY-MM` (or a full `YYYY-MM-DD`) into the first day of that month
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
        .and_then(|d| d.with_day(1))
}

/// Whether `ts` falls in the calendar month of `month` (business timezone)
pub fn in_month(ts: DateTime<Utc>, month: NaiveDate, tz: Tz) -> bool {
    let local = ts.with_timezone(&tz).date_naive();
    local.year() == month.year() && local.month() == month.month()
}

/// `DD/MM/YYYY` in the business timezone
pub fn format_date(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%d/%m/%Y").to_string()
}

/// `HH:MM` in the business timezone
pub fn format_time(ts: DateTime<Utc>, tz: Tz) -> String {
    ts.with_timezone(&tz).format("%H:%M").to_string()
}

/// Month heading such as `October 2026`
pub fn format_month(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_month() {
        let oct = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        assert_eq!(parse_month("2026-10"), Some(oct));
        assert_eq!(parse_month("2026-10-16"), Some(oct));
        assert_eq!(parse_month("October"), None);
    }

    #[test]
    fn test_in_month_uses_business_timezone() {
        let oct = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        // 20:00 UTC on Sep 30 is 01:30 on Oct 1 in Kolkata
        let ts = Utc.with_ymd_and_hms(2026, 9, 30, 20, 0, 0).unwrap();
        assert!(in_month(ts, oct, chrono_tz::Asia::Kolkata));
        assert!(!in_month(ts, oct, chrono_tz::UTC));
    }

    #[test]
    fn test_format() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 16, 7, 5, 0).unwrap();
        assert_eq!(format_date(ts, chrono_tz::Asia::Kolkata), "16/10/2026");
        assert_eq!(format_time(ts, chrono_tz::Asia::Kolkata), "12:35");
        assert_eq!(
            format_month(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            "October 2026"
        );
    }
}
