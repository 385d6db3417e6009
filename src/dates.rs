//! Date helpers for the calendar and report exercises.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use thiserror::Error;
use tracing::debug;

/// All event times in the course run on JST.
const UTC_OFFSET_SECONDS: i32 = 9 * 3600;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("invalid date (expected YYYY-MM-DD): {0:?}")]
    BadDate(String),

    #[error("invalid moment (expected HH:MM): {0:?}")]
    BadMoment(String),
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` moment into an RFC 3339
/// timestamp with the fixed course offset.
pub fn convert_isoformat(date: &str, moment: &str) -> Result<String, DateError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::BadDate(date.to_string()))?;
    let time = NaiveTime::parse_from_str(moment.trim(), "%H:%M")
        .map_err(|_| DateError::BadMoment(moment.to_string()))?;

    let offset = FixedOffset::east_opt(UTC_OFFSET_SECONDS).expect("valid fixed offset");
    let stamp = offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .expect("fixed offsets are unambiguous")
        .to_rfc3339();
    debug!("iso timestamp built: {stamp}");
    Ok(stamp)
}

/// Period string for the report header: the `days_delta` days leading up to
/// and including `base`, e.g. `2026-02-23(Mon)..2026-02-27(Fri)`.
pub fn training_period(base: NaiveDate, days_delta: i64) -> String {
    let start = base - Duration::days(days_delta.saturating_sub(1));
    format!(
        "{}..{}",
        start.format("%Y-%m-%d(%a)"),
        base.format("%Y-%m-%d(%a)")
    )
}

/// Consecutive day labels starting at `base`, one per schedule row.
pub fn date_list(base: NaiveDate, total_days: usize) -> Vec<String> {
    (0..total_days as i64)
        .map(|offset| (base + Duration::days(offset)).format("%Y-%m-%d").to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_isoformat() {
        let stamp = convert_isoformat("2026-01-27", "14:30").unwrap();
        assert_eq!(stamp, "2026-01-27T14:30:00+09:00");
    }

    #[test]
    fn test_convert_isoformat_trims_input() {
        let stamp = convert_isoformat(" 2026-01-27 ", " 00:00 ").unwrap();
        assert_eq!(stamp, "2026-01-27T00:00:00+09:00");
    }

    #[test]
    fn test_convert_rejects_bad_date() {
        assert!(matches!(
            convert_isoformat("2026/01/27", "14:30"),
            Err(DateError::BadDate(_))
        ));
        assert!(matches!(
            convert_isoformat("2026-13-01", "14:30"),
            Err(DateError::BadDate(_))
        ));
    }

    #[test]
    fn test_convert_rejects_bad_moment() {
        assert!(matches!(
            convert_isoformat("2026-01-27", "25:00"),
            Err(DateError::BadMoment(_))
        ));
    }

    #[test]
    fn test_training_period_five_days() {
        let base = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        assert_eq!(
            training_period(base, 5),
            "2026-02-23(Mon)..2026-02-27(Fri)"
        );
    }

    #[test]
    fn test_training_period_single_day() {
        let base = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        assert_eq!(
            training_period(base, 1),
            "2026-02-27(Fri)..2026-02-27(Fri)"
        );
    }

    #[test]
    fn test_date_list() {
        let base = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        assert_eq!(
            date_list(base, 3),
            vec!["2025-12-30", "2025-12-31", "2026-01-01"]
        );
    }
}
