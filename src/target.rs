//! Click target and target-time resolution
//!
//! The user picks a clock time of day. It resolves to today's instant, or to
//! tomorrow's when today's has already passed by more than the configured
//! tolerance.

use chrono::{DateTime, LocalResult, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;
use std::time::Duration;

use crate::ClickerError;

/// Screen position to click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClickTarget {
    pub x: i32,
    pub y: i32,
}

impl ClickTarget {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ClickTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Parse `HH:MM`, `HH:MM:SS` or `HH:MM:SS.mmm`
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, ClickerError> {
    let input = input.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(input, format).ok())
        .ok_or_else(|| {
            ClickerError::InvalidTime(format!("'{}' is not HH:MM[:SS[.mmm]]", input))
        })
}

fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Result<DateTime<Tz>, ClickerError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(ClickerError::InvalidTime(format!(
            "{} does not exist in the local time zone",
            naive
        ))),
    }
}

/// Resolve a time of day to the next matching instant
///
/// Today's occurrence is used unless it is at or before
/// `now - late_tolerance`, in which case the date moves forward exactly one
/// calendar day.
pub fn resolve_target_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    time_of_day: NaiveTime,
    late_tolerance: Duration,
) -> Result<DateTime<Tz>, ClickerError> {
    let tz = now.timezone();
    let today = now.date_naive();
    let candidate = localize(&tz, today.and_time(time_of_day))?;

    let tolerance = chrono::Duration::from_std(late_tolerance)
        .map_err(|e| ClickerError::InvalidTime(format!("late tolerance out of range: {}", e)))?;

    if candidate > now.clone() - tolerance {
        return Ok(candidate);
    }

    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| ClickerError::InvalidTime("date overflow".to_string()))?;
    localize(&tz, tomorrow.and_time(time_of_day))
}

/// Render a countdown as `HH:MM:SS.mmm`
pub fn format_countdown(remaining: Duration) -> String {
    let total_ms = remaining.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn utc(h: u32, m: u32, s: u32, ms: u32) -> DateTime<Utc> {
        let naive = NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap();
        Utc.from_utc_datetime(&naive)
    }

    fn time(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("14:30:05.250").unwrap(), time(14, 30, 5, 250));
        assert_eq!(parse_time_of_day("14:30:05").unwrap(), time(14, 30, 5, 0));
        assert_eq!(parse_time_of_day(" 07:05 ").unwrap(), time(7, 5, 0, 0));
    }

    #[test]
    fn test_parse_time_of_day_rejects_garbage() {
        assert!(matches!(
            parse_time_of_day("25:00:00"),
            Err(ClickerError::InvalidTime(_))
        ));
        assert!(parse_time_of_day("noon").is_err());
    }

    #[test]
    fn test_future_time_stays_today() {
        let now = utc(12, 0, 0, 0);
        let resolved = resolve_target_time(&now, time(12, 0, 0, 200), Duration::ZERO).unwrap();
        assert_eq!(resolved, utc(12, 0, 0, 200));
    }

    #[test]
    fn test_past_time_rolls_to_tomorrow() {
        let now = utc(12, 0, 0, 0);
        let resolved = resolve_target_time(&now, time(11, 59, 59, 0), Duration::ZERO).unwrap();
        assert_eq!(resolved - now, chrono::Duration::days(1) - chrono::Duration::seconds(1));
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_exactly_now_rolls_to_tomorrow() {
        let now = utc(12, 0, 0, 0);
        let resolved = resolve_target_time(&now, time(12, 0, 0, 0), Duration::ZERO).unwrap();
        assert_eq!(resolved - now, chrono::Duration::days(1));
    }

    #[test]
    fn test_tolerance_keeps_slightly_late_time_today() {
        let now = utc(12, 0, 1, 0);
        let tolerance = Duration::from_secs(2);

        let resolved = resolve_target_time(&now, time(12, 0, 0, 0), tolerance).unwrap();
        assert_eq!(resolved, utc(12, 0, 0, 0));

        let resolved = resolve_target_time(&now, time(11, 59, 58, 0), tolerance).unwrap();
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_one_second_ago_is_a_day_away() {
        let now = Utc::now();
        let one_second_ago = (now - chrono::Duration::seconds(1)).time();
        let resolved = resolve_target_time(&now, one_second_ago, Duration::ZERO).unwrap();
        let ahead = (resolved - now).to_std().unwrap();
        assert!(ahead > Duration::from_secs(24 * 3600 - 2));
        assert!(ahead < Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::ZERO), "00:00:00.000");
        assert_eq!(format_countdown(Duration::from_millis(1_250)), "00:00:01.250");
        assert_eq!(
            format_countdown(Duration::from_millis(3_600_000 + 61_007)),
            "01:01:01.007"
        );
        assert_eq!(format_countdown(Duration::from_secs(30 * 3600)), "30:00:00.000");
    }

    #[test]
    fn test_click_target_display() {
        assert_eq!(ClickTarget::new(640, -12).to_string(), "(640,-12)");
    }
}
