//! Tariff calculation at session close

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use parqueo_types::{Error, Result};

/// Cost breakdown for one closed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub elapsed_minutes: i64,
    pub billed_hours: i64,
    /// Rate in force at close time.
    pub hourly_rate: f64,
    pub cost: f64,
}

fn minutes_of_day(t: NaiveTime) -> i64 {
    i64::from(t.hour()) * 60 + i64::from(t.minute())
}

/// Elapsed wall-clock minutes between entry and exit on the same day.
/// Negative when the exit time is earlier in the day than the entry time.
pub fn elapsed_minutes(entry: NaiveTime, exit: NaiveTime) -> i64 {
    minutes_of_day(exit) - minutes_of_day(entry)
}

/// Partial hours always round up.
pub fn billed_hours(elapsed_minutes: i64) -> i64 {
    (elapsed_minutes + 59) / 60
}

/// Compute the billed cost for a session closing at `exit`.
///
/// Rejects non-positive durations, which covers both zero-length stays and
/// spans that would cross midnight: those are rejected, not wrapped.
pub fn quote(entry: NaiveTime, exit: NaiveTime, hourly_rate: f64) -> Result<Quote> {
    let elapsed = elapsed_minutes(entry, exit);
    if elapsed <= 0 {
        return Err(Error::Validation(
            "exit time must be later than entry time on the same day".to_string(),
        ));
    }
    let hours = billed_hours(elapsed);
    Ok(Quote {
        elapsed_minutes: elapsed,
        billed_hours: hours,
        hourly_rate,
        cost: hours as f64 * hourly_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_partial_hour_rounds_up() {
        // 08:00 → 09:05 is 65 minutes, billed as 2 hours.
        let q = quote(t(8, 0), t(9, 5), 3000.0).unwrap();
        assert_eq!(q.elapsed_minutes, 65);
        assert_eq!(q.billed_hours, 2);
        assert_eq!(q.cost, 6000.0);
    }

    #[test]
    fn test_exact_hour_not_rounded() {
        let q = quote(t(10, 0), t(12, 0), 3000.0).unwrap();
        assert_eq!(q.billed_hours, 2);
        assert_eq!(q.cost, 6000.0);
    }

    #[test]
    fn test_one_minute_bills_one_hour() {
        let q = quote(t(8, 0), t(8, 1), 3000.0).unwrap();
        assert_eq!(q.billed_hours, 1);
        assert_eq!(q.cost, 3000.0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(quote(t(8, 0), t(8, 0), 3000.0).is_err());
    }

    #[test]
    fn test_cross_midnight_rejected_not_wrapped() {
        // Entered 23:30, "exited" 00:15 the next day: negative in
        // minutes-of-day, so rejected.
        assert!(quote(t(23, 30), t(0, 15), 3000.0).is_err());
    }

    #[test]
    fn test_seconds_are_ignored() {
        let entry = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        let exit = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(elapsed_minutes(entry, exit), 60);
    }
}
