use chrono::{Duration, NaiveDateTime};

use crate::{
    core::clock::Clock,
    domain::{expense::truncate_to_minute, Period, TimeWindow},
};

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// Resolves period tokens to concrete windows ending at "now".
pub struct PeriodResolver;

impl PeriodResolver {
    /// Window for `period` ending at `now`. The start is truncated to the minute
    /// so it compares the same way as stored timestamps.
    pub fn resolve(period: Period, now: NaiveDateTime) -> TimeWindow {
        let start = match period {
            Period::Today => now.date().and_hms_opt(0, 0, 0).unwrap_or(now),
            Period::Week => now - Duration::days(WEEK_DAYS),
            Period::Month => now - Duration::days(MONTH_DAYS),
            // Unix epoch; precedes every timestamp the bot could have written.
            Period::All => NaiveDateTime::default(),
        };
        TimeWindow {
            start: truncate_to_minute(start).min(now),
            end: now,
        }
    }

    /// Reads the clock at call time; windows are never cached.
    pub fn resolve_now(period: Period, clock: &dyn Clock) -> TimeWindow {
        Self::resolve(period, clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(18, 42, 17)
            .unwrap()
    }

    #[test]
    fn today_starts_at_midnight() {
        let window = PeriodResolver::resolve(Period::Today, now());
        assert_eq!(
            window.start,
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(window.end, now());
    }

    #[test]
    fn week_and_month_are_rolling_windows() {
        let week = PeriodResolver::resolve(Period::Week, now());
        assert_eq!(
            week.start,
            NaiveDate::from_ymd_opt(2024, 3, 8)
                .unwrap()
                .and_hms_opt(18, 42, 0)
                .unwrap()
        );
        let month = PeriodResolver::resolve(Period::Month, now());
        assert_eq!(month.start.date(), NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
    }

    #[test]
    fn windows_are_nested() {
        let windows: Vec<TimeWindow> = Period::ALL
            .iter()
            .map(|period| PeriodResolver::resolve(*period, now()))
            .collect();
        for pair in windows.windows(2) {
            assert!(pair[1].encloses(&pair[0]), "{:?} should enclose {:?}", pair[1], pair[0]);
        }
    }
}
