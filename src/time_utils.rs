// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and user-local day arithmetic.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Timelike, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The calendar date in the user's local time.
///
/// Streak progression and the daily earning cap are both keyed to this,
/// not to the UTC date.
pub fn local_day(now: DateTime<Utc>, tz_offset_minutes: i32) -> NaiveDate {
    (now + Duration::minutes(i64::from(tz_offset_minutes))).date_naive()
}

/// The hour (0-23) in the user's local time, used for day-segment lookup.
pub fn local_hour(now: DateTime<Utc>, tz_offset_minutes: i32) -> u32 {
    (now + Duration::minutes(i64::from(tz_offset_minutes))).hour()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_day_crosses_midnight_with_offset() {
        // 23:30 UTC on Jan 1 is already Jan 2 at UTC+9
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        assert_eq!(
            local_day(now, 9 * 60),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(
            local_day(now, 0),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn negative_offset_shifts_backwards() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 30, 0).unwrap();
        assert_eq!(
            local_day(now, -120),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(local_hour(now, -120), 22);
    }
}
