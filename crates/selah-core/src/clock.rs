//! Week and day arithmetic in US Pacific civil time.
//!
//! Daily and weekly content boundaries follow one fixed region regardless of
//! where a request comes from, so everything here works on the Pacific civil
//! date. Only reading "now" touches a timezone conversion; all week math is
//! plain `NaiveDate` arithmetic with day 0 = Sunday .. 6 = Saturday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc, Weekday};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current Pacific civil date.
///
/// Injected everywhere a handler needs "today" so tests can pin the calendar
/// instead of depending on the host clock.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Production clock: wall time converted to the Pacific civil date.
pub struct PacificClock;

impl Clock for PacificClock {
    fn today(&self) -> NaiveDate {
        pacific_civil_date(Utc::now())
    }
}

/// Test clock pinned to a fixed date.
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Convert a UTC instant to the Pacific civil date.
///
/// Applies PST (UTC-8) or PDT (UTC-7) according to the US rule: DST runs from
/// 02:00 local on the second Sunday of March to 02:00 local on the first
/// Sunday of November. The check is made against standard time, so dates
/// within an hour of the 02:00 transition can land on the neighbouring hour;
/// for day-boundary purposes that slack is harmless.
pub fn pacific_civil_date(utc: DateTime<Utc>) -> NaiveDate {
    let standard = utc.naive_utc() - Duration::hours(8);
    if in_us_dst(standard) {
        (utc.naive_utc() - Duration::hours(7)).date()
    } else {
        standard.date()
    }
}

fn in_us_dst(local: NaiveDateTime) -> bool {
    let year = local.year();
    let start = nth_weekday(year, 3, Weekday::Sun, 2).and_hms_opt(2, 0, 0);
    let end = nth_weekday(year, 11, Weekday::Sun, 1).and_hms_opt(2, 0, 0);
    match (start, end) {
        (Some(start), Some(end)) => local >= start && local < end,
        _ => false,
    }
}

/// The nth occurrence of `weekday` in the given month. Every (March, 2nd
/// Sunday) and (November, 1st Sunday) exists, so callers see a real date.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, nth: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).expect("January 1 exists"));
    let offset = (7 + weekday.num_days_from_sunday() - first.weekday().num_days_from_sunday()) % 7;
    first + Duration::days(offset as i64 + 7 * (nth as i64 - 1))
}

// ---------------------------------------------------------------------------
// Week arithmetic
// ---------------------------------------------------------------------------

/// Day of week as 0 = Sunday .. 6 = Saturday.
pub fn current_day_of_week(clock: &dyn Clock) -> u8 {
    clock.today().weekday().num_days_from_sunday() as u8
}

/// The most recent Sunday (today, if today is Sunday).
pub fn current_week_start(clock: &dyn Clock) -> NaiveDate {
    let today = clock.today();
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}

/// Strictly the next Sunday — never today, even on a Sunday.
pub fn next_week_start(clock: &dyn Clock) -> NaiveDate {
    let today = clock.today();
    let dow = today.weekday().num_days_from_sunday() as i64;
    let ahead = if dow == 0 { 7 } else { 7 - dow };
    today + Duration::days(ahead)
}

/// The Sunday–Saturday span immediately preceding the current week.
///
/// On a Sunday the span ends eight days back: the week that ended yesterday
/// counts as still settling and is skipped.
pub fn last_completed_week(clock: &dyn Clock) -> (NaiveDate, NaiveDate) {
    let today = clock.today();
    let dow = today.weekday().num_days_from_sunday() as i64;
    let back_to_end = if dow == 0 { 8 } else { dow + 1 };
    let end = today - Duration::days(back_to_end);
    (end - Duration::days(6), end)
}

/// Saturday closing the week that starts on `week_start`.
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(6)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_on_a_wednesday() {
        // 2025-06-11 is a Wednesday
        let clock = FixedClock(date(2025, 6, 11));
        assert_eq!(current_day_of_week(&clock), 3);
        assert_eq!(current_week_start(&clock), date(2025, 6, 8));
    }

    #[test]
    fn week_start_on_a_sunday_is_today() {
        let clock = FixedClock(date(2025, 6, 8));
        assert_eq!(current_day_of_week(&clock), 0);
        assert_eq!(current_week_start(&clock), date(2025, 6, 8));
    }

    #[test]
    fn next_week_start_is_never_today() {
        let sunday = FixedClock(date(2025, 6, 8));
        assert_eq!(next_week_start(&sunday), date(2025, 6, 15));

        let saturday = FixedClock(date(2025, 6, 14));
        assert_eq!(next_week_start(&saturday), date(2025, 6, 15));
    }

    #[test]
    fn last_completed_week_from_wednesday() {
        // Wednesday 2025-06-11 → the span ending the previous Saturday
        let clock = FixedClock(date(2025, 6, 11));
        let (start, end) = last_completed_week(&clock);
        assert_eq!(start, date(2025, 6, 1));
        assert_eq!(end, date(2025, 6, 7));
        assert_eq!(start.weekday(), Weekday::Sun);
        assert_eq!(end.weekday(), Weekday::Sat);
    }

    #[test]
    fn last_completed_week_from_sunday_skips_a_week() {
        // Sunday 2025-06-08 → the week that ended 2025-06-07 is skipped
        let clock = FixedClock(date(2025, 6, 8));
        let (start, end) = last_completed_week(&clock);
        assert_eq!(end, date(2025, 5, 31));
        assert_eq!(start, date(2025, 5, 25));
    }

    #[test]
    fn week_end_is_six_days_after_start() {
        assert_eq!(week_end(date(2025, 6, 1)), date(2025, 6, 7));
    }

    #[test]
    fn pacific_date_in_winter_is_utc_minus_eight() {
        // 2025-01-15 07:30 UTC is still 2025-01-14 23:30 PST
        let utc = Utc.with_ymd_and_hms(2025, 1, 15, 7, 30, 0).unwrap();
        assert_eq!(pacific_civil_date(utc), date(2025, 1, 14));
    }

    #[test]
    fn pacific_date_in_summer_is_utc_minus_seven() {
        // 2025-07-15 07:30 UTC is 2025-07-15 00:30 PDT
        let utc = Utc.with_ymd_and_hms(2025, 7, 15, 7, 30, 0).unwrap();
        assert_eq!(pacific_civil_date(utc), date(2025, 7, 15));
    }

    #[test]
    fn dst_window_bounds() {
        // Second Sunday of March 2025 is the 9th; first Sunday of Nov is the 2nd
        assert_eq!(nth_weekday(2025, 3, Weekday::Sun, 2), date(2025, 3, 9));
        assert_eq!(nth_weekday(2025, 11, Weekday::Sun, 1), date(2025, 11, 2));
    }
}
