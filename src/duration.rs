//! ISO-8601 duration parsing.
//!
//! Accepts `P[nY][nM][nW][nD][T[nH][nM][nS]]`. Years and months are calendar
//! units and are resolved against an anchor instant, so `P1M` starting on
//! January 31st is shorter than `P1M` starting on March 1st. A fraction of a
//! year or month is taken of the calendar year or month that follows the whole
//! part. Everything from weeks down has a fixed length.

use chrono::{DateTime, Months, TimeDelta, Utc};
use std::str::FromStr;
use thiserror::Error;

const MONTHS_PER_YEAR: u32 = 12;

const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60.0 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: f64 = 60.0 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: f64 = 24.0 * MILLIS_PER_HOUR;
const MILLIS_PER_WEEK: f64 = 7.0 * MILLIS_PER_DAY;

/// Designators allowed before the `T`, in the order they must appear.
const DATE_DESIGNATORS: [char; 4] = ['Y', 'M', 'W', 'D'];
/// Designators allowed after the `T`, in the order they must appear.
const TIME_DESIGNATORS: [char; 3] = ['H', 'M', 'S'];

/// The supplied string is not a usable ISO-8601 duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid duration provided: {input}")]
pub struct DurationError {
    /// The offending input, verbatim.
    pub input: String,
}

impl DurationError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// A parsed ISO-8601 duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoDuration {
    years: f64,
    months: f64,
    /// Fixed-length remainder (weeks, days, hours, minutes, seconds).
    fixed: TimeDelta,
}

impl IsoDuration {
    /// Returns the length of this duration when laid out starting at `anchor`.
    ///
    /// Month arithmetic clamps to the end of the month: January 31st plus `P1M`
    /// is February 28th (or 29th), not early March.
    ///
    /// Returns `None` when the end of the span falls outside the range chrono
    /// can represent.
    pub fn span_from(&self, anchor: DateTime<Utc>) -> Option<TimeDelta> {
        let end = add_calendar(anchor, self.years, MONTHS_PER_YEAR)?;
        let end = add_calendar(end, self.months, 1)?.checked_add_signed(self.fixed)?;
        Some(end - anchor)
    }
}

impl FromStr for IsoDuration {
    type Err = DurationError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationError::new(input);

        let body = input.strip_prefix('P').ok_or_else(invalid)?;
        let (date, time) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut date_values = [0.0; DATE_DESIGNATORS.len()];
        let mut time_values = [0.0; TIME_DESIGNATORS.len()];

        let mut components = parse_section(date, &DATE_DESIGNATORS, &mut date_values)
            .ok_or_else(invalid)?;
        if let Some(time) = time {
            let time_components = parse_section(time, &TIME_DESIGNATORS, &mut time_values)
                .ok_or_else(invalid)?;
            if time_components == 0 {
                return Err(invalid());
            }
            components += time_components;
        }
        if components == 0 {
            return Err(invalid());
        }

        let [years, months, weeks, days] = date_values;
        let [hours, minutes, seconds] = time_values;

        if !calendar_in_range(years, months) {
            return Err(invalid());
        }

        let fixed_millis = weeks * MILLIS_PER_WEEK
            + days * MILLIS_PER_DAY
            + hours * MILLIS_PER_HOUR
            + minutes * MILLIS_PER_MINUTE
            + seconds * MILLIS_PER_SECOND;
        // i64::MAX as f64 rounds up, so the comparison has to be strict.
        if !fixed_millis.is_finite() || fixed_millis >= i64::MAX as f64 {
            return Err(invalid());
        }
        let fixed = TimeDelta::try_milliseconds(fixed_millis.round() as i64).ok_or_else(invalid)?;

        Ok(Self {
            years,
            months,
            fixed,
        })
    }
}

/// Parses `<number><designator>` pairs, writing each value into the slot of
/// its designator. Designators must appear at most once and in order.
///
/// Returns the number of components found, or `None` on malformed input.
fn parse_section(section: &str, designators: &[char], values: &mut [f64]) -> Option<usize> {
    let mut next_slot = 0;
    let mut number_start = 0;
    let mut count = 0;

    for (idx, ch) in section.char_indices() {
        if ch.is_ascii_digit() || ch == '.' || ch == ',' {
            continue;
        }

        let slot = designators
            .iter()
            .skip(next_slot)
            .position(|designator| *designator == ch)?
            + next_slot;
        values[slot] = parse_number(&section[number_start..idx])?;

        next_slot = slot + 1;
        number_start = idx + ch.len_utf8();
        count += 1;
    }

    // A trailing number without a designator.
    if number_start != section.len() {
        return None;
    }

    Some(count)
}

fn parse_number(raw: &str) -> Option<f64> {
    let (whole, fraction) = match raw.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    match fraction {
        Some(fraction) => format!("{whole}.{fraction}").parse().ok(),
        None => whole.parse().ok(),
    }
}

/// Whether the calendar part, rounded up to whole months, fits chrono's `Months`.
fn calendar_in_range(years: f64, months: f64) -> bool {
    years.ceil() * f64::from(MONTHS_PER_YEAR) + months.ceil() <= f64::from(u32::MAX)
}

/// Adds `amount` units of `unit_months` calendar months to `from`.
///
/// The whole part is added with calendar arithmetic. The fractional part is
/// that share of the unit starting where the whole part ended, so half a year
/// after a leap day spans a different number of days than half a year after
/// a regular one.
fn add_calendar(from: DateTime<Utc>, amount: f64, unit_months: u32) -> Option<DateTime<Utc>> {
    let whole = u32::try_from(amount.trunc() as u64).ok()?.checked_mul(unit_months)?;
    let start = from.checked_add_months(Months::new(whole))?;

    let fraction = amount.fract();
    if fraction == 0.0 {
        return Some(start);
    }

    let unit = start.checked_add_months(Months::new(unit_months))? - start;
    let share = (unit.num_milliseconds() as f64 * fraction).round() as i64;
    start.checked_add_signed(TimeDelta::try_milliseconds(share)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn seconds(input: &str) -> i64 {
        input
            .parse::<IsoDuration>()
            .unwrap()
            .span_from(anchor())
            .unwrap()
            .num_seconds()
    }

    #[test]
    fn test_fixed_units() {
        assert_eq!(seconds("P1D"), 86_400);
        assert_eq!(seconds("PT12H"), 43_200);
        assert_eq!(seconds("P1W"), 604_800);
        assert_eq!(seconds("PT90M"), 5_400);
        assert_eq!(seconds("PT45S"), 45);
        assert_eq!(seconds("P7D"), 7 * 86_400);
        assert_eq!(seconds("P1DT2H3M4S"), 86_400 + 7_200 + 180 + 4);
        assert_eq!(seconds("PT0S"), 0);
    }

    #[test]
    fn test_fractional_units() {
        let span = "PT1.5S".parse::<IsoDuration>().unwrap().span_from(anchor());
        assert_eq!(span.unwrap().num_milliseconds(), 1_500);

        assert_eq!(seconds("P0,5D"), 43_200);
        assert_eq!(seconds("PT0.25H"), 900);
    }

    #[test]
    fn test_calendar_units_follow_the_anchor() {
        // January has 31 days.
        assert_eq!(seconds("P1M"), 31 * 86_400);
        // 2024 is a leap year: 2024-01-15 to 2025-01-15.
        assert_eq!(seconds("P1Y"), 366 * 86_400);

        let march = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let span = "P1Y".parse::<IsoDuration>().unwrap().span_from(march);
        assert_eq!(span.unwrap().num_days(), 365);
    }

    #[test]
    fn test_fractional_calendar_units() {
        // 2024-01-15 + P1Y = 2025-01-15 (366 days), then half of the 365-day year after it.
        assert_eq!(seconds("P1.5Y"), 366 * 86_400 + 365 * 43_200);
        // Half of the 31 days from 2024-01-15 to 2024-02-15.
        assert_eq!(seconds("P0.5M"), 31 * 43_200);
        // 2025-01-15 + half of the 31 days to 2025-02-15.
        assert_eq!(seconds("P1Y0.5M"), 366 * 86_400 + 31 * 43_200);
        assert_eq!(seconds("P0,5Y"), 366 * 43_200);
    }

    #[test]
    fn test_month_end_clamps() {
        let end_of_january = Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap();
        let span = "P1M".parse::<IsoDuration>().unwrap().span_from(end_of_january);
        // Clamped to 2023-02-28.
        assert_eq!(span.unwrap().num_days(), 28);
    }

    #[test]
    fn test_invalid_inputs() {
        for input in [
            "", "bogus", "P", "PT", "1D", "P1", "PD", "P1X", "P1D2", "PT1D", "P1H", "P1D1D",
            "P1M1Y", "P1.D", "P.5D", "P1.5.5Y", " P1D", "P1D ", "p1d", "P-1D", "P1DT",
        ] {
            let err = input.parse::<IsoDuration>().unwrap_err();
            assert_eq!(err.input, input);
            assert_eq!(err.to_string(), format!("Invalid duration provided: {input}"));
        }
    }

    #[test]
    fn test_overflow_is_invalid() {
        assert!("P99999999999999999999D".parse::<IsoDuration>().is_err());
        assert!("P999999999Y".parse::<IsoDuration>().is_err());

        let huge = "P300000Y".parse::<IsoDuration>().unwrap();
        assert!(huge.span_from(anchor()).is_none());
    }
}
