use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Splits a `YYYY-MM-DD` string into its numeric components.
///
/// Components may be unpadded (`2024-1-5`). Anything malformed or partial
/// yields `(0, 0, 0)` instead of an error.
pub fn parse_ymd(input: &str) -> (i32, u32, u32) {
    split_ymd(input).unwrap_or((0, 0, 0))
}

fn split_ymd(input: &str) -> Option<(i32, u32, u32)> {
    let mut parts = input.trim().split('-');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month, day))
}

/// Parses a `YYYY-MM-DD` string into a calendar date when it names a real day.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    match parse_ymd(input) {
        (0, 0, 0) => None,
        (year, month, day) => NaiveDate::from_ymd_opt(year, month, day),
    }
}

/// Renders a date as zero-padded `MM/DD/YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{:04}", date.month(), date.day(), date.year())
}

/// Maps a 0-based weekday index (0 = Monday) onto [`Weekday`].
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Inclusive number of calendar days between `start` and `end`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Moves `date` by `months`, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = date.year() as i64 * 12 + date.month0() as i64 + months;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Moves `date` by `years`, clamping Feb 29 onto Feb 28 in common years.
pub fn shift_year(date: NaiveDate, years: i64) -> Option<NaiveDate> {
    shift_month(date, years.checked_mul(12)?)
}

/// Number of days in the given month, or `None` for an impossible month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next_first - first).num_days() as u32)
}

/// The date `days` after `date`, if representable.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_ymd_accepts_unpadded_components() {
        assert_eq!(parse_ymd("2024-01-05"), (2024, 1, 5));
        assert_eq!(parse_ymd("2024-1-5"), (2024, 1, 5));
    }

    #[test]
    fn parse_ymd_returns_zeroes_on_garbage() {
        assert_eq!(parse_ymd(""), (0, 0, 0));
        assert_eq!(parse_ymd("2024-01"), (0, 0, 0));
        assert_eq!(parse_ymd("2024-xx-01"), (0, 0, 0));
        assert_eq!(parse_ymd("2024-01-01-01"), (0, 0, 0));
    }

    #[test]
    fn parse_date_rejects_impossible_days() {
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("2024-2-29"), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn display_date_is_zero_padded() {
        assert_eq!(format_display_date(ymd(2024, 3, 7)), "03/07/2024");
    }

    #[test]
    fn shift_month_clamps_to_month_end() {
        assert_eq!(shift_month(ymd(2024, 1, 31), 1), Some(ymd(2024, 2, 29)));
        assert_eq!(shift_month(ymd(2023, 1, 31), 1), Some(ymd(2023, 2, 28)));
        assert_eq!(shift_month(ymd(2024, 11, 15), 3), Some(ymd(2025, 2, 15)));
        assert_eq!(shift_month(ymd(2024, 1, 15), -1), Some(ymd(2023, 12, 15)));
    }

    #[test]
    fn shift_year_handles_leap_day() {
        assert_eq!(shift_year(ymd(2024, 2, 29), 1), Some(ymd(2025, 2, 28)));
        assert_eq!(shift_year(ymd(2024, 2, 29), 4), Some(ymd(2028, 2, 29)));
    }

    #[test]
    fn days_in_month_covers_december() {
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2024, 13), None);
    }
}
