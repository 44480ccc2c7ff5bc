//! Date generation for simplified schedules.
//!
//! Cadences are anchored on their first candidate date: weekly blocks start at
//! the anchor and monthly/yearly steps clamp to the last day of short months.
//! Explicit rules use calendar-aligned periods instead (see `rule`).

use chrono::{Datelike, NaiveDate, Weekday};

use crate::ledger::{
    calendar::{add_days, shift_month},
    Frequency,
};

/// A normalized repeating pattern anchored on its first candidate date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    pub frequency: Frequency,
    pub interval: u32,
    pub weekdays: Vec<Weekday>,
}

/// Bounds for a single expansion.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub anchor: NaiveDate,
    /// Earliest date to return.
    pub from: NaiveDate,
    pub until: NaiveDate,
}

impl Cadence {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval: interval.max(1),
            weekdays: Vec::new(),
        }
    }

    /// Every occurrence in `[max(anchor, from), until]`, ascending.
    pub fn occurrences(&self, span: Span) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if span.until < span.anchor || span.until < span.from {
            return dates;
        }

        let mut period = self.first_period(span);
        while let Some(floor) = self.period_floor(span.anchor, period) {
            if floor > span.until {
                break;
            }
            for date in self.period_dates(floor) {
                if date > span.until {
                    return dates;
                }
                if date >= span.from && date >= span.anchor {
                    dates.push(date);
                }
            }
            period += 1;
        }
        dates
    }

    /// Skips whole periods that end before `from`.
    fn first_period(&self, span: Span) -> i64 {
        if span.from <= span.anchor {
            return 0;
        }
        let interval = self.interval as i64;
        let days = (span.from - span.anchor).num_days();
        let skipped = match self.frequency {
            Frequency::Daily => days / interval,
            Frequency::Weekly => days / (7 * interval),
            Frequency::Monthly => months_between(span.anchor, span.from) / interval - 1,
            Frequency::Yearly => (span.from.year() - span.anchor.year()) as i64 / interval - 1,
        };
        skipped.max(0)
    }

    /// First candidate date of `period`.
    fn period_floor(&self, anchor: NaiveDate, period: i64) -> Option<NaiveDate> {
        let interval = self.interval as i64;
        match self.frequency {
            Frequency::Daily => add_days(anchor, period * interval),
            Frequency::Weekly => add_days(anchor, period * interval * 7),
            Frequency::Monthly => shift_month(anchor, period * interval),
            Frequency::Yearly => shift_month(anchor, period * interval * 12),
        }
    }

    fn period_dates(&self, floor: NaiveDate) -> Vec<NaiveDate> {
        if self.frequency == Frequency::Weekly && !self.weekdays.is_empty() {
            return (0..7)
                .filter_map(|offset| add_days(floor, offset))
                .filter(|date| self.weekdays.contains(&date.weekday()))
                .collect();
        }
        if self.weekdays.is_empty() || self.weekdays.contains(&floor.weekday()) {
            vec![floor]
        } else {
            Vec::new()
        }
    }
}

pub(crate) fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 * 12 + to.month0() as i64) - (from.year() as i64 * 12 + from.month0() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn span(anchor: NaiveDate, until: NaiveDate) -> Span {
        Span {
            anchor,
            from: anchor,
            until,
        }
    }

    #[test]
    fn daily_with_interval() {
        let dates =
            Cadence::new(Frequency::Daily, 3).occurrences(span(ymd(2024, 1, 1), ymd(2024, 1, 10)));
        assert_eq!(
            dates,
            vec![ymd(2024, 1, 1), ymd(2024, 1, 4), ymd(2024, 1, 7), ymd(2024, 1, 10)]
        );
    }

    #[test]
    fn weekly_block_expands_listed_weekdays() {
        let mut cadence = Cadence::new(Frequency::Weekly, 2);
        cadence.weekdays = vec![Weekday::Tue, Weekday::Thu];
        // 2024-01-01 is a Monday.
        let dates = cadence.occurrences(span(ymd(2024, 1, 1), ymd(2024, 1, 21)));
        assert_eq!(
            dates,
            vec![ymd(2024, 1, 2), ymd(2024, 1, 4), ymd(2024, 1, 16), ymd(2024, 1, 18)]
        );
    }

    #[test]
    fn monthly_keeps_anchor_day_after_short_months() {
        let dates = Cadence::new(Frequency::Monthly, 1)
            .occurrences(span(ymd(2024, 1, 31), ymd(2024, 4, 30)));
        assert_eq!(
            dates,
            vec![ymd(2024, 1, 31), ymd(2024, 2, 29), ymd(2024, 3, 31), ymd(2024, 4, 30)]
        );
    }

    #[test]
    fn monthly_weekday_filter_drops_other_days() {
        let mut cadence = Cadence::new(Frequency::Monthly, 1);
        cadence.weekdays = vec![Weekday::Mon];
        // Jan 1 2024 and Apr 1 2024 are Mondays; Feb 1 and Mar 1 are not.
        let dates = cadence.occurrences(span(ymd(2024, 1, 1), ymd(2024, 4, 30)));
        assert_eq!(dates, vec![ymd(2024, 1, 1), ymd(2024, 4, 1)]);
    }

    #[test]
    fn skipping_ahead_matches_full_walk() {
        let cadence = Cadence::new(Frequency::Monthly, 2);
        let anchor = ymd(2020, 3, 31);
        let full = cadence.occurrences(span(anchor, ymd(2024, 12, 31)));
        let skipped = cadence.occurrences(Span {
            anchor,
            from: ymd(2024, 1, 1),
            until: ymd(2024, 12, 31),
        });
        let expected: Vec<_> = full.into_iter().filter(|d| *d >= ymd(2024, 1, 1)).collect();
        assert_eq!(skipped, expected);
    }

    #[test]
    fn yearly_clamps_leap_day() {
        let dates = Cadence::new(Frequency::Yearly, 1)
            .occurrences(span(ymd(2024, 2, 29), ymd(2026, 12, 31)));
        assert_eq!(
            dates,
            vec![ymd(2024, 2, 29), ymd(2025, 2, 28), ymd(2026, 2, 28)]
        );
    }
}
