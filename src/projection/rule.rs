//! Explicit recurrence rules.
//!
//! The engine treats rule expressions as opaque and asks a [`RuleEvaluator`]
//! for the dates they produce inside the window. [`RRuleEvaluator`] implements
//! a subset of the RFC 5545 `RRULE` grammar at day resolution:
//!
//! ```text
//! DTSTART:20240105
//! RRULE:FREQ=MONTHLY;INTERVAL=1;BYDAY=-1FR;COUNT=12
//! ```
//!
//! Supported parts are `FREQ` (`DAILY`, `WEEKLY`, `MONTHLY`, `YEARLY`),
//! `INTERVAL`, `COUNT`, `UNTIL`, `BYDAY` (with ordinals for monthly and
//! yearly rules), `BYMONTHDAY` (monthly rules only) and `WKST=MO`. Periods are
//! calendar aligned: weeks start on Monday, months and years on their first
//! day. `BYDAY` expands to every matching weekday in a monthly or yearly
//! period and limits daily rules. Dates that do not exist in a period, such as
//! the 31st of a 30-day month, are skipped rather than clamped. A missing
//! `DTSTART` anchors the rule on the window start.

use chrono::{Datelike, NaiveDate, Weekday};

use super::cadence::months_between;
use crate::{
    errors::RuleError,
    ledger::{
        calendar::{add_days, days_in_month, shift_month},
        Frequency, ProjectionWindow,
    },
};

const MAX_ORDINAL: i32 = 53;

/// Expands a rule expression into calendar dates.
pub trait RuleEvaluator: Send + Sync {
    /// Dates produced by `expression` within the window, inclusive on both ends.
    fn occurrences(
        &self,
        expression: &str,
        window: &ProjectionWindow,
    ) -> Result<Vec<NaiveDate>, RuleError>;
}

/// Built-in evaluator for a practical `RRULE` subset.
#[derive(Debug, Default, Clone, Copy)]
pub struct RRuleEvaluator;

impl RuleEvaluator for RRuleEvaluator {
    fn occurrences(
        &self,
        expression: &str,
        window: &ProjectionWindow,
    ) -> Result<Vec<NaiveDate>, RuleError> {
        let rule = ParsedRule::parse(expression)?;
        let anchor = rule.start.unwrap_or(window.start());
        let until = match rule.until {
            Some(until) => until.min(window.end()),
            None => window.end(),
        };
        Ok(rule.expand(anchor, window.start(), until))
    }
}

/// One `BYDAY` entry such as `FR`, `2TU` or `-1SU`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ByDay {
    ordinal: Option<i32>,
    weekday: Weekday,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedRule {
    frequency: Frequency,
    interval: u32,
    start: Option<NaiveDate>,
    until: Option<NaiveDate>,
    count: Option<u32>,
    by_day: Vec<ByDay>,
    by_month_day: Vec<i32>,
}

impl ParsedRule {
    fn parse(expression: &str) -> Result<Self, RuleError> {
        let mut start = None;
        let mut rule_body = None;
        for line in expression.split_whitespace() {
            let upper = line.to_ascii_uppercase();
            if let Some(value) = upper.strip_prefix("DTSTART:") {
                start = Some(parse_rule_date("DTSTART", value)?);
            } else if let Some(body) = upper.strip_prefix("RRULE:") {
                rule_body = Some(body.to_string());
            } else if upper.contains('=') {
                rule_body = Some(upper);
            } else {
                return Err(RuleError::UnsupportedPart(line.to_string()));
            }
        }
        let body = rule_body.ok_or(RuleError::Empty)?;

        let mut frequency = None;
        let mut interval = 1u32;
        let mut count = None;
        let mut until = None;
        let mut by_day = Vec::new();
        let mut ordinal_code = None;
        let mut by_month_day = Vec::new();
        for part in body.split(';').filter(|part| !part.is_empty()) {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| RuleError::UnsupportedPart(part.to_string()))?;
            match key {
                "FREQ" => frequency = Some(parse_frequency(value)?),
                "INTERVAL" => interval = parse_number(key, value)?,
                "COUNT" => count = Some(parse_number(key, value)?),
                "UNTIL" => until = Some(parse_rule_date(key, value)?),
                "BYDAY" => {
                    for code in value.split(',') {
                        let entry = parse_by_day(code)?;
                        if entry.ordinal.is_some() && ordinal_code.is_none() {
                            ordinal_code = Some(code.to_string());
                        }
                        by_day.push(entry);
                    }
                }
                "BYMONTHDAY" => {
                    for day in value.split(',') {
                        by_month_day.push(parse_month_day(day)?);
                    }
                }
                "WKST" if value == "MO" => {}
                other => return Err(RuleError::UnsupportedPart(part_name(other, value))),
            }
        }

        let frequency = frequency.ok_or(RuleError::MissingFrequency)?;
        if !by_month_day.is_empty() && frequency != Frequency::Monthly {
            return Err(RuleError::UnsupportedPart("BYMONTHDAY".into()));
        }
        if interval == 0 {
            return Err(invalid("INTERVAL", "0"));
        }
        let ordinals_allowed = matches!(frequency, Frequency::Monthly | Frequency::Yearly);
        if let Some(code) = ordinal_code.filter(|_| !ordinals_allowed) {
            return Err(invalid("BYDAY", &code));
        }
        Ok(Self {
            frequency,
            interval,
            start,
            until,
            count,
            by_day,
            by_month_day,
        })
    }

    /// Occurrences in `[max(anchor, from), until]`; `COUNT` is consumed from
    /// the anchor even for dates before `from`.
    fn expand(&self, anchor: NaiveDate, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if until < anchor || until < from {
            return dates;
        }

        let exhausted = |emitted: u32| self.count.is_some_and(|limit| emitted >= limit);
        let mut emitted = 0u32;
        let mut period = self.first_period(anchor, from);
        while let Some(period_start) = self.period_start(anchor, period) {
            if period_start > until || exhausted(emitted) {
                break;
            }
            for date in self.period_dates(anchor, period_start) {
                if date < anchor {
                    continue;
                }
                if date > until || exhausted(emitted) {
                    return dates;
                }
                emitted += 1;
                if date >= from {
                    dates.push(date);
                }
            }
            period += 1;
        }
        dates
    }

    /// Skips whole periods that end before `from` when nothing needs counting.
    fn first_period(&self, anchor: NaiveDate, from: NaiveDate) -> i64 {
        if self.count.is_some() || from <= anchor {
            return 0;
        }
        let interval = self.interval as i64;
        match self.frequency {
            Frequency::Daily => (from - anchor).num_days() / interval,
            Frequency::Weekly => (from - week_start(anchor)).num_days() / (7 * interval),
            Frequency::Monthly => months_between(anchor, from) / interval,
            Frequency::Yearly => (from.year() - anchor.year()) as i64 / interval,
        }
    }

    fn period_start(&self, anchor: NaiveDate, period: i64) -> Option<NaiveDate> {
        let step = period.checked_mul(self.interval as i64)?;
        match self.frequency {
            Frequency::Daily => add_days(anchor, step),
            Frequency::Weekly => add_days(week_start(anchor), step.checked_mul(7)?),
            Frequency::Monthly => shift_month(anchor.with_day(1)?, step),
            Frequency::Yearly => {
                let year = i32::try_from(anchor.year() as i64 + step).ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            }
        }
    }

    /// Candidate dates of one period, ascending.
    fn period_dates(&self, anchor: NaiveDate, period_start: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = match self.frequency {
            Frequency::Daily => {
                if self.by_day.is_empty() || self.lists_weekday(period_start.weekday()) {
                    vec![period_start]
                } else {
                    Vec::new()
                }
            }
            Frequency::Weekly => (0..7)
                .filter_map(|offset| add_days(period_start, offset))
                .filter(|date| {
                    if self.by_day.is_empty() {
                        date.weekday() == anchor.weekday()
                    } else {
                        self.lists_weekday(date.weekday())
                    }
                })
                .collect(),
            Frequency::Monthly => self.month_dates(anchor, period_start),
            Frequency::Yearly => {
                if self.by_day.is_empty() {
                    NaiveDate::from_ymd_opt(period_start.year(), anchor.month(), anchor.day())
                        .into_iter()
                        .collect()
                } else {
                    let last = NaiveDate::from_ymd_opt(period_start.year(), 12, 31);
                    last.map(|last| self.weekday_dates(period_start, last))
                        .unwrap_or_default()
                }
            }
        };
        dates.sort();
        dates.dedup();
        dates
    }

    fn month_dates(&self, anchor: NaiveDate, first: NaiveDate) -> Vec<NaiveDate> {
        let Some(length) = days_in_month(first.year(), first.month()) else {
            return Vec::new();
        };
        let Some(last) = first.with_day(length) else {
            return Vec::new();
        };
        let weekday_dates = || self.weekday_dates(first, last);

        if !self.by_month_day.is_empty() {
            let days = self
                .by_month_day
                .iter()
                .filter_map(|day| resolve_month_day(*day, length))
                .filter_map(|day| first.with_day(day));
            if self.by_day.is_empty() {
                return days.collect();
            }
            let allowed = weekday_dates();
            return days.filter(|date| allowed.contains(date)).collect();
        }
        if !self.by_day.is_empty() {
            return weekday_dates();
        }
        first.with_day(anchor.day()).into_iter().collect()
    }

    /// Dates in `[first, last]` matching any `BYDAY` entry; ordinals count
    /// from the start (positive) or end (negative) of that range.
    fn weekday_dates(&self, first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        for entry in &self.by_day {
            let offset = (entry.weekday.num_days_from_monday() as i64
                - first.weekday().num_days_from_monday() as i64)
                .rem_euclid(7);
            let matching: Vec<NaiveDate> = (0..)
                .map_while(|week: i64| add_days(first, offset + week * 7))
                .take_while(|date| *date <= last)
                .collect();
            match entry.ordinal {
                None => dates.extend(matching),
                Some(n) if n > 0 => dates.extend(matching.get(n as usize - 1)),
                Some(n) => {
                    let back = n.unsigned_abs() as usize;
                    if back <= matching.len() {
                        dates.push(matching[matching.len() - back]);
                    }
                }
            }
        }
        dates.sort();
        dates
    }

    fn lists_weekday(&self, weekday: Weekday) -> bool {
        self.by_day.iter().any(|entry| entry.weekday == weekday)
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as i64;
    add_days(date, -back).unwrap_or(date)
}

fn resolve_month_day(day: i32, length: u32) -> Option<u32> {
    let resolved = if day < 0 { length as i32 + day + 1 } else { day };
    u32::try_from(resolved)
        .ok()
        .filter(|day| (1..=length).contains(day))
}

fn part_name(key: &str, value: &str) -> String {
    if key == "WKST" {
        format!("WKST={value}")
    } else {
        key.to_string()
    }
}

fn invalid(part: &str, value: &str) -> RuleError {
    RuleError::InvalidValue {
        part: part.to_string(),
        value: value.to_string(),
    }
}

fn parse_frequency(value: &str) -> Result<Frequency, RuleError> {
    match value {
        "DAILY" => Ok(Frequency::Daily),
        "WEEKLY" => Ok(Frequency::Weekly),
        "MONTHLY" => Ok(Frequency::Monthly),
        "YEARLY" => Ok(Frequency::Yearly),
        other => Err(invalid("FREQ", other)),
    }
}

fn parse_number(part: &str, value: &str) -> Result<u32, RuleError> {
    value.parse::<u32>().map_err(|_| invalid(part, value))
}

/// Accepts `YYYYMMDD`, optionally followed by a `THHMMSS[Z]` time that is ignored.
fn parse_rule_date(part: &str, value: &str) -> Result<NaiveDate, RuleError> {
    let date_part = value.split('T').next().unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y%m%d").map_err(|_| invalid(part, value))
}

fn parse_by_day(code: &str) -> Result<ByDay, RuleError> {
    let split = code.len().saturating_sub(2);
    if !code.is_char_boundary(split) {
        return Err(invalid("BYDAY", code));
    }
    let (ordinal, day) = code.split_at(split);
    let weekday = match day {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return Err(invalid("BYDAY", code)),
    };
    let ordinal = if ordinal.is_empty() {
        None
    } else {
        let n = ordinal
            .trim_start_matches('+')
            .parse::<i32>()
            .map_err(|_| invalid("BYDAY", code))?;
        if n == 0 || n.abs() > MAX_ORDINAL {
            return Err(invalid("BYDAY", code));
        }
        Some(n)
    };
    Ok(ByDay { ordinal, weekday })
}

fn parse_month_day(value: &str) -> Result<i32, RuleError> {
    let day = value
        .parse::<i32>()
        .map_err(|_| invalid("BYMONTHDAY", value))?;
    if day == 0 || !(-31..=31).contains(&day) {
        return Err(invalid("BYMONTHDAY", value));
    }
    Ok(day)
}
