use std::fmt;

use super::aggregate::ResultRow;
use crate::{currency::format_cents, errors::ProjectionError};

const DAYS_PER_YEAR: i64 = 365;
const MONTHS_PER_YEAR: i64 = 12;
/// Rows needed before stats are meaningful.
pub const MIN_HISTORY_ROWS: usize = 365;

/// Daily, monthly and yearly figures for one kind of flow, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLine {
    pub daily: i64,
    pub monthly: i64,
    pub yearly: i64,
}

impl RateLine {
    fn from_yearly(yearly: i64) -> Self {
        Self {
            daily: divide_rounded(yearly, DAYS_PER_YEAR),
            monthly: divide_rounded(yearly, MONTHS_PER_YEAR),
            yearly,
        }
    }

    fn plus(self, other: RateLine) -> Self {
        Self {
            daily: self.daily + other.daily,
            monthly: self.monthly + other.monthly,
            yearly: self.yearly + other.yearly,
        }
    }

    pub fn formatted(&self) -> FormattedRates {
        FormattedRates {
            daily: format_cents(self.daily),
            monthly: format_cents(self.monthly),
            yearly: format_cents(self.yearly),
        }
    }
}

/// Currency strings for a [`RateLine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRates {
    pub daily: String,
    pub monthly: String,
    pub yearly: String,
}

/// Coarse rate summary read at the one-year mark of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub income: RateLine,
    pub expenses: RateLine,
    pub net: RateLine,
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, line) in [
            ("income", self.income),
            ("expenses", self.expenses),
            ("net", self.net),
        ] {
            let rates = line.formatted();
            writeln!(
                f,
                "{:<9} daily {:>14}  monthly {:>14}  yearly {:>16}",
                label, rates.daily, rates.monthly, rates.yearly
            )?;
        }
        Ok(())
    }
}

pub struct StatsSummarizer;

impl StatsSummarizer {
    /// Summarizes income and expense rates from a completed projection.
    ///
    /// The mark is the row at index 365; a projection of exactly 365 rows uses
    /// its final row instead.
    pub fn summarize(rows: &[ResultRow]) -> Result<StatsSummary, ProjectionError> {
        if rows.len() < MIN_HISTORY_ROWS {
            return Err(ProjectionError::InsufficientHistory {
                rows: rows.len(),
                required: MIN_HISTORY_ROWS,
            });
        }
        let mark = rows
            .get(MIN_HISTORY_ROWS)
            .or_else(|| rows.last())
            .ok_or(ProjectionError::InsufficientHistory {
                rows: rows.len(),
                required: MIN_HISTORY_ROWS,
            })?;

        let income = RateLine::from_yearly(mark.cumulative_income);
        let expenses = RateLine::from_yearly(mark.cumulative_expenses);
        Ok(StatsSummary {
            income,
            expenses,
            net: income.plus(expenses),
        })
    }
}

/// Integer division rounding half away from zero.
fn divide_rounded(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}
