use chrono::NaiveDate;

use super::{
    indexer::DayBucket,
    progress::{Phase, ProgressSink, ProgressUpdate, Throttle},
};
use crate::errors::ProjectionError;

/// One projected day with running totals since the window start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub index: usize,
    pub date: NaiveDate,
    pub balance: i64,
    pub cumulative_income: i64,
    pub cumulative_expenses: i64,
    pub day_income: i64,
    pub day_expenses: i64,
    pub day_net: i64,
    pub diff_from_start: i64,
    pub names_display: String,
    pub names: Vec<String>,
}

/// Turns filled day buckets into chronologically ordered result rows.
pub struct Aggregator<'a> {
    name_delimiter: &'a str,
    progress_every: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(name_delimiter: &'a str, progress_every: usize) -> Self {
        Self {
            name_delimiter,
            progress_every,
        }
    }

    pub fn aggregate(
        &self,
        mut buckets: Vec<DayBucket>,
        starting_balance: i64,
        sink: &mut dyn ProgressSink,
    ) -> Result<Vec<ResultRow>, ProjectionError> {
        // Stable, so same-date buckets would keep their relative order.
        buckets.sort_by_key(|bucket| bucket.date);

        let total = buckets.len();
        let throttle = Throttle::new(self.progress_every);
        let mut rows = Vec::with_capacity(total);
        let mut balance = starting_balance;
        let mut income = 0i64;
        let mut expenses = 0i64;
        let mut diff = 0i64;

        for (index, bucket) in buckets.into_iter().enumerate() {
            if throttle.due(index) {
                sink.report(ProgressUpdate::new(Phase::Calculating, index, total));
            }
            if bucket.amounts.len() != bucket.names.len() {
                return Err(ProjectionError::InternalConsistency {
                    date: bucket.date,
                    amounts: bucket.amounts.len(),
                    names: bucket.names.len(),
                });
            }

            let date = bucket.date;
            let add = |total: i64, amount: i64| {
                total
                    .checked_add(amount)
                    .ok_or(ProjectionError::AmountOverflow { date })
            };
            let mut day_income = 0i64;
            let mut day_expenses = 0i64;
            for &amount in &bucket.amounts {
                if amount >= 0 {
                    day_income = add(day_income, amount)?;
                    income = add(income, amount)?;
                } else {
                    day_expenses = add(day_expenses, amount)?;
                    expenses = add(expenses, amount)?;
                }
                balance = add(balance, amount)?;
                diff = add(diff, amount)?;
            }
            let day_net = add(day_income, day_expenses)?;

            rows.push(ResultRow {
                index,
                date: bucket.date,
                balance,
                cumulative_income: income,
                cumulative_expenses: expenses,
                day_income,
                day_expenses,
                day_net,
                diff_from_start: diff,
                names_display: bucket.names.join(self.name_delimiter),
                names: bucket.names,
            });
        }

        Ok(rows)
    }
}
