//! Recurrence resolution and balance projection.
//!
//! A run walks four stages: the [`DateRangeIndexer`] lays out one bucket per
//! day, the [`RecurrenceResolver`] drops each active transaction's
//! occurrences into those buckets, the [`Aggregator`] turns the buckets into
//! ordered [`ResultRow`]s with running totals, and [`StatsSummarizer`] can
//! derive rate figures from the finished rows.

pub mod aggregate;
pub mod cadence;
pub mod indexer;
pub mod progress;
pub mod recurring;
pub mod rule;
pub mod stats;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

pub use aggregate::{Aggregator, ResultRow};
pub use indexer::{DateRangeIndexer, DayBucket, DayIndex};
pub use progress::{NoProgress, Phase, ProgressSink, ProgressUpdate};
pub use recurring::{RecurrenceResolver, ResolveSummary};
pub use rule::{RRuleEvaluator, RuleEvaluator};
pub use stats::{StatsSummarizer, StatsSummary};

use crate::{errors::ProjectionError, ledger::TransactionDefinition};

pub const DEFAULT_PROGRESS_EVERY: usize = 1000;
pub const DEFAULT_NAME_DELIMITER: &str = ", ";

/// Tuning knobs that do not change projected amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Emit a progress update every this many transactions or rows.
    pub progress_every: usize,
    /// Joins contributing names into [`ResultRow::names_display`].
    pub name_delimiter: String,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            progress_every: DEFAULT_PROGRESS_EVERY,
            name_delimiter: DEFAULT_NAME_DELIMITER.to_string(),
        }
    }
}

/// Inputs for one run. Treated as a read-only snapshot while it runs.
#[derive(Debug, Clone)]
pub struct ProjectionRequest {
    pub transactions: Vec<TransactionDefinition>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Opening balance in cents.
    pub starting_balance: i64,
}

impl ProjectionRequest {
    pub fn new(
        transactions: Vec<TransactionDefinition>,
        start: NaiveDate,
        end: NaiveDate,
        starting_balance: i64,
    ) -> Self {
        Self {
            transactions,
            start,
            end,
            starting_balance,
        }
    }
}

/// The rows of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub starting_balance: i64,
    pub rows: Vec<ResultRow>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn final_balance(&self) -> i64 {
        self.rows
            .last()
            .map(|row| row.balance)
            .unwrap_or(self.starting_balance)
    }

    pub fn stats(&self) -> Result<StatsSummary, ProjectionError> {
        StatsSummarizer::summarize(&self.rows)
    }

    /// Empties the rows but keeps their allocation for reuse.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Drops the rows and their allocation ahead of retaining a new result.
    pub fn release(&mut self) {
        self.rows.clear();
        self.rows.shrink_to_fit();
    }
}

/// Runs projections with a fixed rule evaluator and options.
#[derive(Clone)]
pub struct ProjectionEngine {
    evaluator: Arc<dyn RuleEvaluator>,
    options: ProjectionOptions,
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(Arc::new(RRuleEvaluator), ProjectionOptions::default())
    }
}

impl ProjectionEngine {
    pub fn new(evaluator: Arc<dyn RuleEvaluator>, options: ProjectionOptions) -> Self {
        Self { evaluator, options }
    }

    pub fn with_options(options: ProjectionOptions) -> Self {
        Self::new(Arc::new(RRuleEvaluator), options)
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// Runs the full pipeline synchronously on the calling thread.
    pub fn project(
        &self,
        request: &ProjectionRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<Projection, ProjectionError> {
        sink.report(ProgressUpdate::new(Phase::PreparingDates, 0, 0));
        let mut index = DateRangeIndexer::build(request.start, request.end)?;
        info!(
            days = index.len(),
            transactions = request.transactions.len(),
            "starting projection"
        );

        RecurrenceResolver::new(self.evaluator.as_ref(), self.options.progress_every).resolve(
            &request.transactions,
            &mut index,
            sink,
        )?;

        let rows = Aggregator::new(&self.options.name_delimiter, self.options.progress_every)
            .aggregate(index.into_buckets(), request.starting_balance, sink)?;

        sink.report(ProgressUpdate::new(Phase::Done, rows.len(), rows.len()));
        let projection = Projection {
            starting_balance: request.starting_balance,
            rows,
        };
        info!(
            rows = projection.len(),
            final_balance = projection.final_balance(),
            "projection finished"
        );
        Ok(projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Schedule, SimpleSchedule};

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn reports_every_phase_in_order() {
        let request = ProjectionRequest::new(
            vec![TransactionDefinition::new(
                "Pay",
                100,
                Schedule::Simple(SimpleSchedule::weekly()),
            )],
            ymd(2024, 1, 1),
            ymd(2024, 1, 10),
            0,
        );
        let mut seen = Vec::new();
        let mut sink = |update: ProgressUpdate| seen.push(update.to_string());
        ProjectionEngine::default()
            .project(&request, &mut sink)
            .unwrap();
        assert_eq!(
            seen,
            vec![
                "preparing dates…".to_string(),
                "recurrences… [0/1]".to_string(),
                "calculating… [0/10]".to_string(),
                "done [10/10]".to_string(),
            ]
        );
    }

    #[test]
    fn release_empties_rows() {
        let request = ProjectionRequest::new(Vec::new(), ymd(2024, 1, 1), ymd(2024, 1, 3), 42);
        let mut projection = ProjectionEngine::default()
            .project(&request, &mut NoProgress)
            .unwrap();
        assert_eq!(projection.len(), 3);
        let mut cleared = projection.clone();
        cleared.clear();
        assert!(cleared.is_empty() && cleared.rows.capacity() >= 3);
        projection.release();
        assert!(projection.is_empty());
        assert_eq!(projection.final_balance(), 42);
    }
}
