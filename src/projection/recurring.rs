use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{
    cadence::{Cadence, Span},
    indexer::{Contribution, DayIndex},
    progress::{Phase, ProgressSink, ProgressUpdate, Throttle},
    rule::RuleEvaluator,
};
use crate::{
    errors::ProjectionError,
    ledger::{Frequency, ProjectionWindow, Schedule, SimpleSchedule, TransactionDefinition},
};

/// Counters describing a completed resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub resolved: usize,
    pub skipped_inactive: usize,
    pub occurrences: usize,
}

/// Expands transaction schedules into the day index.
pub struct RecurrenceResolver<'a> {
    evaluator: &'a dyn RuleEvaluator,
    progress_every: usize,
}

impl<'a> RecurrenceResolver<'a> {
    pub fn new(evaluator: &'a dyn RuleEvaluator, progress_every: usize) -> Self {
        Self {
            evaluator,
            progress_every,
        }
    }

    /// Appends every active transaction's occurrences to `index`.
    ///
    /// Stops at the first failing transaction; contributions already appended
    /// stay in `index` but the caller must treat the run as failed.
    pub fn resolve(
        &self,
        transactions: &[TransactionDefinition],
        index: &mut DayIndex,
        sink: &mut dyn ProgressSink,
    ) -> Result<ResolveSummary, ProjectionError> {
        let window = index.window();
        let total = transactions.len();
        let throttle = Throttle::new(self.progress_every);
        let mut summary = ResolveSummary::default();

        for (position, txn) in transactions.iter().enumerate() {
            if throttle.due(position) {
                sink.report(ProgressUpdate::new(Phase::Recurrences, position, total));
            }
            if !txn.active {
                summary.skipped_inactive += 1;
                continue;
            }

            let dates = self.occurrences(txn, &window, summary.resolved)?;
            for date in dates {
                if let Some(bucket) = index.bucket_mut(date) {
                    bucket.push(Contribution {
                        amount: txn.amount,
                        name: txn.name.clone(),
                    });
                    summary.occurrences += 1;
                }
            }
            summary.resolved += 1;
        }

        debug!(
            resolved = summary.resolved,
            skipped = summary.skipped_inactive,
            occurrences = summary.occurrences,
            "recurrences resolved"
        );
        Ok(summary)
    }

    fn occurrences(
        &self,
        txn: &TransactionDefinition,
        window: &ProjectionWindow,
        resolved: usize,
    ) -> Result<Vec<NaiveDate>, ProjectionError> {
        match &txn.schedule {
            Schedule::Explicit { rule } => self
                .evaluator
                .occurrences(rule, window)
                .map(|dates| dates.into_iter().filter(|d| window.contains(*d)).collect())
                .map_err(|err| ProjectionError::RuleParse {
                    transaction_id: txn.id,
                    name: txn.name.clone(),
                    reason: err.to_string(),
                    resolved,
                }),
            Schedule::Simple(simple) => Ok(simple_occurrences(txn, simple, window)),
        }
    }
}

fn simple_occurrences(
    txn: &TransactionDefinition,
    simple: &SimpleSchedule,
    window: &ProjectionWindow,
) -> Vec<NaiveDate> {
    let start = simple.start.unwrap_or(window.start());
    let end = match simple.end {
        Some(end) if end <= window.end() => end,
        _ => window.end(),
    };
    if start > end {
        return Vec::new();
    }

    let frequency = simple.frequency.unwrap_or_else(|| {
        warn!(
            transaction = %txn.id,
            name = %txn.name,
            "no frequency set; defaulting to a daily cadence"
        );
        Frequency::Daily
    });
    if simple.interval == 0 {
        warn!(
            transaction = %txn.id,
            name = %txn.name,
            "interval of 0 treated as 1"
        );
    }

    let mut cadence = Cadence::new(frequency, simple.interval);
    cadence.weekdays = simple.weekdays.clone();
    cadence.occurrences(Span {
        anchor: start,
        from: window.start(),
        until: end,
    })
}
