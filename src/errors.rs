use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the projection pipeline.
///
/// The pipeline is deterministic, so none of these are worth retrying with the
/// same inputs; callers decide how to surface them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("could not parse recurrence rule for `{name}` ({transaction_id}): {reason}")]
    RuleParse {
        transaction_id: Uuid,
        name: String,
        reason: String,
        /// Transactions fully resolved before the failing one.
        resolved: usize,
    },

    #[error("bucket for {date} holds {amounts} amount(s) but {names} name(s)")]
    InternalConsistency {
        date: NaiveDate,
        amounts: usize,
        names: usize,
    },

    #[error("running totals overflow on {date}")]
    AmountOverflow { date: NaiveDate },

    #[error("stats need at least {required} rows of history, got {rows}")]
    InsufficientHistory { rows: usize, required: usize },

    #[error("projection worker panicked")]
    WorkerPanicked,
}

/// Errors reported by a [`RuleEvaluator`](crate::projection::rule::RuleEvaluator).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("empty rule expression")]
    Empty,
    #[error("missing FREQ part")]
    MissingFrequency,
    #[error("unsupported rule part `{0}`")]
    UnsupportedPart(String),
    #[error("invalid value `{value}` for {part}")]
    InvalidValue { part: String, value: String },
}

/// Failures reading or writing transaction definition files.
#[derive(Debug, Error)]
pub enum DefinitionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
