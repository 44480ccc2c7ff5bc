use chrono::NaiveDate;

use crate::{
    errors::ProjectionError,
    ledger::{calendar::add_days, ProjectionWindow},
};

/// One `(amount, name)` entry landing on a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub amount: i64,
    pub name: String,
}

/// Contributions for a single calendar date, in resolution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub position: usize,
    pub date: NaiveDate,
    pub amounts: Vec<i64>,
    pub names: Vec<String>,
}

impl DayBucket {
    fn empty(position: usize, date: NaiveDate) -> Self {
        Self {
            position,
            date,
            amounts: Vec::new(),
            names: Vec::new(),
        }
    }

    pub fn push(&mut self, contribution: Contribution) {
        self.amounts.push(contribution.amount);
        self.names.push(contribution.name);
    }

    pub fn is_idle(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// The day skeleton for a window: exactly one bucket per date, ascending.
#[derive(Debug, Clone)]
pub struct DayIndex {
    window: ProjectionWindow,
    buckets: Vec<DayBucket>,
}

impl DayIndex {
    pub fn window(&self) -> ProjectionWindow {
        self.window
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.offset(date).and_then(|idx| self.buckets.get(idx))
    }

    pub fn bucket_mut(&mut self, date: NaiveDate) -> Option<&mut DayBucket> {
        self.offset(date).and_then(|idx| self.buckets.get_mut(idx))
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn into_buckets(self) -> Vec<DayBucket> {
        self.buckets
    }

    fn offset(&self, date: NaiveDate) -> Option<usize> {
        if !self.window.contains(date) {
            return None;
        }
        usize::try_from((date - self.window.start()).num_days()).ok()
    }
}

/// Builds the per-day skeleton a projection fills in.
pub struct DateRangeIndexer;

impl DateRangeIndexer {
    /// Creates one empty bucket per date in `[start, end]`.
    pub fn build(start: NaiveDate, end: NaiveDate) -> Result<DayIndex, ProjectionError> {
        let window = ProjectionWindow::new(start, end)?;
        Ok(Self::for_window(window))
    }

    pub fn for_window(window: ProjectionWindow) -> DayIndex {
        let days = window.day_count();
        let mut buckets = Vec::with_capacity(days);
        let mut date = Some(window.start());
        while let Some(current) = date.filter(|d| *d <= window.end()) {
            buckets.push(DayBucket::empty(buckets.len(), current));
            date = add_days(current, 1);
        }
        DayIndex { window, buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn builds_one_bucket_per_day_inclusive() {
        let index = DateRangeIndexer::build(ymd(2024, 2, 27), ymd(2024, 3, 2)).unwrap();
        let dates: Vec<_> = index.buckets().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                ymd(2024, 2, 27),
                ymd(2024, 2, 28),
                ymd(2024, 2, 29),
                ymd(2024, 3, 1),
                ymd(2024, 3, 2)
            ]
        );
        let positions: Vec<_> = index.buckets().iter().map(|b| b.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn rejects_inverted_range() {
        let err = DateRangeIndexer::build(ymd(2024, 6, 1), ymd(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidRange { .. }));
    }

    #[test]
    fn lookup_outside_window_is_none() {
        let mut index = DateRangeIndexer::build(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap();
        assert!(index.bucket(ymd(2023, 12, 31)).is_none());
        assert!(index.bucket_mut(ymd(2024, 2, 1)).is_none());
        let bucket = index.bucket_mut(ymd(2024, 1, 15)).unwrap();
        bucket.push(Contribution {
            amount: -500,
            name: "Lunch".into(),
        });
        assert_eq!(index.bucket(ymd(2024, 1, 15)).unwrap().position, 14);
        assert!(!index.bucket(ymd(2024, 1, 15)).unwrap().is_idle());
    }
}
