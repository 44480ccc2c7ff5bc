use chrono::NaiveDate;

use super::calendar::inclusive_days;
use crate::errors::ProjectionError;

/// Inclusive calendar range a projection covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ProjectionWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ProjectionError> {
        if start > end {
            return Err(ProjectionError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn day_count(&self) -> usize {
        inclusive_days(self.start, self.end) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_start_after_end() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            ProjectionWindow::new(start, end),
            Err(ProjectionError::InvalidRange { start, end })
        );
    }

    #[test]
    fn single_day_window_has_one_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let window = ProjectionWindow::new(day, day).unwrap();
        assert_eq!(window.day_count(), 1);
        assert!(window.contains(day));
    }
}
