use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::weekday_from_index;

/// A recurring transaction the projection expands into dated contributions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
    /// Signed amount in cents; negative values are expenses.
    pub amount: i64,
    #[serde(default = "TransactionDefinition::default_active")]
    pub active: bool,
    pub schedule: Schedule,
}

impl TransactionDefinition {
    pub fn new(name: impl Into<String>, amount: i64, schedule: Schedule) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            note: String::new(),
            amount,
            active: true,
            schedule,
        }
    }

    /// Builds a definition from loosely-typed parts where a non-empty rule
    /// expression wins over the simplified fields.
    pub fn from_parts(
        name: impl Into<String>,
        amount: i64,
        rule: &str,
        simple: SimpleSchedule,
    ) -> Self {
        let schedule = if rule.trim().is_empty() {
            Schedule::Simple(simple)
        } else {
            Schedule::Explicit {
                rule: rule.trim().to_string(),
            }
        };
        Self::new(name, amount, schedule)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    fn default_active() -> bool {
        true
    }
}

/// How a transaction describes its recurrence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    /// A rule expression handed to a [`RuleEvaluator`](crate::projection::rule::RuleEvaluator).
    Explicit { rule: String },
    Simple(SimpleSchedule),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimpleSchedule {
    /// `None` falls back to a daily cadence.
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default = "SimpleSchedule::default_interval")]
    pub interval: u32,
    /// Weekdays the cadence may land on; empty means any day.
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl Default for SimpleSchedule {
    fn default() -> Self {
        Self {
            frequency: None,
            interval: Self::default_interval(),
            weekdays: Vec::new(),
            start: None,
            end: None,
        }
    }
}

impl SimpleSchedule {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency: Some(frequency),
            interval,
            ..Self::default()
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily, 1)
    }

    pub fn weekly() -> Self {
        Self::new(Frequency::Weekly, 1)
    }

    pub fn monthly() -> Self {
        Self::new(Frequency::Monthly, 1)
    }

    pub fn yearly() -> Self {
        Self::new(Frequency::Yearly, 1)
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    pub fn on(mut self, weekdays: &[Weekday]) -> Self {
        for day in weekdays {
            if !self.weekdays.contains(day) {
                self.weekdays.push(*day);
            }
        }
        self
    }

    /// Adds weekdays by 0-based index (0 = Monday); out-of-range indexes are ignored.
    pub fn on_indices(self, indices: &[u8]) -> Self {
        let days: Vec<Weekday> = indices
            .iter()
            .filter_map(|idx| weekday_from_index(*idx))
            .collect();
        self.on(&days)
    }

    fn default_interval() -> u32 {
        1
    }
}
