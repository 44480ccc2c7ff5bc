//! Transaction definitions, projection windows, and calendar helpers.

pub mod calendar;
pub mod transaction;
pub mod window;

pub use calendar::{format_display_date, parse_date, parse_ymd};
pub use transaction::{Frequency, Schedule, SimpleSchedule, TransactionDefinition};
pub use window::ProjectionWindow;
