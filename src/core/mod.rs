pub mod sanitize;
pub mod schedule;
pub mod weekday;

pub use schedule::{DaySchedule, Plan, WeekSchedule};
pub use weekday::Weekday;
