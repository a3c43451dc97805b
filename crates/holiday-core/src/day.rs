use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar status of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayStatus {
    /// Ordinary working day.
    Workday,
    /// Day off, whether holiday rest or an ordinary day the source marks as off.
    Rest,
    /// An otherwise-off day on which work is mandated to offset an adjacent
    /// multi-day rest block.
    MakeupWorkday,
}

/// One day's status in the source calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}
