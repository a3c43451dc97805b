use async_trait::async_trait;
use chrono::NaiveDate;

use crate::day::CalendarDay;
use crate::error::HolidayDataError;

/// Trait for fetching per-day calendar statuses from an external source.
#[async_trait]
pub trait CalendarWindowProvider: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch day statuses covering at least `center`'s month plus
    /// `margin_days` on each side.
    /// Returns days sorted by date with every date in range present once.
    async fn fetch_window(
        &self,
        center: NaiveDate,
        margin_days: i64,
    ) -> Result<Vec<CalendarDay>, HolidayDataError>;
}
