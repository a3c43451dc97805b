use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HolidayDataError {
    #[error("anchor date {date} not found in calendar window as a rest day")]
    AnchorNotFound { date: NaiveDate },

    #[error("calendar window is not contiguous: {0}")]
    WindowIntegrity(String),

    #[error("provider error: {0}")]
    Provider(String),
}
