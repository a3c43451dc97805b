use holiday_core::error::HolidayDataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No data returned for query '{query}'")]
    NoData { query: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<ProviderError> for HolidayDataError {
    fn from(err: ProviderError) -> Self {
        HolidayDataError::Provider(err.to_string())
    }
}
