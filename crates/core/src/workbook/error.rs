//! Workbook extraction error types.

use thiserror::Error;

/// Errors that can occur while extracting totals from a workbook.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The workbook contains no worksheets.
    #[error("workbook contains no worksheets")]
    NoWorksheet,

    /// No header row with the required columns was found.
    #[error("no header row with 'transaction type' and 'amount' columns found in the first 50 rows")]
    HeaderNotFound,

    /// The file could not be opened as a spreadsheet at all.
    #[error("unreadable workbook: {0}")]
    Unreadable(String),
}

impl ExtractionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoWorksheet | Self::HeaderNotFound | Self::Unreadable(_) => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoWorksheet => "NO_WORKSHEET",
            Self::HeaderNotFound => "HEADER_NOT_FOUND",
            Self::Unreadable(_) => "UNREADABLE_WORKBOOK",
        }
    }
}
