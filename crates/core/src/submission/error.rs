//! Submission workflow error types.

use thiserror::Error;

use super::types::SubmissionStatus;

/// Errors that can occur during submission workflow transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// Attempted an illegal status transition.
    #[error("cannot submit for review from status {from}")]
    InvalidStateTransition {
        /// The current status the transition was attempted from.
        from: SubmissionStatus,
    },

    /// The actor is not the owner of the submission.
    #[error("only the submission owner may submit it for review")]
    NotOwner,

    /// A reviewer note was empty.
    #[error("note text is required")]
    EmptyNote,
}

impl SubmissionError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidStateTransition { .. } => 409,
            Self::NotOwner => 403,
            Self::EmptyNote => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::NotOwner => "FORBIDDEN",
            Self::EmptyNote => "VALIDATION_ERROR",
        }
    }
}
