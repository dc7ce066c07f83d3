//! Identity resolution error types.

use thiserror::Error;

/// Errors that can occur while resolving a detected employee name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The detected name matched zero users, or more than one.
    #[error("detected name '{detected}' matched {matches} users, expected exactly one")]
    AmbiguousOrNoIdentity {
        /// The name detected in the report.
        detected: String,
        /// Number of candidate users that matched.
        matches: usize,
    },

    /// A unique candidate was found but failed the token-containment check.
    #[error("stored name '{stored}' does not match detected name '{detected}'")]
    NameMismatch {
        /// The stored display name of the candidate user.
        stored: String,
        /// The name detected in the report.
        detected: String,
    },
}

impl IdentityError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::AmbiguousOrNoIdentity { .. } | Self::NameMismatch { .. } => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AmbiguousOrNoIdentity { .. } => "AMBIGUOUS_OR_NO_IDENTITY",
            Self::NameMismatch { .. } => "NAME_MISMATCH",
        }
    }
}
