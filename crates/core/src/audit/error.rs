//! Audit ingestion error types.

use thiserror::Error;
use uuid::Uuid;

use crate::identity::IdentityError;
use crate::storage::StorageError;
use crate::submission::SubmissionError;
use crate::workbook::ExtractionError;

/// Errors from the audit ingestion orchestrator.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Workbook extraction failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Identity resolution failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Submission workflow rejected the operation.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Evidence storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Submission does not exist.
    #[error("submission not found: {0}")]
    SubmissionNotFound(Uuid),

    /// Actor lacks the required role.
    #[error("actor lacks the required role for this operation")]
    Forbidden,

    /// Request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// Persistence layer failure.
    #[error("repository error: {0}")]
    Repository(String),

    /// Notification dispatch failure. Callers log and swallow this.
    #[error("notification dispatch failed: {0}")]
    Notification(String),
}

impl AuditError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Extraction(e) => e.status_code(),
            Self::Identity(e) => e.status_code(),
            Self::Submission(e) => e.status_code(),
            Self::Storage(e) => e.status_code(),
            Self::SubmissionNotFound(_) => 404,
            Self::Forbidden => 403,
            Self::Validation(_) => 400,
            Self::Repository(_) | Self::Notification(_) => 500,
        }
    }

    /// Machine-readable error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.error_code(),
            Self::Identity(e) => e.error_code(),
            Self::Submission(e) => e.error_code(),
            Self::Storage(_) => "STORAGE_ERROR",
            Self::SubmissionNotFound(_) => "SUBMISSION_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Repository(_) => "DATABASE_ERROR",
            Self::Notification(_) => "NOTIFICATION_ERROR",
        }
    }
}
