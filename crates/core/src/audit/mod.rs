//! Audit ingestion orchestration: evidence uploads, deferred
//! reconciliation, and the review flow.

pub mod error;
pub mod service;
pub mod types;

pub use error::AuditError;
pub use service::{
    AuditReportRepository, AuditService, NotificationSink, SubmissionRepository, UserDirectory,
};
pub use types::{
    Actor, AuditReport, BoundEvidenceOutcome, DetectedIdentity, EvidenceAction, NewAuditReport,
    NewNotification, StandaloneOutcome, SubmitOutcome, NOTIFICATION_BALANCE_MISMATCH,
};
