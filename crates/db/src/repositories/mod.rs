//! Repository abstractions for data access.
//!
//! Repositories implement the core crate's orchestration traits, hiding
//! the `SeaORM` implementation details from the rest of the application.

pub mod audit_report;
pub mod notification;
pub mod submission;
pub mod user;

pub use audit_report::AuditReportRepository;
pub use notification::NotificationRepository;
pub use submission::SubmissionRepository;
pub use user::{User, UserRepository};
