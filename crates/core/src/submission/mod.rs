//! Cash-up submission lifecycle: status machine, lateness policy, and the
//! stateless workflow service.

pub mod error;
pub mod lateness;
pub mod service;
pub mod types;

pub use error::SubmissionError;
pub use lateness::LatenessPolicy;
pub use service::{SubmissionWorkflow, SubmitAction, SYSTEM_AUTHOR};
pub use types::{AuditSnapshot, CashUpSubmission, ReviewNote, SubmissionStatus};
