//! Audit ingestion types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tillbook_shared::Role;
use uuid::Uuid;

use crate::submission::SubmissionStatus;

/// Notification type emitted when evidence does not balance.
pub const NOTIFICATION_BALANCE_MISMATCH: &str = "CASHUP_BALANCE_MISMATCH";

/// The authenticated principal performing an operation.
#[derive(Debug, Clone)]
pub struct Actor {
    /// User id.
    pub id: Uuid,
    /// Display name, used for audit-trail stamps.
    pub name: String,
    /// Roles held by the user.
    pub roles: Vec<Role>,
}

impl Actor {
    /// Whether this actor may upload evidence workbooks.
    #[must_use]
    pub fn can_upload_evidence(&self) -> bool {
        self.roles.iter().any(Role::can_upload_evidence)
    }

    /// Whether this actor may review submissions.
    #[must_use]
    pub fn can_review(&self) -> bool {
        self.roles.iter().any(Role::can_review)
    }
}

/// A persisted standalone audit report row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Row id.
    pub id: Uuid,
    /// Resolved owner of the evidence.
    pub user_id: Uuid,
    /// Business day the evidence covers. Unique together with `user_id`.
    pub date_key: NaiveDate,
    /// Employee name as printed in the workbook.
    pub employee_name_from_report: String,
    /// Start of the detected report window.
    pub report_from_date_key: Option<NaiveDate>,
    /// End of the detected report window.
    pub report_to_date_key: Option<NaiveDate>,
    /// Public URL of the stored workbook.
    pub file_url: String,
    /// Stored filename.
    pub file_name: String,
    /// Sum of income rows.
    pub income_total: Decimal,
    /// Sum of expense rows.
    pub expense_total: Decimal,
    /// income − expense.
    pub net_total: Decimal,
    /// Uploading user.
    pub uploaded_by_id: Uuid,
    /// Uploading user's display name.
    pub uploaded_by_name: String,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Input for an audit report upsert keyed on (user_id, date_key).
#[derive(Debug, Clone)]
pub struct NewAuditReport {
    /// Candidate row id; an existing row for the key keeps its id.
    pub id: Uuid,
    /// Resolved owner of the evidence.
    pub user_id: Uuid,
    /// Business day the evidence covers.
    pub date_key: NaiveDate,
    /// Employee name as printed in the workbook.
    pub employee_name_from_report: String,
    /// Start of the detected report window.
    pub report_from_date_key: Option<NaiveDate>,
    /// End of the detected report window.
    pub report_to_date_key: Option<NaiveDate>,
    /// Public URL of the stored workbook.
    pub file_url: String,
    /// Stored filename.
    pub file_name: String,
    /// Sum of income rows.
    pub income_total: Decimal,
    /// Sum of expense rows.
    pub expense_total: Decimal,
    /// income − expense.
    pub net_total: Decimal,
    /// Uploading user.
    pub uploaded_by_id: Uuid,
    /// Uploading user's display name.
    pub uploaded_by_name: String,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// A notification enqueued for delivery.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// User to notify.
    pub recipient_user_id: Uuid,
    /// User whose action triggered the notification, if any.
    pub actor_user_id: Option<Uuid>,
    /// Notification type tag.
    pub kind: String,
    /// Short title.
    pub title: String,
    /// Human-readable message body.
    pub message: String,
    /// Optional deep link into the client.
    pub link: Option<String>,
    /// Structured payload.
    pub data: serde_json::Value,
}

/// What happened to the submission after a bound evidence upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceAction {
    /// Snapshot stored; submission status untouched.
    Stored,
    /// Snapshot stored and the submission was sent back for changes.
    SentBack,
}

/// Result of attaching evidence bound to a submission.
#[derive(Debug, Clone, Serialize)]
pub struct BoundEvidenceOutcome {
    /// Whether the submission was sent back.
    pub action: EvidenceAction,
    /// Whether the evidence balanced against the declared total.
    pub balanced: bool,
    /// Sum of income rows.
    pub income_total: Decimal,
    /// Sum of expense rows.
    pub expense_total: Decimal,
    /// income − expense.
    pub net_total: Decimal,
    /// Declared cash-up total the evidence was checked against.
    pub cashup_total: Decimal,
    /// net − declared.
    pub delta: Decimal,
    /// Data rows consumed from the workbook.
    pub rows_parsed: usize,
    /// Public URL of the stored workbook.
    pub file_url: String,
    /// Stored filename.
    pub file_name: String,
}

/// Identity and window detected from a standalone workbook.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedIdentity {
    /// Employee name as printed in the workbook.
    pub employee_name: String,
    /// Resolved user id.
    pub user_id: Uuid,
    /// Resolved user's display name.
    pub display_name: String,
    /// Start of the detected report window.
    pub from_date_key: Option<NaiveDate>,
    /// End of the detected report window.
    pub to_date_key: Option<NaiveDate>,
}

/// Result of a standalone evidence upload.
#[derive(Debug, Clone, Serialize)]
pub struct StandaloneOutcome {
    /// Who the evidence was resolved to.
    pub detected: DetectedIdentity,
    /// The upserted audit report row.
    pub audit: AuditReport,
}

/// Result of a submit-for-review call.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// Submission id.
    pub submission_id: Uuid,
    /// Status after the transition and any deferred reconciliation.
    pub status: SubmissionStatus,
    /// Frozen lateness verdict.
    pub is_late_submission: bool,
}
