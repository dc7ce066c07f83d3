//! Cash-up submission domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Cash-up submission status in the review workflow.
///
/// Valid transitions:
/// - Draft → Pending (submit)
/// - NeedsChanges → Resolved (resubmit)
/// - Pending/Resolved/Draft → NeedsChanges (unbalanced reconciliation)
///
/// `Resolved` specifically means "came back from needs_changes and was
/// resubmitted"; `Approved` is the terminal outcome of the external review
/// flow and is never set by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Being drafted by the cashier; not yet submitted.
    Draft,
    /// Submitted and awaiting review.
    Pending,
    /// Sent back to the cashier after an unbalanced reconciliation.
    NeedsChanges,
    /// Resubmitted after needs_changes.
    Resolved,
    /// Signed off by a reviewer (terminal).
    Approved,
}

impl SubmissionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::NeedsChanges => "needs_changes",
            Self::Resolved => "resolved",
            Self::Approved => "approved",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "needs_changes" => Some(Self::NeedsChanges),
            "resolved" => Some(Self::Resolved),
            "approved" => Some(Self::Approved),
            _ => None,
        }
    }

    /// Returns true if the cashier may submit from this status.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        matches!(self, Self::Draft | Self::NeedsChanges)
    }

    /// Returns true for terminal statuses that new evidence can no longer
    /// force back to needs_changes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One timestamped, attributed line of the append-only review trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNote {
    /// When the note was appended.
    pub at: DateTime<Utc>,
    /// Author id; `None` for system-generated notes.
    pub by_id: Option<Uuid>,
    /// Author display name ("System" for generated notes).
    pub by_name: String,
    /// Note text.
    pub text: String,
}

/// Denormalised point-in-time reconciliation snapshot embedded in a
/// submission. A copy, not a live reference: later standalone uploads do
/// not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSnapshot {
    /// Retrieval URL of the evidence file.
    pub file_url: String,
    /// Original filename of the evidence file.
    pub file_name: String,
    /// Income total extracted from the evidence.
    pub income_total: Decimal,
    /// Expense total extracted from the evidence.
    pub expense_total: Decimal,
    /// Net total extracted from the evidence.
    pub net_total: Decimal,
    /// Declared cash-up total at reconciliation time.
    pub cashup_total: Decimal,
    /// `net_total - cashup_total`.
    pub delta: Decimal,
    /// Whether the delta was within tolerance.
    pub balanced: bool,
    /// When the evidence was uploaded.
    pub uploaded_at: DateTime<Utc>,
    /// Reviewer who uploaded the evidence.
    pub uploaded_by_id: Uuid,
    /// Reviewer display name.
    pub uploaded_by_name: String,
}

/// One cashier's declared cash position for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashUpSubmission {
    /// Submission id.
    pub id: Uuid,
    /// Owning cashier.
    pub user_id: Uuid,
    /// Calendar day the cash-up covers (not a timestamp).
    pub date: NaiveDate,
    /// Owner-declared total; `None` when nothing was declared.
    pub total_amount: Option<Decimal>,
    /// Workflow status.
    pub status: SubmissionStatus,
    /// Frozen at first submit; never recomputed afterwards.
    pub is_late_submission: Option<bool>,
    /// When the submission was last submitted for review.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who submitted it.
    pub submitted_by_id: Option<Uuid>,
    /// Submitter display name.
    pub submitted_by_name: Option<String>,
    /// When a reviewer last acted on it.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer id.
    pub reviewed_by_id: Option<Uuid>,
    /// Reviewer display name.
    pub reviewed_by_name: Option<String>,
    /// Append-only review trail.
    pub review_notes: Vec<ReviewNote>,
    /// Most recent reconciliation snapshot, when evidence exists.
    pub audit_report: Option<AuditSnapshot>,
}
