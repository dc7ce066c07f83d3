//! Workflow service for cash-up submission state transitions.
//!
//! Stateless validation and execution of transitions; persistence is the
//! caller's concern. All audit-trail stamps are computed here so every
//! code path records the same shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::SubmissionError;
use super::lateness::LatenessPolicy;
use super::types::{CashUpSubmission, ReviewNote, SubmissionStatus};

/// Attribution used for engine-generated notes.
pub const SYSTEM_AUTHOR: &str = "System";

/// The result of a successful submit-for-review transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAction {
    /// Status after the transition.
    pub new_status: SubmissionStatus,
    /// Frozen lateness verdict for this submit action.
    pub is_late_submission: bool,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Submitting user.
    pub submitted_by_id: Uuid,
    /// Submitting user's display name.
    pub submitted_by_name: String,
}

/// Stateless service for cash-up submission workflow transitions.
pub struct SubmissionWorkflow;

impl SubmissionWorkflow {
    /// Submit a cash-up for review.
    ///
    /// Legal only for the owner and only from draft or needs_changes. A
    /// resubmission after needs_changes lands in resolved; a first
    /// submission lands in pending. Lateness is computed here, once, and
    /// never recomputed retroactively.
    ///
    /// # Errors
    ///
    /// * `SubmissionError::NotOwner` if the actor does not own the
    ///   submission
    /// * `SubmissionError::InvalidStateTransition` if the current status
    ///   is not submittable
    pub fn submit_for_review(
        submission: &CashUpSubmission,
        actor_id: Uuid,
        actor_name: &str,
        now: DateTime<Utc>,
        policy: LatenessPolicy,
    ) -> Result<SubmitAction, SubmissionError> {
        if submission.user_id != actor_id {
            return Err(SubmissionError::NotOwner);
        }

        if !submission.status.is_submittable() {
            return Err(SubmissionError::InvalidStateTransition {
                from: submission.status,
            });
        }

        let new_status = if submission.status == SubmissionStatus::NeedsChanges {
            SubmissionStatus::Resolved
        } else {
            SubmissionStatus::Pending
        };

        Ok(SubmitAction {
            new_status,
            is_late_submission: policy.is_late(submission.date, now.naive_utc()),
            submitted_at: now,
            submitted_by_id: actor_id,
            submitted_by_name: actor_name.to_string(),
        })
    }

    /// Status to force after an unbalanced reconciliation, or `None` when
    /// the current status is terminal and must be left alone.
    ///
    /// New evidence always outranks a stale verdict, so this is legal from
    /// every non-terminal status, including pending and resolved.
    #[must_use]
    pub fn force_needs_changes(current: SubmissionStatus) -> Option<SubmissionStatus> {
        if current.is_terminal() {
            None
        } else {
            Some(SubmissionStatus::NeedsChanges)
        }
    }

    /// Builds the system-attributed note recorded with an unbalanced
    /// reconciliation.
    #[must_use]
    pub fn mismatch_note(
        expected_net: Decimal,
        declared_total: Decimal,
        delta: Decimal,
        at: DateTime<Utc>,
    ) -> ReviewNote {
        ReviewNote {
            at,
            by_id: None,
            by_name: SYSTEM_AUTHOR.to_string(),
            text: format!(
                "Audit report does not balance: expected net {expected_net}, \
                 declared {declared_total}, delta {delta}. Sent back for changes."
            ),
        }
    }

    /// Validates and builds a reviewer note.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::EmptyNote` for blank text.
    pub fn reviewer_note(
        text: &str,
        reviewer_id: Uuid,
        reviewer_name: &str,
        at: DateTime<Utc>,
    ) -> Result<ReviewNote, SubmissionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SubmissionError::EmptyNote);
        }
        Ok(ReviewNote {
            at,
            by_id: Some(reviewer_id),
            by_name: reviewer_name.to_string(),
            text: text.to_string(),
        })
    }
}
