//! Cash-up submission repository.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entities::cash_up_submissions;
use tillbook_core::audit::{AuditError, SubmissionRepository as SubmissionRepoTrait};
use tillbook_core::submission::{
    AuditSnapshot, CashUpSubmission, ReviewNote, SubmissionStatus, SubmitAction,
};

/// Submission repository implementation.
#[derive(Debug, Clone)]
pub struct SubmissionRepository {
    db: DatabaseConnection,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(
        &self,
        id: Uuid,
    ) -> Result<cash_up_submissions::Model, AuditError> {
        cash_up_submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?
            .ok_or(AuditError::SubmissionNotFound(id))
    }
}

impl SubmissionRepoTrait for SubmissionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CashUpSubmission>, AuditError> {
        let model = cash_up_submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<CashUpSubmission>, AuditError> {
        let model = cash_up_submissions::Entity::find()
            .filter(cash_up_submissions::Column::UserId.eq(user_id))
            .filter(cash_up_submissions::Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn record_submit(&self, id: Uuid, action: SubmitAction) -> Result<(), AuditError> {
        let model = self.fetch(id).await?;
        let mut active = model.into_active_model();
        active.status = Set(action.new_status.as_str().to_string());
        active.is_late_submission = Set(Some(action.is_late_submission));
        active.submitted_at = Set(Some(action.submitted_at.into()));
        active.submitted_by_id = Set(Some(action.submitted_by_id));
        active.submitted_by_name = Set(Some(action.submitted_by_name));
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;
        Ok(())
    }

    async fn store_snapshot(&self, id: Uuid, snapshot: AuditSnapshot) -> Result<(), AuditError> {
        let model = self.fetch(id).await?;
        let snapshot_json = serde_json::to_value(&snapshot)
            .map_err(|e| AuditError::repository(e.to_string()))?;
        let mut active = model.into_active_model();
        active.audit_report = Set(Some(snapshot_json));
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;
        Ok(())
    }

    async fn send_back(&self, id: Uuid, note: ReviewNote) -> Result<(), AuditError> {
        let model = self.fetch(id).await?;
        let notes = append_note(&model.review_notes, &note)?;
        let mut active = model.into_active_model();
        active.status = Set(SubmissionStatus::NeedsChanges.as_str().to_string());
        active.review_notes = Set(notes);
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;
        Ok(())
    }

    async fn append_review_note(&self, id: Uuid, note: ReviewNote) -> Result<(), AuditError> {
        let model = self.fetch(id).await?;
        let notes = append_note(&model.review_notes, &note)?;
        let mut active = model.into_active_model();
        active.review_notes = Set(notes);
        active.reviewed_at = Set(Some(note.at.into()));
        active.reviewed_by_id = Set(note.by_id);
        active.reviewed_by_name = Set(Some(note.by_name));
        active.updated_at = Set(Utc::now().into());
        active
            .update(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;
        Ok(())
    }
}

fn append_note(
    existing: &serde_json::Value,
    note: &ReviewNote,
) -> Result<serde_json::Value, AuditError> {
    let mut notes: Vec<ReviewNote> = serde_json::from_value(existing.clone())
        .map_err(|e| AuditError::repository(format!("corrupt review_notes: {e}")))?;
    notes.push(note.clone());
    serde_json::to_value(&notes).map_err(|e| AuditError::repository(e.to_string()))
}

/// Convert a database row to the domain type.
fn to_domain(model: cash_up_submissions::Model) -> Result<CashUpSubmission, AuditError> {
    let status = SubmissionStatus::parse(&model.status)
        .ok_or_else(|| AuditError::repository(format!("unknown status '{}'", model.status)))?;
    let review_notes: Vec<ReviewNote> = serde_json::from_value(model.review_notes)
        .map_err(|e| AuditError::repository(format!("corrupt review_notes: {e}")))?;
    let audit_report: Option<AuditSnapshot> = model
        .audit_report
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| AuditError::repository(format!("corrupt audit_report: {e}")))?;

    Ok(CashUpSubmission {
        id: model.id,
        user_id: model.user_id,
        date: model.date,
        total_amount: model.total_amount,
        status,
        is_late_submission: model.is_late_submission,
        submitted_at: model.submitted_at.map(|t| t.with_timezone(&Utc)),
        submitted_by_id: model.submitted_by_id,
        submitted_by_name: model.submitted_by_name,
        reviewed_at: model.reviewed_at.map(|t| t.with_timezone(&Utc)),
        reviewed_by_id: model.reviewed_by_id,
        reviewed_by_name: model.reviewed_by_name,
        review_notes,
        audit_report,
    })
}
