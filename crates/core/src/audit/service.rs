//! Audit ingestion orchestrator.
//!
//! Wires the workbook extractor, identity resolver, reconciliation
//! evaluator, and submission state machine together, behind repository
//! traits implemented by the db crate. Notification dispatch is attempted
//! only after the state mutation is durable and its failure is logged,
//! never propagated.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::error::AuditError;
use super::types::{
    Actor, AuditReport, BoundEvidenceOutcome, DetectedIdentity, EvidenceAction, NewAuditReport,
    NewNotification, StandaloneOutcome, SubmitOutcome, NOTIFICATION_BALANCE_MISMATCH,
};
use crate::identity::{self, UserRecord};
use crate::reconcile::{self, Reconciliation};
use crate::storage::{StorageService, StoredEvidence};
use crate::submission::{
    AuditSnapshot, CashUpSubmission, LatenessPolicy, ReviewNote, SubmissionStatus,
    SubmissionWorkflow, SubmitAction,
};
use crate::workbook::{self, Extraction, ExtractionMode};

/// Repository trait for cash-up submission persistence.
///
/// Implemented by the db crate. Each mutating method is a single atomic
/// document-level update; cross-document consistency is last-write-wins.
pub trait SubmissionRepository: Send + Sync {
    /// Find a submission by id.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<CashUpSubmission>, AuditError>> + Send;

    /// Find a submission by owner and business day.
    fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<CashUpSubmission>, AuditError>> + Send;

    /// Persist a submit-for-review transition.
    fn record_submit(
        &self,
        id: Uuid,
        action: SubmitAction,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;

    /// Store the denormalised reconciliation snapshot.
    fn store_snapshot(
        &self,
        id: Uuid,
        snapshot: AuditSnapshot,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;

    /// Force needs_changes and append a system note, atomically.
    fn send_back(
        &self,
        id: Uuid,
        note: ReviewNote,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;

    /// Append a reviewer note and stamp reviewed_at/by.
    fn append_review_note(
        &self,
        id: Uuid,
        note: ReviewNote,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;
}

/// Repository trait for standalone audit report rows.
pub trait AuditReportRepository: Send + Sync {
    /// Insert or replace the row for (user_id, date_key). Latest evidence
    /// wins; an existing row keeps its id.
    fn upsert(
        &self,
        input: NewAuditReport,
    ) -> impl std::future::Future<Output = Result<AuditReport, AuditError>> + Send;

    /// Find the pending report for (user_id, date_key).
    fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date_key: NaiveDate,
    ) -> impl std::future::Future<Output = Result<Option<AuditReport>, AuditError>> + Send;
}

/// Directory of active users used for identity resolution.
pub trait UserDirectory: Send + Sync {
    /// All active users eligible for evidence matching.
    fn active_users(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<UserRecord>, AuditError>> + Send;
}

/// Fire-and-forget notification sink.
pub trait NotificationSink: Send + Sync {
    /// Enqueue a notification for delivery.
    fn notify(
        &self,
        notification: NewNotification,
    ) -> impl std::future::Future<Output = Result<(), AuditError>> + Send;
}

/// Orchestrator for evidence ingestion, reconciliation, and review flow.
pub struct AuditService<S, A, U, N>
where
    S: SubmissionRepository,
    A: AuditReportRepository,
    U: UserDirectory,
    N: NotificationSink,
{
    storage: Arc<StorageService>,
    submissions: Arc<S>,
    reports: Arc<A>,
    users: Arc<U>,
    notifications: Arc<N>,
    policy: LatenessPolicy,
}

impl<S, A, U, N> AuditService<S, A, U, N>
where
    S: SubmissionRepository,
    A: AuditReportRepository,
    U: UserDirectory,
    N: NotificationSink,
{
    /// Create a new audit service.
    #[must_use]
    pub fn new(
        storage: Arc<StorageService>,
        submissions: Arc<S>,
        reports: Arc<A>,
        users: Arc<U>,
        notifications: Arc<N>,
        policy: LatenessPolicy,
    ) -> Self {
        Self {
            storage,
            submissions,
            reports,
            users,
            notifications,
            policy,
        }
    }

    /// Attach an evidence workbook to a specific submission.
    ///
    /// Extracts totals, reconciles against the declared total immediately,
    /// persists the snapshot, and sends the submission back for changes when
    /// the evidence does not balance and the status is not terminal.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for actors without the upload role,
    /// `SubmissionNotFound` for unknown ids, and extraction or storage
    /// errors from the underlying steps.
    pub async fn attach_bound_evidence(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<BoundEvidenceOutcome, AuditError> {
        if !actor.can_upload_evidence() {
            return Err(AuditError::Forbidden);
        }

        let submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or(AuditError::SubmissionNotFound(submission_id))?;

        let extraction = workbook::extract(&bytes, ExtractionMode::Linked)?;

        let stored = self
            .storage
            .store_evidence(
                submission.user_id,
                submission.date,
                Uuid::new_v4(),
                filename,
                content_type,
                bytes,
            )
            .await?;

        self.ingest_bound(actor, &submission, &extraction, &stored, now)
            .await
    }

    /// Upload a standalone evidence workbook, not bound to any submission.
    ///
    /// Resolves the printed employee name against the user directory and
    /// upserts the audit report for (user, date). Never touches a
    /// submission; reconciliation is deferred until the owner's next
    /// submit-for-review.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for actors without the upload role, identity
    /// errors from resolution, and a `Validation` error when the workbook
    /// carries no detectable report date.
    pub async fn upload_standalone(
        &self,
        actor: &Actor,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<StandaloneOutcome, AuditError> {
        if !actor.can_upload_evidence() {
            return Err(AuditError::Forbidden);
        }

        let extraction = workbook::extract(&bytes, ExtractionMode::Standalone)?;

        self.ingest_standalone(actor, &extraction, filename, content_type, bytes, now)
            .await
    }

    /// Submit a cash-up for review.
    ///
    /// Performs the owner/status-gated transition, then makes a best-effort
    /// pass over any pending standalone evidence for the owner and day:
    /// reconcile, snapshot, and on unbalanced send back with a system note
    /// and a notification. Failures in the deferred pass are logged and do
    /// not unwind the transition.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionNotFound` for unknown ids and the workflow's
    /// ownership and state-transition errors.
    pub async fn submit_for_review(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, AuditError> {
        let submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or(AuditError::SubmissionNotFound(submission_id))?;

        let action = SubmissionWorkflow::submit_for_review(
            &submission,
            actor.id,
            &actor.name,
            now,
            self.policy,
        )?;

        self.submissions
            .record_submit(submission_id, action.clone())
            .await?;

        let mut status = action.new_status;
        match self.reconcile_deferred(&submission, now).await {
            Ok(Some(forced)) => status = forced,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(
                    submission_id = %submission_id,
                    error = %err,
                    "deferred reconciliation failed; submission left as submitted"
                );
            }
        }

        Ok(SubmitOutcome {
            submission_id,
            status,
            is_late_submission: action.is_late_submission,
        })
    }

    /// Append a reviewer note to a submission. No status change.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for actors without the reviewer role,
    /// `SubmissionNotFound` for unknown ids, and a validation error for
    /// blank notes.
    pub async fn add_review_note(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewNote, AuditError> {
        if !actor.can_review() {
            return Err(AuditError::Forbidden);
        }

        if self.submissions.find_by_id(submission_id).await?.is_none() {
            return Err(AuditError::SubmissionNotFound(submission_id));
        }

        let note = SubmissionWorkflow::reviewer_note(text, actor.id, &actor.name, now)?;
        self.submissions
            .append_review_note(submission_id, note.clone())
            .await?;
        Ok(note)
    }

    // ------------------------------------------------------------------
    // Ingestion steps past extraction. Split out so the reconciliation
    // and state-machine wiring is testable without workbook bytes.
    // ------------------------------------------------------------------

    async fn ingest_bound(
        &self,
        actor: &Actor,
        submission: &CashUpSubmission,
        extraction: &Extraction,
        stored: &StoredEvidence,
        now: DateTime<Utc>,
    ) -> Result<BoundEvidenceOutcome, AuditError> {
        let rec = reconcile::evaluate(extraction.net_total, submission.total_amount);

        let snapshot = AuditSnapshot {
            file_url: stored.file_url.clone(),
            file_name: stored.file_name.clone(),
            income_total: extraction.income_total,
            expense_total: extraction.expense_total,
            net_total: extraction.net_total,
            cashup_total: rec.cashup_total,
            delta: rec.delta,
            balanced: rec.balanced,
            uploaded_at: now,
            uploaded_by_id: actor.id,
            uploaded_by_name: actor.name.clone(),
        };
        self.submissions
            .store_snapshot(submission.id, snapshot)
            .await?;

        let action = if !rec.balanced
            && SubmissionWorkflow::force_needs_changes(submission.status).is_some()
        {
            self.send_back_unbalanced(submission, &rec, Some(actor.id), now)
                .await?;
            EvidenceAction::SentBack
        } else {
            EvidenceAction::Stored
        };

        Ok(BoundEvidenceOutcome {
            action,
            balanced: rec.balanced,
            income_total: extraction.income_total,
            expense_total: extraction.expense_total,
            net_total: extraction.net_total,
            cashup_total: rec.cashup_total,
            delta: rec.delta,
            rows_parsed: extraction.rows_parsed,
            file_url: stored.file_url.clone(),
            file_name: stored.file_name.clone(),
        })
    }

    async fn ingest_standalone(
        &self,
        actor: &Actor,
        extraction: &Extraction,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<StandaloneOutcome, AuditError> {
        let metadata = extraction.metadata.clone().unwrap_or_default();
        let detected_name = metadata.employee_name.clone().unwrap_or_default();

        let directory = self.users.active_users().await?;
        let user = identity::resolve(&detected_name, &directory)?;

        let date_key = metadata
            .from_date_key
            .ok_or_else(|| AuditError::validation("could not detect a report date"))?;

        let report_id = Uuid::new_v4();
        let stored = self
            .storage
            .store_evidence(user.id, date_key, report_id, filename, content_type, bytes)
            .await?;

        let audit = self
            .reports
            .upsert(NewAuditReport {
                id: report_id,
                user_id: user.id,
                date_key,
                employee_name_from_report: detected_name.clone(),
                report_from_date_key: metadata.from_date_key,
                report_to_date_key: metadata.to_date_key,
                file_url: stored.file_url,
                file_name: stored.file_name,
                income_total: extraction.income_total,
                expense_total: extraction.expense_total,
                net_total: extraction.net_total,
                uploaded_by_id: actor.id,
                uploaded_by_name: actor.name.clone(),
                uploaded_at: now,
            })
            .await?;

        Ok(StandaloneOutcome {
            detected: DetectedIdentity {
                employee_name: detected_name,
                user_id: user.id,
                display_name: user.display_name.clone(),
                from_date_key: metadata.from_date_key,
                to_date_key: metadata.to_date_key,
            },
            audit,
        })
    }

    /// Reconcile pending standalone evidence after a submit. Returns the
    /// forced status when the evidence does not balance.
    async fn reconcile_deferred(
        &self,
        submission: &CashUpSubmission,
        now: DateTime<Utc>,
    ) -> Result<Option<SubmissionStatus>, AuditError> {
        let Some(report) = self
            .reports
            .find_by_user_and_date(submission.user_id, submission.date)
            .await?
        else {
            return Ok(None);
        };

        let rec = reconcile::evaluate(report.net_total, submission.total_amount);

        let snapshot = AuditSnapshot {
            file_url: report.file_url.clone(),
            file_name: report.file_name.clone(),
            income_total: report.income_total,
            expense_total: report.expense_total,
            net_total: report.net_total,
            cashup_total: rec.cashup_total,
            delta: rec.delta,
            balanced: rec.balanced,
            uploaded_at: report.uploaded_at,
            uploaded_by_id: report.uploaded_by_id,
            uploaded_by_name: report.uploaded_by_name.clone(),
        };
        self.submissions
            .store_snapshot(submission.id, snapshot)
            .await?;

        if rec.balanced {
            return Ok(None);
        }

        self.send_back_unbalanced(submission, &rec, None, now)
            .await?;
        Ok(Some(SubmissionStatus::NeedsChanges))
    }

    /// Force needs_changes with a system note, then attempt a notification
    /// to the owner. The notification failure is logged and swallowed.
    async fn send_back_unbalanced(
        &self,
        submission: &CashUpSubmission,
        rec: &Reconciliation,
        actor_user_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), AuditError> {
        let note =
            SubmissionWorkflow::mismatch_note(rec.net_total, rec.cashup_total, rec.delta, now);
        self.submissions.send_back(submission.id, note).await?;

        let notification = NewNotification {
            recipient_user_id: submission.user_id,
            actor_user_id,
            kind: NOTIFICATION_BALANCE_MISMATCH.to_string(),
            title: "Cash-up does not balance".to_string(),
            message: format!(
                "Audit evidence for {} shows net {} against declared {} (delta {}). \
                 The submission was sent back for changes.",
                submission.date.format("%Y-%m-%d"),
                rec.net_total,
                rec.cashup_total,
                rec.delta
            ),
            link: Some(format!("/cashups/{}", submission.id)),
            data: serde_json::json!({
                "submission_id": submission.id,
                "date": submission.date,
                "net_total": rec.net_total,
                "cashup_total": rec.cashup_total,
                "delta": rec.delta,
            }),
        };
        if let Err(err) = self.notifications.notify(notification).await {
            tracing::warn!(
                submission_id = %submission.id,
                error = %err,
                "notification dispatch failed after send-back"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageProvider};
    use crate::submission::SubmissionError;
    use crate::workbook::ReportMetadata;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tillbook_shared::Role;

    struct MockSubmissionRepository {
        submissions: Mutex<HashMap<Uuid, CashUpSubmission>>,
    }

    impl MockSubmissionRepository {
        fn new() -> Self {
            Self {
                submissions: Mutex::new(HashMap::new()),
            }
        }

        fn insert(&self, submission: CashUpSubmission) {
            self.submissions
                .lock()
                .unwrap()
                .insert(submission.id, submission);
        }

        fn get(&self, id: Uuid) -> CashUpSubmission {
            self.submissions.lock().unwrap().get(&id).cloned().unwrap()
        }
    }

    impl SubmissionRepository for MockSubmissionRepository {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<CashUpSubmission>, AuditError> {
            Ok(self.submissions.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_user_and_date(
            &self,
            user_id: Uuid,
            date: NaiveDate,
        ) -> Result<Option<CashUpSubmission>, AuditError> {
            Ok(self
                .submissions
                .lock()
                .unwrap()
                .values()
                .find(|s| s.user_id == user_id && s.date == date)
                .cloned())
        }

        async fn record_submit(&self, id: Uuid, action: SubmitAction) -> Result<(), AuditError> {
            let mut map = self.submissions.lock().unwrap();
            let sub = map
                .get_mut(&id)
                .ok_or(AuditError::SubmissionNotFound(id))?;
            sub.status = action.new_status;
            sub.is_late_submission = Some(action.is_late_submission);
            sub.submitted_at = Some(action.submitted_at);
            sub.submitted_by_id = Some(action.submitted_by_id);
            sub.submitted_by_name = Some(action.submitted_by_name);
            Ok(())
        }

        async fn store_snapshot(
            &self,
            id: Uuid,
            snapshot: AuditSnapshot,
        ) -> Result<(), AuditError> {
            let mut map = self.submissions.lock().unwrap();
            let sub = map
                .get_mut(&id)
                .ok_or(AuditError::SubmissionNotFound(id))?;
            sub.audit_report = Some(snapshot);
            Ok(())
        }

        async fn send_back(&self, id: Uuid, note: ReviewNote) -> Result<(), AuditError> {
            let mut map = self.submissions.lock().unwrap();
            let sub = map
                .get_mut(&id)
                .ok_or(AuditError::SubmissionNotFound(id))?;
            sub.status = SubmissionStatus::NeedsChanges;
            sub.review_notes.push(note);
            Ok(())
        }

        async fn append_review_note(&self, id: Uuid, note: ReviewNote) -> Result<(), AuditError> {
            let mut map = self.submissions.lock().unwrap();
            let sub = map
                .get_mut(&id)
                .ok_or(AuditError::SubmissionNotFound(id))?;
            sub.reviewed_at = Some(note.at);
            sub.reviewed_by_id = note.by_id;
            sub.reviewed_by_name = Some(note.by_name.clone());
            sub.review_notes.push(note);
            Ok(())
        }
    }

    struct MockAuditReportRepository {
        rows: Mutex<HashMap<(Uuid, NaiveDate), AuditReport>>,
    }

    impl MockAuditReportRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
            }
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl AuditReportRepository for MockAuditReportRepository {
        async fn upsert(&self, input: NewAuditReport) -> Result<AuditReport, AuditError> {
            let mut rows = self.rows.lock().unwrap();
            let key = (input.user_id, input.date_key);
            let id = rows.get(&key).map_or(input.id, |existing| existing.id);
            let report = AuditReport {
                id,
                user_id: input.user_id,
                date_key: input.date_key,
                employee_name_from_report: input.employee_name_from_report,
                report_from_date_key: input.report_from_date_key,
                report_to_date_key: input.report_to_date_key,
                file_url: input.file_url,
                file_name: input.file_name,
                income_total: input.income_total,
                expense_total: input.expense_total,
                net_total: input.net_total,
                uploaded_by_id: input.uploaded_by_id,
                uploaded_by_name: input.uploaded_by_name,
                uploaded_at: input.uploaded_at,
            };
            rows.insert(key, report.clone());
            Ok(report)
        }

        async fn find_by_user_and_date(
            &self,
            user_id: Uuid,
            date_key: NaiveDate,
        ) -> Result<Option<AuditReport>, AuditError> {
            Ok(self.rows.lock().unwrap().get(&(user_id, date_key)).cloned())
        }
    }

    struct MockUserDirectory {
        users: Vec<UserRecord>,
    }

    impl UserDirectory for MockUserDirectory {
        async fn active_users(&self) -> Result<Vec<UserRecord>, AuditError> {
            Ok(self.users.clone())
        }
    }

    struct MockNotificationSink {
        sent: Mutex<Vec<NewNotification>>,
        fail: bool,
    }

    impl MockNotificationSink {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl NotificationSink for MockNotificationSink {
        async fn notify(&self, notification: NewNotification) -> Result<(), AuditError> {
            if self.fail {
                return Err(AuditError::Notification("sink unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(notification);
            Ok(())
        }
    }

    struct Harness {
        service: AuditService<
            MockSubmissionRepository,
            MockAuditReportRepository,
            MockUserDirectory,
            MockNotificationSink,
        >,
        submissions: Arc<MockSubmissionRepository>,
        reports: Arc<MockAuditReportRepository>,
        notifications: Arc<MockNotificationSink>,
    }

    fn harness_with(users: Vec<UserRecord>, sink: MockNotificationSink) -> Harness {
        let root = std::env::temp_dir().join(format!("tillbook-audit-test-{}", Uuid::new_v4()));
        let storage = Arc::new(
            StorageService::from_config(StorageConfig::new(
                StorageProvider::local_fs(root),
                "http://localhost:3000/files",
            ))
            .unwrap(),
        );
        let submissions = Arc::new(MockSubmissionRepository::new());
        let reports = Arc::new(MockAuditReportRepository::new());
        let notifications = Arc::new(sink);
        let service = AuditService::new(
            storage,
            Arc::clone(&submissions),
            Arc::clone(&reports),
            Arc::new(MockUserDirectory { users }),
            Arc::clone(&notifications),
            LatenessPolicy::default(),
        );
        Harness {
            service,
            submissions,
            reports,
            notifications,
        }
    }

    fn harness() -> Harness {
        harness_with(Vec::new(), MockNotificationSink::new())
    }

    fn reviewer() -> Actor {
        Actor {
            id: Uuid::new_v4(),
            name: "Thandi Nkosi".to_string(),
            roles: vec![Role::CashupReviewer],
        }
    }

    fn cashier(id: Uuid, name: &str) -> Actor {
        Actor {
            id,
            name: name.to_string(),
            roles: vec![Role::Cashier],
        }
    }

    fn submission(
        owner: Uuid,
        status: SubmissionStatus,
        total: Option<Decimal>,
    ) -> CashUpSubmission {
        CashUpSubmission {
            id: Uuid::new_v4(),
            user_id: owner,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            total_amount: total,
            status,
            is_late_submission: None,
            submitted_at: None,
            submitted_by_id: None,
            submitted_by_name: None,
            reviewed_at: None,
            reviewed_by_id: None,
            reviewed_by_name: None,
            review_notes: Vec::new(),
            audit_report: None,
        }
    }

    fn extraction(income: Decimal, expense: Decimal, metadata: Option<ReportMetadata>) -> Extraction {
        Extraction {
            income_total: income,
            expense_total: expense,
            net_total: income - expense,
            sheet_name: "Sheet1".to_string(),
            rows_parsed: 4,
            metadata,
        }
    }

    fn stored() -> StoredEvidence {
        StoredEvidence {
            storage_key: "cashups/x/2025-03-14/y/cashup.xlsx".to_string(),
            file_url: "http://localhost:3000/files/cashups/x/2025-03-14/y/cashup.xlsx".to_string(),
            file_name: "cashup.xlsx".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bound_balanced_evidence_is_stored_without_send_back() {
        let h = harness();
        let sub = submission(Uuid::new_v4(), SubmissionStatus::Pending, Some(dec!(120)));
        h.submissions.insert(sub.clone());

        let outcome = h
            .service
            .ingest_bound(
                &reviewer(),
                &sub,
                &extraction(dec!(150), dec!(30), None),
                &stored(),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.action, EvidenceAction::Stored);
        assert!(outcome.balanced);
        assert_eq!(outcome.net_total, dec!(120));
        assert_eq!(outcome.delta, dec!(0));

        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Pending);
        assert!(after.review_notes.is_empty());
        assert!(after.audit_report.is_some());
        assert_eq!(h.notifications.count(), 0);
    }

    #[tokio::test]
    async fn test_bound_unbalanced_evidence_sends_back_with_note_and_notification() {
        let h = harness();
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::Pending, Some(dec!(119.50)));
        h.submissions.insert(sub.clone());

        let outcome = h
            .service
            .ingest_bound(
                &reviewer(),
                &sub,
                &extraction(dec!(150), dec!(30), None),
                &stored(),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.action, EvidenceAction::SentBack);
        assert!(!outcome.balanced);
        assert_eq!(outcome.delta, dec!(0.50));

        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::NeedsChanges);
        assert_eq!(after.review_notes.len(), 1);
        assert_eq!(after.review_notes[0].by_name, "System");
        assert_eq!(after.review_notes[0].by_id, None);
        assert_eq!(h.notifications.count(), 1);
        let sent = h.notifications.sent.lock().unwrap();
        assert_eq!(sent[0].recipient_user_id, owner);
        assert_eq!(sent[0].kind, NOTIFICATION_BALANCE_MISMATCH);
    }

    #[tokio::test]
    async fn test_bound_unbalanced_leaves_approved_submission_alone() {
        let h = harness();
        let sub = submission(Uuid::new_v4(), SubmissionStatus::Approved, Some(dec!(100)));
        h.submissions.insert(sub.clone());

        let outcome = h
            .service
            .ingest_bound(
                &reviewer(),
                &sub,
                &extraction(dec!(150), dec!(30), None),
                &stored(),
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.action, EvidenceAction::Stored);
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Approved);
        assert!(after.audit_report.is_some());
        assert_eq!(h.notifications.count(), 0);
    }

    #[tokio::test]
    async fn test_bound_upload_requires_role() {
        let h = harness();
        let actor = cashier(Uuid::new_v4(), "John Smith");
        let err = h
            .service
            .attach_bound_evidence(
                &actor,
                Uuid::new_v4(),
                "cashup.xlsx",
                "application/octet-stream",
                vec![1, 2, 3],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Forbidden));
    }

    #[tokio::test]
    async fn test_bound_upload_unknown_submission() {
        let h = harness();
        let missing = Uuid::new_v4();
        let err = h
            .service
            .attach_bound_evidence(
                &reviewer(),
                missing,
                "cashup.xlsx",
                "application/octet-stream",
                vec![1, 2, 3],
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::SubmissionNotFound(id) if id == missing));
    }

    fn standalone_metadata(name: &str) -> ReportMetadata {
        ReportMetadata {
            employee_name: Some(name.to_string()),
            from_date_key: NaiveDate::from_ymd_opt(2025, 3, 14),
            to_date_key: NaiveDate::from_ymd_opt(2025, 3, 14),
        }
    }

    #[tokio::test]
    async fn test_standalone_upsert_replaces_prior_row() {
        let john = UserRecord {
            id: Uuid::new_v4(),
            display_name: "John Smith".to_string(),
        };
        let h = harness_with(vec![john.clone()], MockNotificationSink::new());
        let actor = reviewer();

        let first = h
            .service
            .ingest_standalone(
                &actor,
                &extraction(dec!(100), dec!(20), Some(standalone_metadata("John Smith"))),
                "first.xlsx",
                "application/octet-stream",
                vec![1],
                Utc::now(),
            )
            .await
            .unwrap();

        let second = h
            .service
            .ingest_standalone(
                &actor,
                &extraction(dec!(150), dec!(30), Some(standalone_metadata("John Smith"))),
                "second.xlsx",
                "application/octet-stream",
                vec![2],
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(h.reports.len(), 1);
        assert_eq!(second.audit.id, first.audit.id);
        assert_eq!(second.audit.net_total, dec!(120));
        assert_eq!(second.audit.file_name, "second.xlsx");
        assert_eq!(second.detected.user_id, john.id);
    }

    #[tokio::test]
    async fn test_standalone_ambiguous_identity_writes_nothing() {
        let users = vec![
            UserRecord {
                id: Uuid::new_v4(),
                display_name: "John Smith".to_string(),
            },
            UserRecord {
                id: Uuid::new_v4(),
                display_name: "Jane Doe".to_string(),
            },
        ];
        let h = harness_with(users, MockNotificationSink::new());

        let err = h
            .service
            .ingest_standalone(
                &reviewer(),
                &extraction(
                    dec!(100),
                    dec!(20),
                    Some(standalone_metadata("J. Smith-Doe")),
                ),
                "cashup.xlsx",
                "application/octet-stream",
                vec![1],
                Utc::now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuditError::Identity(crate::identity::IdentityError::AmbiguousOrNoIdentity {
                matches: 2,
                ..
            })
        ));
        assert_eq!(h.reports.len(), 0);
    }

    #[tokio::test]
    async fn test_standalone_without_date_fails_validation() {
        let john = UserRecord {
            id: Uuid::new_v4(),
            display_name: "John Smith".to_string(),
        };
        let h = harness_with(vec![john], MockNotificationSink::new());

        let metadata = ReportMetadata {
            employee_name: Some("John Smith".to_string()),
            from_date_key: None,
            to_date_key: None,
        };
        let err = h
            .service
            .ingest_standalone(
                &reviewer(),
                &extraction(dec!(100), dec!(20), Some(metadata)),
                "cashup.xlsx",
                "application/octet-stream",
                vec![1],
                Utc::now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AuditError::Validation(_)));
        assert_eq!(h.reports.len(), 0);
    }

    fn on_time(date: NaiveDate) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(date.and_hms_opt(18, 0, 0).unwrap(), Utc)
    }

    #[tokio::test]
    async fn test_submit_without_pending_evidence() {
        let h = harness();
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::Draft, Some(dec!(120)));
        let date = sub.date;
        h.submissions.insert(sub.clone());

        let outcome = h
            .service
            .submit_for_review(&cashier(owner, "John Smith"), sub.id, on_time(date))
            .await
            .unwrap();

        assert_eq!(outcome.status, SubmissionStatus::Pending);
        assert!(!outcome.is_late_submission);
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Pending);
        assert_eq!(after.submitted_by_name.as_deref(), Some("John Smith"));
        assert!(after.audit_report.is_none());
    }

    async fn seed_deferred_report(h: &Harness, owner: Uuid, date: NaiveDate, net: Decimal) {
        h.reports
            .upsert(NewAuditReport {
                id: Uuid::new_v4(),
                user_id: owner,
                date_key: date,
                employee_name_from_report: "John Smith".to_string(),
                report_from_date_key: Some(date),
                report_to_date_key: Some(date),
                file_url: "http://localhost:3000/files/x".to_string(),
                file_name: "cashup.xlsx".to_string(),
                income_total: net + dec!(30),
                expense_total: dec!(30),
                net_total: net,
                uploaded_by_id: Uuid::new_v4(),
                uploaded_by_name: "Thandi Nkosi".to_string(),
                uploaded_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_reconciles_deferred_unbalanced_evidence() {
        let h = harness();
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::Draft, Some(dec!(119.50)));
        let date = sub.date;
        h.submissions.insert(sub.clone());
        seed_deferred_report(&h, owner, date, dec!(120)).await;

        let outcome = h
            .service
            .submit_for_review(&cashier(owner, "John Smith"), sub.id, on_time(date))
            .await
            .unwrap();

        assert_eq!(outcome.status, SubmissionStatus::NeedsChanges);
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::NeedsChanges);
        assert_eq!(after.review_notes.len(), 1);
        assert_eq!(after.review_notes[0].by_name, "System");
        let snapshot = after.audit_report.unwrap();
        assert_eq!(snapshot.delta, dec!(0.50));
        assert!(!snapshot.balanced);
        assert_eq!(h.notifications.count(), 1);
    }

    #[tokio::test]
    async fn test_submit_reconciles_deferred_balanced_evidence() {
        let h = harness();
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::NeedsChanges, Some(dec!(120)));
        let date = sub.date;
        h.submissions.insert(sub.clone());
        seed_deferred_report(&h, owner, date, dec!(120)).await;

        let outcome = h
            .service
            .submit_for_review(&cashier(owner, "John Smith"), sub.id, on_time(date))
            .await
            .unwrap();

        assert_eq!(outcome.status, SubmissionStatus::Resolved);
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Resolved);
        assert!(after.review_notes.is_empty());
        assert!(after.audit_report.unwrap().balanced);
        assert_eq!(h.notifications.count(), 0);
    }

    #[tokio::test]
    async fn test_submit_survives_notification_failure() {
        let h = harness_with(Vec::new(), MockNotificationSink::failing());
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::Draft, Some(dec!(119.50)));
        let date = sub.date;
        h.submissions.insert(sub.clone());
        seed_deferred_report(&h, owner, date, dec!(120)).await;

        let outcome = h
            .service
            .submit_for_review(&cashier(owner, "John Smith"), sub.id, on_time(date))
            .await
            .unwrap();

        assert_eq!(outcome.status, SubmissionStatus::NeedsChanges);
        assert_eq!(h.submissions.get(sub.id).status, SubmissionStatus::NeedsChanges);
    }

    #[tokio::test]
    async fn test_submit_illegal_transition_leaves_submission_untouched() {
        let h = harness();
        let owner = Uuid::new_v4();
        let sub = submission(owner, SubmissionStatus::Pending, Some(dec!(120)));
        let date = sub.date;
        h.submissions.insert(sub.clone());

        let err = h
            .service
            .submit_for_review(&cashier(owner, "John Smith"), sub.id, on_time(date))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuditError::Submission(SubmissionError::InvalidStateTransition {
                from: SubmissionStatus::Pending
            })
        ));
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Pending);
        assert!(after.submitted_at.is_none());
    }

    #[tokio::test]
    async fn test_add_review_note_requires_reviewer_role() {
        let h = harness();
        let actor = cashier(Uuid::new_v4(), "John Smith");
        let err = h
            .service
            .add_review_note(&actor, Uuid::new_v4(), "please recount", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuditError::Forbidden));
    }

    #[tokio::test]
    async fn test_add_review_note_appends_and_stamps() {
        let h = harness();
        let sub = submission(Uuid::new_v4(), SubmissionStatus::Pending, Some(dec!(120)));
        h.submissions.insert(sub.clone());
        let actor = reviewer();

        let note = h
            .service
            .add_review_note(&actor, sub.id, "float was short on Friday", Utc::now())
            .await
            .unwrap();

        assert_eq!(note.by_id, Some(actor.id));
        let after = h.submissions.get(sub.id);
        assert_eq!(after.status, SubmissionStatus::Pending);
        assert_eq!(after.review_notes.len(), 1);
        assert_eq!(after.reviewed_by_name.as_deref(), Some("Thandi Nkosi"));
    }
}
