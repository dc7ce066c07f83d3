//! Standalone audit report repository.
//!
//! The (user_id, date_key) unique key and `ON CONFLICT DO UPDATE` make the
//! upsert atomic at the storage layer; latest evidence always wins.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::audit_reports;
use tillbook_core::audit::{
    AuditError, AuditReport, AuditReportRepository as AuditReportRepoTrait, NewAuditReport,
};

/// Audit report repository implementation.
#[derive(Debug, Clone)]
pub struct AuditReportRepository {
    db: DatabaseConnection,
}

impl AuditReportRepository {
    /// Create a new audit report repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl AuditReportRepoTrait for AuditReportRepository {
    async fn upsert(&self, input: NewAuditReport) -> Result<AuditReport, AuditError> {
        let now = Utc::now();
        let active = audit_reports::ActiveModel {
            id: Set(input.id),
            user_id: Set(input.user_id),
            date_key: Set(input.date_key),
            employee_name_from_report: Set(input.employee_name_from_report),
            report_from_date_key: Set(input.report_from_date_key),
            report_to_date_key: Set(input.report_to_date_key),
            file_url: Set(input.file_url),
            file_name: Set(input.file_name),
            income_total: Set(input.income_total),
            expense_total: Set(input.expense_total),
            net_total: Set(input.net_total),
            uploaded_by_id: Set(input.uploaded_by_id),
            uploaded_by_name: Set(input.uploaded_by_name),
            uploaded_at: Set(input.uploaded_at.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        // An existing row for the key keeps its id and created_at.
        let on_conflict = OnConflict::columns([
            audit_reports::Column::UserId,
            audit_reports::Column::DateKey,
        ])
        .update_columns([
            audit_reports::Column::EmployeeNameFromReport,
            audit_reports::Column::ReportFromDateKey,
            audit_reports::Column::ReportToDateKey,
            audit_reports::Column::FileUrl,
            audit_reports::Column::FileName,
            audit_reports::Column::IncomeTotal,
            audit_reports::Column::ExpenseTotal,
            audit_reports::Column::NetTotal,
            audit_reports::Column::UploadedById,
            audit_reports::Column::UploadedByName,
            audit_reports::Column::UploadedAt,
            audit_reports::Column::UpdatedAt,
        ])
        .to_owned();

        let user_id = input.user_id;
        let date_key = input.date_key;

        audit_reports::Entity::insert(active)
            .on_conflict(on_conflict)
            .exec(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;

        self.find_by_user_and_date(user_id, date_key)
            .await?
            .ok_or_else(|| AuditError::repository("upserted audit report row not found"))
    }

    async fn find_by_user_and_date(
        &self,
        user_id: Uuid,
        date_key: NaiveDate,
    ) -> Result<Option<AuditReport>, AuditError> {
        let model = audit_reports::Entity::find()
            .filter(audit_reports::Column::UserId.eq(user_id))
            .filter(audit_reports::Column::DateKey.eq(date_key))
            .one(&self.db)
            .await
            .map_err(|e| AuditError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }
}

fn to_domain(model: audit_reports::Model) -> AuditReport {
    AuditReport {
        id: model.id,
        user_id: model.user_id,
        date_key: model.date_key,
        employee_name_from_report: model.employee_name_from_report,
        report_from_date_key: model.report_from_date_key,
        report_to_date_key: model.report_to_date_key,
        file_url: model.file_url,
        file_name: model.file_name,
        income_total: model.income_total,
        expense_total: model.expense_total,
        net_total: model.net_total,
        uploaded_by_id: model.uploaded_by_id,
        uploaded_by_name: model.uploaded_by_name,
        uploaded_at: model.uploaded_at.with_timezone(&Utc),
    }
}
