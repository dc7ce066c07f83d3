//! Cash-up submissions and audit reports.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(CASHUPS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS audit_reports CASCADE;
             DROP TABLE IF EXISTS cash_up_submissions CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const CASHUPS_SQL: &str = r"
CREATE TABLE cash_up_submissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date DATE NOT NULL,
    total_amount NUMERIC(14, 2),
    status VARCHAR(20) NOT NULL DEFAULT 'draft',
    is_late_submission BOOLEAN,
    submitted_at TIMESTAMPTZ,
    submitted_by_id UUID,
    submitted_by_name VARCHAR(255),
    reviewed_at TIMESTAMPTZ,
    reviewed_by_id UUID,
    reviewed_by_name VARCHAR(255),
    review_notes JSONB NOT NULL DEFAULT '[]'::jsonb,
    audit_report JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_status CHECK (
        status IN ('draft', 'pending', 'needs_changes', 'resolved', 'approved')
    )
);

-- Lookup used by deferred reconciliation at submit time
CREATE INDEX idx_cashups_user_date ON cash_up_submissions(user_id, date);
CREATE INDEX idx_cashups_status ON cash_up_submissions(status);

CREATE TABLE audit_reports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    date_key DATE NOT NULL,
    employee_name_from_report VARCHAR(255) NOT NULL,
    report_from_date_key DATE,
    report_to_date_key DATE,
    file_url TEXT NOT NULL,
    file_name VARCHAR(255) NOT NULL,
    income_total NUMERIC(14, 2) NOT NULL,
    expense_total NUMERIC(14, 2) NOT NULL,
    net_total NUMERIC(14, 2) NOT NULL,
    uploaded_by_id UUID NOT NULL,
    uploaded_by_name VARCHAR(255) NOT NULL,
    uploaded_at TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- Latest evidence wins: upsert target for standalone uploads
    CONSTRAINT uq_audit_reports_user_date UNIQUE (user_id, date_key)
);
";
