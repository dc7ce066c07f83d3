//! `SeaORM` Entity for the cash_up_submissions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_up_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub total_amount: Option<Decimal>,
    pub status: String,
    pub is_late_submission: Option<bool>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    pub submitted_by_id: Option<Uuid>,
    pub submitted_by_name: Option<String>,
    pub reviewed_at: Option<DateTimeWithTimeZone>,
    pub reviewed_by_id: Option<Uuid>,
    pub reviewed_by_name: Option<String>,
    /// Append-only JSON array of timestamped, attributed notes.
    pub review_notes: Json,
    /// Denormalised reconciliation snapshot, latest evidence wins.
    pub audit_report: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
