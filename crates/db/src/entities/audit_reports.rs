//! `SeaORM` Entity for the audit_reports table.
//!
//! Rows are unique on (user_id, date_key); a second standalone upload for
//! the same employee and day replaces the first.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_key: Date,
    pub employee_name_from_report: String,
    pub report_from_date_key: Option<Date>,
    pub report_to_date_key: Option<Date>,
    pub file_url: String,
    pub file_name: String,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub income_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub expense_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net_total: Decimal,
    pub uploaded_by_id: Uuid,
    pub uploaded_by_name: String,
    pub uploaded_at: DateTimeWithTimeZone,
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
