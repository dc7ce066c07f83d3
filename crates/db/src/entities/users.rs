//! `SeaORM` Entity for the users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,
    /// JSON array of role strings.
    pub roles: Json,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_up_submissions::Entity")]
    CashUpSubmissions,
    #[sea_orm(has_many = "super::audit_reports::Entity")]
    AuditReports,
}

impl Related<super::cash_up_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashUpSubmissions.def()
    }
}

impl Related<super::audit_reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
