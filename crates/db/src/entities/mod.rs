//! `SeaORM` entity definitions.

pub mod audit_reports;
pub mod cash_up_submissions;
pub mod notifications;
pub mod users;
