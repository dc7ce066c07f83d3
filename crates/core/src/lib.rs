//! Core business logic for Tillbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `workbook` - Transaction-report spreadsheet extraction
//! - `identity` - Free-text employee name resolution
//! - `reconcile` - Tolerance-based balance reconciliation
//! - `submission` - Cash-up submission workflow state machine
//! - `audit` - Audit evidence ingestion orchestration
//! - `storage` - Object storage for evidence files

pub mod audit;
pub mod identity;
pub mod reconcile;
pub mod storage;
pub mod submission;
pub mod workbook;
