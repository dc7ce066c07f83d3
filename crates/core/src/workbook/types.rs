//! Workbook extraction domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a workbook is being extracted.
///
/// The two modes share the same total-scanning strategy; standalone mode
/// additionally detects who the report is for and which window it covers,
/// because no submission id accompanies the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Evidence bound to a known submission.
    Linked,
    /// Evidence uploaded without a submission reference.
    Standalone,
}

/// Metadata detected from the free-text banner rows of a standalone report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Employee name as printed in the report, verbatim.
    pub employee_name: Option<String>,
    /// Start of the reporting window.
    pub from_date_key: Option<NaiveDate>,
    /// End of the reporting window.
    pub to_date_key: Option<NaiveDate>,
}

/// The result of extracting a transaction-report workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Sum of absolute amounts of INCOME rows.
    pub income_total: Decimal,
    /// Sum of absolute amounts of EXPENSE rows.
    pub expense_total: Decimal,
    /// `income_total - expense_total`.
    pub net_total: Decimal,
    /// Name of the (first) sheet that was read.
    pub sheet_name: String,
    /// Number of data rows that contributed to a total.
    pub rows_parsed: usize,
    /// Standalone-mode metadata; `None` in linked mode.
    pub metadata: Option<ReportMetadata>,
}
