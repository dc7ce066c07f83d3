//! Transaction-report workbook extraction.
//!
//! Audit evidence arrives as a spreadsheet exported by whatever till system
//! the branch runs; there is no fixed schema. Extraction reads the first
//! sheet only, locates the header row by scanning, and accumulates income
//! and expense totals from the rows below it. In standalone mode the
//! banner rows are additionally scanned for the employee name and the
//! reporting window.
//!
//! Extraction is a pure function of the workbook bytes: the same bytes
//! always produce the same totals and metadata.

mod error;
mod scan;
mod types;

pub use error::ExtractionError;
pub use scan::{
    HEADER_SCAN_ROWS, HeaderLocation, METADATA_SCAN_ROWS, RowTotals, cell_amount, cell_date,
    cell_text, find_header, normalize_header, parse_date_key, scan_metadata, sum_rows,
};
pub use types::{Extraction, ExtractionMode, ReportMetadata};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;

/// Extracts totals (and, in standalone mode, report metadata) from
/// spreadsheet bytes.
///
/// The container format is sniffed from the bytes, so both xlsx and
/// legacy xls exports are accepted.
///
/// # Errors
///
/// - [`ExtractionError::Unreadable`] if the bytes are not a spreadsheet.
/// - [`ExtractionError::NoWorksheet`] if the workbook has no sheets.
/// - [`ExtractionError::HeaderNotFound`] if no header row is found within
///   the first [`HEADER_SCAN_ROWS`] rows.
pub fn extract(bytes: &[u8], mode: ExtractionMode) -> Result<Extraction, ExtractionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ExtractionError::NoWorksheet)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();

    extract_rows(&rows, &sheet_name, mode)
}

/// Extraction over pre-read rows; the bytes-level entry point delegates
/// here so the whole pipeline stays testable on constructed rows.
pub fn extract_rows(
    rows: &[Vec<Data>],
    sheet_name: &str,
    mode: ExtractionMode,
) -> Result<Extraction, ExtractionError> {
    let header = find_header(rows).ok_or(ExtractionError::HeaderNotFound)?;
    let totals = sum_rows(rows, header);

    let metadata = match mode {
        ExtractionMode::Linked => None,
        ExtractionMode::Standalone => {
            let mut meta = scan_metadata(rows);
            // No banner window: fall back to the first effective-date cell
            // for both ends of the reporting window.
            if meta.from_date_key.is_none() {
                meta.from_date_key = totals.first_effective_date;
                meta.to_date_key = totals.first_effective_date;
            }
            Some(meta)
        }
    };

    Ok(Extraction {
        income_total: totals.income,
        expense_total: totals.expense,
        net_total: totals.income - totals.expense,
        sheet_name: sheet_name.to_string(),
        rows_parsed: totals.rows_parsed,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    fn report_rows() -> Vec<Vec<Data>> {
        vec![
            vec![s("TRANSACTION REPORT FOR John Smith")],
            vec![s("FROM 2025-03-01 TO 2025-03-01")],
            vec![s("Transaction Type"), s("Amount"), s("Effective Date")],
            vec![s("INCOME"), Data::Float(100.0), s("2025-03-01")],
            vec![s("INCOME"), Data::Float(50.0), s("2025-03-01")],
            vec![s("EXPENSE"), Data::Float(30.0), s("2025-03-01")],
        ]
    }

    #[test]
    fn test_linked_extraction_totals() {
        let out = extract_rows(&report_rows(), "Sheet1", ExtractionMode::Linked).unwrap();
        assert_eq!(out.income_total, dec!(150));
        assert_eq!(out.expense_total, dec!(30));
        assert_eq!(out.net_total, dec!(120));
        assert_eq!(out.rows_parsed, 3);
        assert_eq!(out.sheet_name, "Sheet1");
        assert!(out.metadata.is_none());
    }

    #[test]
    fn test_standalone_extraction_metadata() {
        let out = extract_rows(&report_rows(), "Sheet1", ExtractionMode::Standalone).unwrap();
        let meta = out.metadata.expect("standalone mode carries metadata");
        assert_eq!(meta.employee_name.as_deref(), Some("John Smith"));
        assert_eq!(meta.from_date_key, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_standalone_window_falls_back_to_effective_date() {
        let rows = vec![
            vec![s("TRANSACTION REPORT FOR John Smith")],
            vec![s("Transaction Type"), s("Amount"), s("Effective Date")],
            vec![s("INCOME"), Data::Float(10.0), s("2025-04-02")],
        ];
        let out = extract_rows(&rows, "Sheet1", ExtractionMode::Standalone).unwrap();
        let meta = out.metadata.unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 4, 2);
        assert_eq!(meta.from_date_key, expected);
        assert_eq!(meta.to_date_key, expected);
    }

    #[test]
    fn test_extraction_idempotent() {
        let rows = report_rows();
        let a = extract_rows(&rows, "Sheet1", ExtractionMode::Standalone).unwrap();
        let b = extract_rows(&rows, "Sheet1", ExtractionMode::Standalone).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_header_fails() {
        let rows = vec![vec![s("just a banner")], vec![s("no columns here")]];
        let err = extract_rows(&rows, "Sheet1", ExtractionMode::Linked).unwrap_err();
        assert!(matches!(err, ExtractionError::HeaderNotFound));
    }

    #[test]
    fn test_garbage_bytes_unreadable() {
        let err = extract(b"this is not a workbook", ExtractionMode::Linked).unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }
}
