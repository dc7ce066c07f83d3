//! Row-level scanning heuristics for transaction-report workbooks.
//!
//! Reports arrive with no fixed schema: the header row position and column
//! order vary between till systems. Everything in this module is a pure
//! function over raw cell rows so the heuristics stay testable without
//! real workbook bytes.

use calamine::Data;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::types::ReportMetadata;

/// Rows scanned for a header before giving up.
pub const HEADER_SCAN_ROWS: usize = 50;

/// Rows scanned for standalone-report banner metadata.
pub const METADATA_SCAN_ROWS: usize = 30;

static REPORT_FOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)TRANSACTION\s+REPORT\s+FOR\s+(.*?)\s*(?:\bFROM\b.*)?$")
        .expect("valid regex")
});

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)FROM\s+(\d{4}[-/]\d{2}[-/]\d{2})\s+TO\s+(\d{4}[-/]\d{2}[-/]\d{2})")
        .expect("valid regex")
});

/// Location of the detected header row and its relevant columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    /// Zero-based index of the header row.
    pub row: usize,
    /// Column index of the transaction-type column.
    pub type_col: usize,
    /// Column index of the amount column.
    pub amount_col: usize,
    /// Column index of the effective-date column, when present.
    pub date_col: Option<usize>,
}

/// Accumulated totals from the data rows below a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTotals {
    /// Sum of absolute INCOME amounts.
    pub income: Decimal,
    /// Sum of absolute EXPENSE amounts.
    pub expense: Decimal,
    /// Rows that carried both a type and an amount.
    pub rows_parsed: usize,
    /// First valid effective-date cell encountered, if any.
    pub first_effective_date: Option<NaiveDate>,
}

/// Lowercases a header cell and strips whitespace and punctuation, so that
/// "Transaction Type", "transaction_type" and "TRANSACTION-TYPE" all
/// compare equal.
#[must_use]
pub fn normalize_header(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn is_type_header(norm: &str) -> bool {
    norm.contains("transactiontype") || norm == "type"
}

fn is_amount_header(norm: &str) -> bool {
    norm.contains("amount")
}

fn is_date_header(norm: &str) -> bool {
    norm.contains("effectivedate") || norm == "date"
}

/// Returns the trimmed text content of a cell, if it has any.
#[must_use]
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::DateTime(_) | Data::Error(_) | Data::Empty => None,
    }
}

/// Coerces a cell to a decimal amount.
///
/// String amounts have thousands separators and spaces stripped first;
/// non-finite floats and anything unparsable yield `None` and the row is
/// skipped by the caller.
#[must_use]
pub fn cell_amount(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => {
            if f.is_finite() {
                Decimal::from_f64_retain(*f)
            } else {
                None
            }
        }
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::String(s) => {
            let stripped: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
                .collect();
            Decimal::from_str(&stripped).ok()
        }
        _ => None,
    }
}

/// Coerces a cell to a calendar date, accepting native spreadsheet dates
/// and `YYYY-MM-DD` / `YYYY/MM/DD` text.
#[must_use]
pub fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_key(s.trim()),
        _ => None,
    }
}

/// Parses a `YYYY-MM-DD` or `YYYY/MM/DD` date key.
#[must_use]
pub fn parse_date_key(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .ok()
}

/// Scans at most the first [`HEADER_SCAN_ROWS`] rows for a header row
/// carrying both a transaction-type and an amount column.
#[must_use]
pub fn find_header(rows: &[Vec<Data>]) -> Option<HeaderLocation> {
    for (row_idx, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let mut type_col = None;
        let mut amount_col = None;
        let mut date_col = None;

        for (col_idx, cell) in row.iter().enumerate() {
            let Some(text) = cell_text(cell) else {
                continue;
            };
            let norm = normalize_header(&text);
            if type_col.is_none() && is_type_header(&norm) {
                type_col = Some(col_idx);
            } else if amount_col.is_none() && is_amount_header(&norm) {
                amount_col = Some(col_idx);
            } else if date_col.is_none() && is_date_header(&norm) {
                date_col = Some(col_idx);
            }
        }

        if let (Some(type_col), Some(amount_col)) = (type_col, amount_col) {
            return Some(HeaderLocation {
                row: row_idx,
                type_col,
                amount_col,
                date_col,
            });
        }
    }
    None
}

/// Accumulates income/expense totals from the data rows below the header.
///
/// Absolute values are used for both sides so sign conventions in the
/// source report never flip the reconciliation result. Rows missing either
/// the type or the amount are skipped without error; unrecognised type
/// values are ignored.
#[must_use]
pub fn sum_rows(rows: &[Vec<Data>], header: HeaderLocation) -> RowTotals {
    let mut totals = RowTotals {
        income: Decimal::ZERO,
        expense: Decimal::ZERO,
        rows_parsed: 0,
        first_effective_date: None,
    };

    for row in rows.iter().skip(header.row + 1) {
        if totals.first_effective_date.is_none() {
            if let Some(col) = header.date_col {
                totals.first_effective_date = row.get(col).and_then(cell_date);
            }
        }

        let Some(amount) = row.get(header.amount_col).and_then(cell_amount) else {
            continue;
        };
        let Some(kind) = row.get(header.type_col).and_then(cell_text) else {
            continue;
        };

        totals.rows_parsed += 1;
        match kind.to_uppercase().as_str() {
            "INCOME" => totals.income += amount.abs(),
            "EXPENSE" => totals.expense += amount.abs(),
            _ => {}
        }
    }

    totals
}

/// Scans the first [`METADATA_SCAN_ROWS`] rows for the standalone-report
/// banner patterns: `TRANSACTION REPORT FOR <name>` and
/// `FROM <date> TO <date>`.
///
/// The scan is independent of the header scan; banner rows usually sit
/// above the header but nothing guarantees it.
#[must_use]
pub fn scan_metadata(rows: &[Vec<Data>]) -> ReportMetadata {
    let mut meta = ReportMetadata::default();

    for row in rows.iter().take(METADATA_SCAN_ROWS) {
        let line = row
            .iter()
            .filter_map(cell_text)
            .collect::<Vec<_>>()
            .join(" ");
        if line.is_empty() {
            continue;
        }

        if meta.employee_name.is_none() {
            if let Some(caps) = REPORT_FOR_RE.captures(&line) {
                let name = caps[1].trim();
                if !name.is_empty() {
                    meta.employee_name = Some(name.to_string());
                }
            }
        }

        if meta.from_date_key.is_none() {
            if let Some(caps) = DATE_RANGE_RE.captures(&line) {
                meta.from_date_key = parse_date_key(&caps[1]);
                meta.to_date_key = parse_date_key(&caps[2]);
            }
        }

        if meta.employee_name.is_some() && meta.from_date_key.is_some() {
            break;
        }
    }

    meta
}
