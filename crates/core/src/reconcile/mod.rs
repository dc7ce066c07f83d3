//! Tolerance-based balance reconciliation.
//!
//! Compares the net total extracted from audit evidence against the
//! cashier's declared total. The tolerance is a fixed absolute currency
//! amount, not a percentage: it absorbs floating rounding in exported
//! reports, never genuine discrepancies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod reconcile_props;

/// Absolute tolerance within which a cash-up counts as balanced: 0.01.
#[must_use]
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// An immutable reconciliation verdict.
///
/// Always produced, balanced or not - a balanced snapshot is still stored
/// for audit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Net total from the audit evidence.
    pub net_total: Decimal,
    /// Declared cash-up total (zero when the submission declared none).
    pub cashup_total: Decimal,
    /// `net_total - cashup_total`.
    pub delta: Decimal,
    /// Whether `|delta|` is within tolerance.
    pub balanced: bool,
}

/// Evaluates evidence against a declared total.
///
/// A missing declared total defaults to zero, which makes an undeclared
/// submission unbalanced against any non-trivial evidence - deliberately.
#[must_use]
pub fn evaluate(net_total: Decimal, cashup_total: Option<Decimal>) -> Reconciliation {
    let cashup_total = cashup_total.unwrap_or(Decimal::ZERO);
    let delta = net_total - cashup_total;
    Reconciliation {
        net_total,
        cashup_total,
        delta,
        balanced: delta.abs() <= balance_tolerance(),
    }
}
