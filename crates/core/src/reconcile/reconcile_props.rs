//! Property-based tests for the reconciliation evaluator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::{balance_tolerance, evaluate};

/// Strategy for random currency amounts with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// delta is exactly net - cashup, with no rounding.
    #[test]
    fn prop_delta_exact(net in arb_amount(), cashup in arb_amount()) {
        let r = evaluate(net, Some(cashup));
        prop_assert_eq!(r.delta, net - cashup);
    }

    /// balanced iff |delta| <= tolerance.
    #[test]
    fn prop_balanced_iff_within_tolerance(net in arb_amount(), cashup in arb_amount()) {
        let r = evaluate(net, Some(cashup));
        prop_assert_eq!(r.balanced, (net - cashup).abs() <= balance_tolerance());
    }

    /// Evaluation is a pure function: same inputs, same verdict.
    #[test]
    fn prop_deterministic(net in arb_amount(), cashup in arb_amount()) {
        prop_assert_eq!(evaluate(net, Some(cashup)), evaluate(net, Some(cashup)));
    }

    /// A submission that declared nothing reconciles against zero.
    #[test]
    fn prop_missing_total_is_zero(net in arb_amount()) {
        let r = evaluate(net, None);
        prop_assert_eq!(r.cashup_total, Decimal::ZERO);
        prop_assert_eq!(r.delta, net);
    }

    /// Swapping the sides negates the delta but preserves the verdict.
    #[test]
    fn prop_symmetry_of_verdict(net in arb_amount(), cashup in arb_amount()) {
        let a = evaluate(net, Some(cashup));
        let b = evaluate(cashup, Some(net));
        prop_assert_eq!(a.delta, -b.delta);
        prop_assert_eq!(a.balanced, b.balanced);
    }
}
