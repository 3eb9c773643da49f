//! Properties of `LinearExpression`: substitution correctness and
//! preservation of the no-zero-coefficient invariant.

use lincad_math::LinearExpression;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

/// Strategy for small integer coefficients.
fn coeff_strategy() -> impl Strategy<Value = i64> {
    -6i64..6i64
}

/// Strategy for an expression over variables 0..4.
fn expr_strategy() -> impl Strategy<Value = Vec<(u32, i64)>> {
    prop::collection::vec((0u32..4u32, coeff_strategy()), 0..6)
}

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Every stored coefficient must be nonzero.
fn assert_invariant(e: &LinearExpression) {
    for (_, c) in e.terms() {
        assert!(!c.is_zero(), "zero coefficient stored in {e}");
    }
}

proptest! {
    /// Full substitution leaves no coefficients and matches the direct
    /// algebraic value of the expression at the point.
    #[test]
    fn full_substitution_is_evaluation(
        coeffs in expr_strategy(),
        constant in coeff_strategy(),
        values in prop::collection::vec(coeff_strategy(), 4),
    ) {
        let e = LinearExpression::from_int_terms(&coeffs, constant);

        let mut point = FxHashMap::default();
        for (var, value) in values.iter().enumerate() {
            point.insert(var as u32, rat(*value));
        }

        let result = e.evaluate_at(&point);
        prop_assert!(result.is_constant());

        let mut expected = rat(constant);
        for (var, c) in &coeffs {
            expected += rat(*c) * rat(values[*var as usize]);
        }
        prop_assert_eq!(result.constant().clone(), expected);
    }

    /// `drop_var`, `scalar_mul` and `subtract` never reintroduce a
    /// zero-valued coefficient entry.
    #[test]
    fn derived_expressions_keep_invariant(
        a in expr_strategy(),
        b in expr_strategy(),
        ca in coeff_strategy(),
        cb in coeff_strategy(),
        var in 0u32..4u32,
        scalar in coeff_strategy(),
    ) {
        let ea = LinearExpression::from_int_terms(&a, ca);
        let eb = LinearExpression::from_int_terms(&b, cb);

        assert_invariant(&ea.drop_var(var));
        assert_invariant(&ea.scalar_mul(&rat(scalar)));
        assert_invariant(&ea.subtract(&eb));
        assert_invariant(&ea.drop_var(var).scalar_mul(&rat(scalar)).subtract(&eb));
    }

    /// Substitution commutes with scalar multiplication.
    #[test]
    fn substitution_commutes_with_scalar_mul(
        coeffs in expr_strategy(),
        constant in coeff_strategy(),
        scalar in coeff_strategy(),
        value in coeff_strategy(),
    ) {
        let e = LinearExpression::from_int_terms(&coeffs, constant);
        let mut point = FxHashMap::default();
        point.insert(0, rat(value));

        let scaled_then_substituted = e.scalar_mul(&rat(scalar)).evaluate_at(&point);
        let substituted_then_scaled = e.evaluate_at(&point).scalar_mul(&rat(scalar));
        prop_assert_eq!(scaled_then_substituted, substituted_then_scaled);
    }

    /// Subtracting an expression from itself yields the zero expression.
    #[test]
    fn subtract_self_is_zero(coeffs in expr_strategy(), constant in coeff_strategy()) {
        let e = LinearExpression::from_int_terms(&coeffs, constant);
        prop_assert!(e.subtract(&e).is_zero());
    }
}
