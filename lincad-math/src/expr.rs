//! Linear expressions over exact rationals.
//!
//! A [`LinearExpression`] is a sparse sum `c1*x1 + ... + ck*xk + c` with
//! rational coefficients and a rational constant term. The representation is
//! a list of `(variable, coefficient)` pairs sorted by variable index, with
//! the invariant that no stored coefficient is zero; every constructor and
//! derived operation re-establishes that invariant, so structural equality
//! coincides with algebraic equality.
//!
//! All operations are value-producing: `drop_var`, `scalar_mul`, `subtract`
//! and `evaluate_at` return fresh expressions and never mutate the receiver.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{LincadError, Result};

/// Variable identifier. Allocated densely from 0 by the owning context.
pub type Var = u32;

/// A linear expression with exact rational coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinearExpression {
    /// Nonzero coefficients, sorted by variable index.
    terms: SmallVec<[(Var, BigRational); 2]>,
    /// Constant term.
    constant: BigRational,
}

impl LinearExpression {
    /// The zero expression (no coefficients, constant 0).
    pub fn zero() -> Self {
        Self {
            terms: SmallVec::new(),
            constant: BigRational::zero(),
        }
    }

    /// A constant expression with no variables.
    pub fn from_constant(constant: BigRational) -> Self {
        Self {
            terms: SmallVec::new(),
            constant,
        }
    }

    /// Build an expression from integer coefficients and an integer constant.
    ///
    /// Duplicate variables are summed; zero coefficients are pruned.
    pub fn from_int_terms(coeffs: &[(Var, i64)], constant: i64) -> Self {
        Self::from_terms(
            coeffs
                .iter()
                .map(|&(v, c)| (v, BigRational::from_integer(BigInt::from(c)))),
            BigRational::from_integer(BigInt::from(constant)),
        )
    }

    /// Build an expression from rational coefficients and a rational constant.
    ///
    /// The input does not need to be sorted or free of duplicates; duplicate
    /// variables are summed and zero coefficients pruned.
    pub fn from_terms(
        coeffs: impl IntoIterator<Item = (Var, BigRational)>,
        constant: BigRational,
    ) -> Self {
        let mut merged: FxHashMap<Var, BigRational> = FxHashMap::default();
        for (var, coeff) in coeffs {
            *merged.entry(var).or_insert_with(BigRational::zero) += coeff;
        }

        let mut terms: SmallVec<[(Var, BigRational); 2]> = merged
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .collect();
        terms.sort_by_key(|t| t.0);

        Self { terms, constant }
    }

    /// True if the expression is identically zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.constant.is_zero()
    }

    /// True if the expression has no variables (possibly nonzero constant).
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant term.
    #[inline]
    pub fn constant(&self) -> &BigRational {
        &self.constant
    }

    /// Number of variables with a nonzero coefficient.
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// The `(variable, coefficient)` pairs, sorted by variable index.
    pub fn terms(&self) -> impl Iterator<Item = (Var, &BigRational)> {
        self.terms.iter().map(|(v, c)| (*v, c))
    }

    /// The variables with a nonzero coefficient, in increasing order.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.terms.iter().map(|t| t.0)
    }

    /// The coefficient of `var`, or zero if absent.
    pub fn cof(&self, var: Var) -> BigRational {
        match self.terms.binary_search_by_key(&var, |t| t.0) {
            Ok(idx) => self.terms[idx].1.clone(),
            Err(_) => BigRational::zero(),
        }
    }

    /// True if `var` has a nonzero coefficient in this expression.
    pub fn depends_on(&self, var: Var) -> bool {
        self.terms.binary_search_by_key(&var, |t| t.0).is_ok()
    }

    /// A copy of this expression with `var`'s term removed (no-op if absent).
    pub fn drop_var(&self, var: Var) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .filter(|t| t.0 != var)
                .cloned()
                .collect(),
            constant: self.constant.clone(),
        }
    }

    /// A copy with every coefficient and the constant multiplied by `scalar`.
    ///
    /// A zero scalar yields the zero expression.
    pub fn scalar_mul(&self, scalar: &BigRational) -> Self {
        if scalar.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (*v, c * scalar))
                .collect(),
            constant: &self.constant * scalar,
        }
    }

    /// Pointwise sum of two expressions.
    pub fn add(&self, other: &Self) -> Self {
        self.combine(other, false)
    }

    /// Pointwise difference `self - other`.
    ///
    /// Coefficients absent on either side are treated as zero; entries that
    /// cancel to zero are pruned.
    pub fn subtract(&self, other: &Self) -> Self {
        self.combine(other, true)
    }

    /// The additive inverse.
    pub fn neg(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, -c)).collect(),
            constant: -&self.constant,
        }
    }

    /// Merge two sorted term lists, adding or subtracting pointwise.
    fn combine(&self, other: &Self, negate: bool) -> Self {
        let mut terms: SmallVec<[(Var, BigRational); 2]> = SmallVec::new();
        let mut i = 0;
        let mut j = 0;

        while i < self.terms.len() && j < other.terms.len() {
            let (va, ca) = &self.terms[i];
            let (vb, cb) = &other.terms[j];
            match va.cmp(vb) {
                Ordering::Less => {
                    terms.push((*va, ca.clone()));
                    i += 1;
                }
                Ordering::Greater => {
                    terms.push((*vb, if negate { -cb } else { cb.clone() }));
                    j += 1;
                }
                Ordering::Equal => {
                    let c = if negate { ca - cb } else { ca + cb };
                    if !c.is_zero() {
                        terms.push((*va, c));
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        for (v, c) in &self.terms[i..] {
            terms.push((*v, c.clone()));
        }
        for (v, c) in &other.terms[j..] {
            terms.push((*v, if negate { -c } else { c.clone() }));
        }

        let constant = if negate {
            &self.constant - &other.constant
        } else {
            &self.constant + &other.constant
        };

        Self { terms, constant }
    }

    /// Substitute the assigned variables, folding their terms into the
    /// constant; terms for unassigned variables are kept unchanged.
    ///
    /// This is partial substitution, not full evaluation: the result is a
    /// constant expression only when `assignment` covers every variable of
    /// the receiver.
    pub fn evaluate_at(&self, assignment: &FxHashMap<Var, BigRational>) -> Self {
        let mut terms: SmallVec<[(Var, BigRational); 2]> = SmallVec::new();
        let mut constant = self.constant.clone();
        for (var, coeff) in &self.terms {
            match assignment.get(var) {
                Some(value) => constant += coeff * value,
                None => terms.push((*var, coeff.clone())),
            }
        }
        Self { terms, constant }
    }

    /// The root of a univariate expression: `-constant / coefficient`.
    ///
    /// Precondition: exactly one nonzero coefficient remains. Anything else
    /// indicates a degenerate expression reached a root-extraction step it
    /// should never reach, reported as [`LincadError::NotUnivariate`].
    pub fn root(&self) -> Result<BigRational> {
        match self.terms.as_slice() {
            [(_, coeff)] => Ok(-(&self.constant / coeff)),
            _ => Err(LincadError::NotUnivariate {
                remaining: self.terms.len(),
            }),
        }
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use num_traits::Signed;

        let mut first = true;
        for (var, coeff) in &self.terms {
            if first {
                write!(f, "{coeff}*x{var}")?;
                first = false;
            } else if coeff.is_negative() {
                write!(f, " - {}*x{var}", -coeff)?;
            } else {
                write!(f, " + {coeff}*x{var}")?;
            }
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant.is_zero() {
            Ok(())
        } else if self.constant.is_negative() {
            write!(f, " - {}", -&self.constant)
        } else {
            write!(f, " + {}", self.constant)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn rat2(num: i64, den: i64) -> BigRational {
        BigRational::new(BigInt::from(num), BigInt::from(den))
    }

    #[test]
    fn full_substitution_yields_zero_expression() {
        // x - 5 at x = 5
        let e = LinearExpression::from_int_terms(&[(0, 1)], -5);
        let mut point = FxHashMap::default();
        point.insert(0, rat(5));

        let result = e.evaluate_at(&point);
        assert_eq!(result, LinearExpression::zero());
        assert!(result.is_zero());
    }

    #[test]
    fn partial_substitution_keeps_unassigned_terms() {
        // 3x + 2y - 1 at y = 4 becomes 3x + 7
        let e = LinearExpression::from_int_terms(&[(0, 3), (1, 2)], -1);
        let mut point = FxHashMap::default();
        point.insert(1, rat(4));

        let result = e.evaluate_at(&point);
        assert_eq!(result, LinearExpression::from_int_terms(&[(0, 3)], 7));
        assert!(result.depends_on(0));
        assert!(!result.depends_on(1));
    }

    #[test]
    fn zero_coefficients_are_pruned_at_construction() {
        let e = LinearExpression::from_int_terms(&[(0, 0), (1, 2)], 3);
        assert_eq!(e.num_terms(), 1);
        assert_eq!(e.cof(0), rat(0));
        assert_eq!(e.cof(1), rat(2));
    }

    #[test]
    fn duplicate_variables_are_summed() {
        let e = LinearExpression::from_int_terms(&[(0, 2), (0, -2), (1, 1)], 0);
        assert!(!e.depends_on(0));
        assert_eq!(e, LinearExpression::from_int_terms(&[(1, 1)], 0));
    }

    #[test]
    fn equality_is_order_independent() {
        let a = LinearExpression::from_int_terms(&[(0, 1), (1, 2)], 3);
        let b = LinearExpression::from_int_terms(&[(1, 2), (0, 1)], 3);
        assert_eq!(a, b);
    }

    #[test]
    fn subtract_cancels_to_zero() {
        let a = LinearExpression::from_int_terms(&[(0, 1), (1, -1)], 2);
        assert!(a.subtract(&a).is_zero());
    }

    #[test]
    fn subtract_prunes_cancelled_entries() {
        let a = LinearExpression::from_int_terms(&[(0, 1), (1, 2)], 0);
        let b = LinearExpression::from_int_terms(&[(0, 1), (1, -3)], 5);
        let d = a.subtract(&b);
        assert!(!d.depends_on(0));
        assert_eq!(d.cof(1), rat(5));
        assert_eq!(*d.constant(), rat(-5));
    }

    #[test]
    fn scalar_mul_by_zero_is_zero_expression() {
        let e = LinearExpression::from_int_terms(&[(0, 4), (2, -1)], 9);
        assert!(e.scalar_mul(&rat(0)).is_zero());
    }

    #[test]
    fn drop_var_removes_single_entry() {
        let e = LinearExpression::from_int_terms(&[(0, 4), (2, -1)], 9);
        let d = e.drop_var(2);
        assert_eq!(d, LinearExpression::from_int_terms(&[(0, 4)], 9));
        // dropping an absent variable is a no-op
        assert_eq!(e.drop_var(7), e);
    }

    #[test]
    fn root_of_univariate_expression() {
        // 2x + 6 = 0 at x = -3
        let e = LinearExpression::from_int_terms(&[(0, 2)], 6);
        assert_eq!(e.root().unwrap(), rat(-3));

        // 3x - 1 = 0 at x = 1/3
        let e = LinearExpression::from_int_terms(&[(0, 3)], -1);
        assert_eq!(e.root().unwrap(), rat2(1, 3));
    }

    #[test]
    fn root_rejects_non_univariate_expressions() {
        let two_vars = LinearExpression::from_int_terms(&[(0, 1), (1, 1)], 0);
        assert_eq!(
            two_vars.root(),
            Err(LincadError::NotUnivariate { remaining: 2 })
        );

        let constant = LinearExpression::from_int_terms(&[], 1);
        assert_eq!(
            constant.root(),
            Err(LincadError::NotUnivariate { remaining: 0 })
        );
    }

    #[test]
    fn neg_and_add_are_inverses() {
        let e = LinearExpression::from_int_terms(&[(0, 3), (1, -2)], 7);
        assert!(e.add(&e.neg()).is_zero());
    }

    #[test]
    fn display_renders_signs_and_constant() {
        let e = LinearExpression::from_int_terms(&[(0, 3), (1, -2)], -7);
        assert_eq!(e.to_string(), "3*x0 - 2*x1 - 7");
        assert_eq!(LinearExpression::zero().to_string(), "0");
    }
}
