//! Constraint-satisfaction search over the sign-invariant partition.

use lincad_math::{LincadError, Result, Var};
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::cad::ensure_assigns_all;
use crate::context::{Context, ExprId};

/// A satisfying assignment: one value per context variable.
pub type Model = FxHashMap<Var, BigRational>;

/// Outcome of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The constraint system is satisfiable; the model is a witness.
    Sat(Model),
    /// No cell of the decomposition satisfies every constraint.
    Unsat,
}

fn sign(value: &BigRational) -> i8 {
    if value.is_zero() {
        0
    } else if value.is_positive() {
        1
    } else {
        -1
    }
}

impl Context {
    /// Decide satisfiability of the registered constraints.
    ///
    /// Builds the sign-invariant partition over the constraint expressions
    /// and walks its leaf test points in generation order; the first point
    /// satisfying every constraint is returned as the model. `Ok(None)` is
    /// the normal "unsatisfiable" outcome, distinct from the `Err` cases,
    /// which report invariant violations inside the pipeline.
    pub fn solve_constraints(&mut self) -> Result<Option<Model>> {
        let exprs: Vec<ExprId> = self.constraints().iter().map(|c| c.expr).collect();
        let partition = self.build_sign_invariant_partition(&exprs)?;
        debug!(
            constraints = self.constraints().len(),
            leaves = partition.leaf_count(),
            "searching decomposition"
        );

        for point in partition.leaf_points() {
            ensure_assigns_all(point, self.num_vars())?;
            let mut satisfied = true;
            for constraint in self.constraints() {
                let residual = self.expr(constraint.expr).evaluate_at(point);
                debug_assert!(residual.is_constant());
                let holds = constraint
                    .kind
                    .holds_for_sign(sign(residual.constant()))
                    .ok_or_else(|| LincadError::UnsupportedConstraint {
                        kind: constraint.kind.to_string(),
                    })?;
                if !holds {
                    satisfied = false;
                    break;
                }
            }
            if satisfied {
                info!("constraints satisfiable");
                return Ok(Some(point.clone()));
            }
        }

        info!("no satisfying cell found");
        Ok(None)
    }

    /// [`solve_constraints`](Self::solve_constraints) with the outcome as an
    /// enum instead of an option.
    pub fn check(&mut self) -> Result<SolveOutcome> {
        Ok(match self.solve_constraints()? {
            Some(model) => SolveOutcome::Sat(model),
            None => SolveOutcome::Unsat,
        })
    }
}
