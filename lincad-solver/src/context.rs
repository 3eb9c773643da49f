//! Solver context: variable allocation, expression interning, constraint
//! registration, and the projection operator.
//!
//! The [`Context`] owns every expression created through it in an interning
//! arena; [`ExprId`] handles are plain indices, so callers never manage
//! expression lifetimes. Interning deduplicates structurally equal
//! expressions, which is also what deduplicates projection sets.

use lincad_math::{LincadError, LinearExpression, Result, Var};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use tracing::debug;

/// Handle to an interned expression, valid for the owning context's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of relation a constraint imposes on its expression.
///
/// Only equality is implemented. The enum exists so the data model has a
/// place for inequality kinds later; the solver reports
/// [`LincadError::UnsupportedConstraint`] for any kind it does not handle
/// instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// The expression must evaluate to zero.
    EqualZero,
}

impl ConstraintKind {
    /// Whether a residual with the given sign satisfies this kind, or `None`
    /// if the kind is not implemented by the solver.
    pub fn holds_for_sign(self, sign: i8) -> Option<bool> {
        match self {
            ConstraintKind::EqualZero => Some(sign == 0),
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::EqualZero => write!(f, "= 0"),
        }
    }
}

/// A registered constraint: an interned expression and its relation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraint {
    /// The constrained expression.
    pub expr: ExprId,
    /// The relation imposed on it.
    pub kind: ConstraintKind,
}

/// Owner of variables, expressions, and constraints, and host of the
/// projection/lifting/solving pipeline.
#[derive(Debug, Default)]
pub struct Context {
    exprs: Vec<LinearExpression>,
    interned: FxHashMap<LinearExpression, ExprId>,
    var_names: Vec<String>,
    names: FxHashMap<String, Var>,
    constraints: Vec<Constraint>,
    seen_constraints: FxHashSet<Constraint>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh variable with a display name.
    ///
    /// Identifiers are allocated in creation order starting at 0. A name
    /// already registered in this context is rejected with
    /// [`LincadError::DuplicateVariable`] and leaves the context unchanged.
    pub fn add_variable(&mut self, name: impl Into<String>) -> Result<Var> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(LincadError::DuplicateVariable { name });
        }
        let var = self.var_names.len() as Var;
        self.names.insert(name.clone(), var);
        self.var_names.push(name);
        Ok(var)
    }

    /// Number of variables allocated so far.
    #[inline]
    pub fn num_vars(&self) -> usize {
        self.var_names.len()
    }

    /// The display name of a variable, if it belongs to this context.
    pub fn var_name(&self, var: Var) -> Option<&str> {
        self.var_names.get(var as usize).map(String::as_str)
    }

    /// Intern an expression, returning the id of the canonical copy.
    ///
    /// Structurally equal expressions share one id.
    pub fn intern(&mut self, expr: LinearExpression) -> ExprId {
        if let Some(&id) = self.interned.get(&expr) {
            return id;
        }
        let id = ExprId(self.exprs.len() as u32);
        self.interned.insert(expr.clone(), id);
        self.exprs.push(expr);
        id
    }

    /// Build and intern an expression from integer coefficients.
    pub fn add_linear_expression(&mut self, coeffs: &[(Var, i64)], constant: i64) -> ExprId {
        self.intern(LinearExpression::from_int_terms(coeffs, constant))
    }

    /// Look up an interned expression.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &LinearExpression {
        &self.exprs[id.index()]
    }

    /// Number of distinct interned expressions.
    #[inline]
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    /// Register a constraint on an interned expression.
    ///
    /// Constraints are kept in registration order; re-registering the same
    /// (expression, kind) pair is accepted and stored once.
    pub fn add_constraint(&mut self, expr: ExprId, kind: ConstraintKind) {
        let constraint = Constraint { expr, kind };
        if self.seen_constraints.insert(constraint) {
            self.constraints.push(constraint);
        }
    }

    /// The registered constraints, in registration order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Render an expression with variable names resolved through this
    /// context. Diagnostics only.
    pub fn display_expr(&self, id: ExprId) -> String {
        use num_traits::{Signed, Zero};

        let expr = self.expr(id);
        let mut out = String::new();
        for (var, coeff) in expr.terms() {
            let name = self.var_name(var).unwrap_or("?");
            if out.is_empty() {
                out.push_str(&format!("{coeff}*{name}"));
            } else if coeff.is_negative() {
                out.push_str(&format!(" - {}*{name}", -coeff));
            } else {
                out.push_str(&format!(" + {coeff}*{name}"));
            }
        }
        let constant = expr.constant();
        if out.is_empty() {
            out.push_str(&constant.to_string());
        } else if !constant.is_zero() {
            if constant.is_negative() {
                out.push_str(&format!(" - {}", -constant));
            } else {
                out.push_str(&format!(" + {constant}"));
            }
        }
        out
    }

    /// Eliminate `var` from a set of expressions.
    ///
    /// The returned projection set has the defining property of CAD
    /// projection: at any assignment of the remaining variables, the sign
    /// pattern of the projection set determines the ordering of the input
    /// expressions' roots along `var`. Two rules produce it:
    ///
    /// 1. every input with zero coefficient on `var` passes through
    ///    unchanged, and
    /// 2. every unordered input pair `(a, b)` contributes the eliminant
    ///    `cof(var, b)*drop(var, a) - cof(var, a)*drop(var, b)`.
    ///
    /// Pairs may eliminate to the zero expression (the members share their
    /// root line); that is legal and carries no ordering information, but the
    /// zero expression is still interned and may appear in the output.
    /// Deduplication happens through interning: each distinct expression
    /// appears once, in first-production order.
    pub fn project_away(&mut self, exprs: &[ExprId], var: Var) -> Vec<ExprId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();

        for &id in exprs {
            if !self.expr(id).depends_on(var) && seen.insert(id) {
                out.push(id);
            }
        }

        for i in 0..exprs.len() {
            for j in i + 1..exprs.len() {
                let a = self.expr(exprs[i]).clone();
                let b = self.expr(exprs[j]).clone();
                let eliminant = a
                    .drop_var(var)
                    .scalar_mul(&b.cof(var))
                    .subtract(&b.drop_var(var).scalar_mul(&a.cof(var)));
                let id = self.intern(eliminant);
                if seen.insert(id) {
                    out.push(id);
                }
            }
        }

        debug!(
            var,
            inputs = exprs.len(),
            outputs = out.len(),
            "projected variable away"
        );
        out
    }
}
