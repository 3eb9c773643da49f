//! LinCAD solver - satisfiability of linear equality constraints over the
//! rationals via cylindrical algebraic decomposition.
//!
//! The pipeline, hosted by [`Context`]:
//! - register variables, expressions, and `= 0` constraints
//! - **projection**: [`Context::project_away`] eliminates one variable at a
//!   time by pairwise cross-multiplication, cascading down to a univariate
//!   set
//! - **lifting**: [`Context::build_sign_invariant_partition`] rebuilds sample
//!   points dimension-by-dimension into a cell tree, one leaf per cell of the
//!   decomposition
//! - **search**: [`Context::solve_constraints`] checks each leaf test point
//!   against the constraints and returns the first witness, if any
//!
//! Because only equality constraints are tracked, projection is the pairwise
//! root-coincidence eliminant rather than a full inequality-aware operator,
//! and the decomposition is equality-sign-invariant: every tracked expression
//! has constant sign on each cell.
//!
//! # Examples
//!
//! ```
//! use lincad_solver::{ConstraintKind, Context};
//!
//! let mut ctx = Context::new();
//! let a = ctx.add_variable("a").unwrap();
//! let b = ctx.add_variable("b").unwrap();
//!
//! // 3a - 2b - 7 = 0 and 5a + 5b + 4 = 0
//! let e1 = ctx.add_linear_expression(&[(a, 3), (b, -2)], -7);
//! let e2 = ctx.add_linear_expression(&[(a, 5), (b, 5)], 4);
//! ctx.add_constraint(e1, ConstraintKind::EqualZero);
//! ctx.add_constraint(e2, ConstraintKind::EqualZero);
//!
//! let model = ctx.solve_constraints().unwrap().expect("satisfiable");
//! assert!(model.contains_key(&a) && model.contains_key(&b));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cad;
pub mod context;
pub mod solver;

pub use cad::{Cell, CellId, Leaves, PartitionStats, SignInvariantPartition};
pub use context::{Constraint, ConstraintKind, Context, ExprId};
pub use lincad_math::{LincadError, LinearExpression, Result, Var};
pub use solver::{Model, SolveOutcome};
