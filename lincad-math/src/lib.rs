//! LinCAD math - linear expression algebra over exact rationals.
//!
//! This crate provides the symbolic layer of the LinCAD solver:
//! - [`LinearExpression`]: sparse rational linear expressions with
//!   value-semantics algebra (`drop_var`, `scalar_mul`, `subtract`,
//!   `evaluate_at`, root extraction)
//! - [`LincadError`]: the error taxonomy shared with the solver crate
//!
//! Exact arithmetic comes from `num-rational`'s [`BigRational`]; no floating
//! point is used anywhere.
//!
//! # Examples
//!
//! ```
//! use lincad_math::LinearExpression;
//! use num_rational::BigRational;
//! use num_bigint::BigInt;
//! use rustc_hash::FxHashMap;
//!
//! // x - 5, substituted at x = 5, is the zero expression.
//! let e = LinearExpression::from_int_terms(&[(0, 1)], -5);
//! let mut point = FxHashMap::default();
//! point.insert(0, BigRational::from_integer(BigInt::from(5)));
//! assert!(e.evaluate_at(&point).is_zero());
//! ```
//!
//! [`BigRational`]: num_rational::BigRational

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod expr;

pub use error::{LincadError, Result};
pub use expr::{LinearExpression, Var};
