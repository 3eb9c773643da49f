//! Property-based tests for the linear expression algebra.

mod expr_properties;
