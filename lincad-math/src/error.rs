//! Error types shared by the LinCAD crates.

use crate::expr::Var;
use thiserror::Error;

/// Errors produced by the LinCAD engine.
///
/// Configuration errors ([`DuplicateVariable`](LincadError::DuplicateVariable))
/// are recoverable: the operation is rejected and the context is unchanged.
/// The remaining variants report invariant violations inside the
/// projection/lifting pipeline; continuing past one of them would produce a
/// partition that is not sign-invariant, so they abort the request instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LincadError {
    /// A variable name was registered twice in the same context.
    #[error("variable `{name}` is already registered")]
    DuplicateVariable {
        /// The offending name.
        name: String,
    },

    /// Substitution left more than one nonzero coefficient at a
    /// root-extraction step.
    #[error("expected a univariate expression at root extraction, {remaining} coefficients remain")]
    NotUnivariate {
        /// Number of coefficients left after substitution.
        remaining: usize,
    },

    /// A leaf test point failed to assign every variable in the context.
    #[error("leaf test point does not assign variable {var}")]
    IncompleteTestPoint {
        /// The unassigned variable.
        var: Var,
    },

    /// A constraint kind reached the solver that it does not implement.
    #[error("unsupported constraint kind `{kind}`")]
    UnsupportedConstraint {
        /// Display form of the unsupported kind.
        kind: String,
    },
}

/// Convenience result alias for LinCAD operations.
pub type Result<T> = std::result::Result<T, LincadError>;
