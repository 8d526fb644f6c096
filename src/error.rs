// This module defines error types for the instrgen schema engine using the thiserror
// crate for idiomatic Rust error handling. SchemaError is the main error enum covering
// every failure a schema defect can produce: duplicate entity names, references to
// names that were never registered, instructions whose result type cannot be resolved,
// gradient specifications naming members or updating nothing, and in-place groups that
// are unresolved, read-only, or too small to alias anything. Each variant carries the
// offending entity's name so diagnostics can point at the exact registration call that
// went wrong. The module also provides SchemaResult<T> as a convenience type alias for
// Result<T, SchemaError>. Any of these errors aborts the run before emission starts,
// guaranteeing the four output destinations are never left mutually inconsistent.

//! Error types for the schema engine.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for catalogue registration and validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate name '{name}' on {owner}")]
    DuplicateName {
        /// The colliding name.
        name: String,
        /// The catalogue or descriptor carrying the collision.
        owner: String,
    },

    #[error("'{instr}' references unknown name '{name}'")]
    UnknownReference {
        instr: String,
        name: String,
    },

    #[error("instruction '{instr}' has no resolvable result type")]
    UnresolvedResultType {
        instr: String,
    },

    #[error("gradient of '{instr}' names '{name}', which is not an operand")]
    InvalidGradientOperand {
        instr: String,
        name: String,
    },

    #[error("gradient of '{instr}' updates no operands")]
    EmptyGradientTarget {
        instr: String,
    },

    #[error("in-place group on '{instr}' references unknown operand '{name}'")]
    InPlaceUnresolved {
        instr: String,
        name: String,
    },

    #[error("in-place group on '{instr}' has no writable operand")]
    InPlaceReadOnly {
        instr: String,
    },

    #[error("in-place group on '{instr}' needs at least two operands")]
    InPlaceTooSmall {
        instr: String,
    },

    #[error("extra method on '{instr}' is empty")]
    EmptyExtraMethod {
        instr: String,
    },
}

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
