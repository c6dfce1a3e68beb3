//! Error types for the solver and its DIMACS front end.

use thiserror::Error;

use crate::types::Var;

/// Programming-error states of the solving core.
///
/// None of these is reachable on a correct run; a solve call either
/// finishes with a verdict or reports one of these loudly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Truth value requested for a variable without a live assignment.
    #[error("variable {var} is unassigned")]
    Unassigned { var: Var },

    /// A variable was assigned while already holding a value.
    #[error("variable {var} is already assigned")]
    DuplicateAssignment { var: Var },

    /// Conflict analysis or search reached an impossible state.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Errors raised while reading a DIMACS CNF file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing problem line")]
    MissingHeader,

    #[error("malformed problem line: {0}")]
    BadHeader(String),

    #[error("line {line}: invalid literal `{token}`")]
    BadLiteral { line: usize, token: String },

    #[error("literal {lit} exceeds the declared {var_count} variables")]
    VarOutOfRange { lit: i32, var_count: usize },

    #[error("expected {expected} clauses, found {found}")]
    ClauseCount { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
