pub mod config;
pub mod error;
pub mod io;
pub mod parallel;
pub mod solver;
pub mod types;

pub use crate::{
    config::SolverConfig,
    error::{ParseError, SolverError},
    solver::Solver,
    types::{Clause, Formula, Literal, Solution, Var},
};

/// Decides `formula` with a fresh solver and the default configuration.
pub fn solve(formula: Formula) -> error::Result<Solution> {
    Solver::new(formula).solve()
}
