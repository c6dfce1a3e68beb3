use std::{collections::BTreeSet, fmt};

pub type Var = usize;

/// A variable together with a polarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    pub var: Var,
    pub negated: bool,
}

impl Literal {
    pub fn new(var: Var, negated: bool) -> Self {
        assert_ne!(var, 0);
        Self { var, negated }
    }

    pub fn from_dimacs(lit: i32) -> Self {
        assert_ne!(lit, 0);
        Self::new(lit.unsigned_abs() as Var, lit < 0)
    }

    pub fn to_dimacs(self) -> i32 {
        let var = self.var as i32;
        if self.negated {
            -var
        } else {
            var
        }
    }

    /// The complementary literal. `self` is left untouched.
    pub fn negate(self) -> Self {
        Self {
            var: self.var,
            negated: !self.negated,
        }
    }

    pub fn is_positive(self) -> bool {
        !self.negated
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

pub type Clause = Vec<Literal>;

#[derive(Clone, Debug, Default)]
pub struct Formula {
    pub clauses: Vec<Clause>,
    pub variables: BTreeSet<Var>,
}

impl Formula {
    pub fn new(clauses: Vec<Clause>) -> Self {
        let variables = clauses.iter().flatten().map(|lit| lit.var).collect();
        Self { clauses, variables }
    }

    pub fn from_dimacs(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(
            clauses
                .into_iter()
                .map(|clause| clause.into_iter().map(Literal::from_dimacs).collect())
                .collect(),
        )
    }

    pub fn max_var(&self) -> Var {
        self.variables.last().copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solution {
    Sat { model: Vec<Literal> },
    Unsat,
    Unknown,
}

impl Solution {
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Sat { .. })
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Solution::Unsat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofStep {
    Add,
    Delete,
}

pub type Proof = Vec<(ProofStep, Clause)>;
