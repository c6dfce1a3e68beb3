use crate::{
    error::{Result, SolverError},
    types::{Clause, Literal, Var},
};

use super::map::VarMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    Decision,
    Propagation { i_clause: usize },
}

#[derive(Clone)]
struct VarData {
    value: bool,
    level: usize,
    reason: Reason,
}

/// The assignment trail: current values, their levels and reasons,
/// and the chronological order in which they were made.
pub struct Assignment {
    data: VarMap<Option<VarData>>,
    trail: Vec<Literal>,
    // trail position at which each decision level starts
    levels: Vec<usize>,
    saved: VarMap<Option<bool>>,
}

impl Assignment {
    pub fn new(max_var: Var) -> Self {
        Self {
            data: VarMap::new(max_var),
            trail: vec![],
            levels: vec![],
            saved: VarMap::new(max_var),
        }
    }

    /// Records `var = value` at the current decision level.
    pub fn assign(&mut self, var: Var, value: bool, antecedent: Option<usize>) -> Result<()> {
        if self.data[var].is_some() {
            return Err(SolverError::DuplicateAssignment { var });
        }

        let reason = match antecedent {
            Some(i_clause) => Reason::Propagation { i_clause },
            None => Reason::Decision,
        };
        self.data[var] = Some(VarData {
            value,
            level: self.last_level(),
            reason,
        });
        self.saved[var] = Some(value);
        self.trail.push(Literal::new(var, !value));
        Ok(())
    }

    /// Makes `lit` true.
    pub fn set(&mut self, lit: Literal, reason: Reason) -> Result<()> {
        let antecedent = match reason {
            Reason::Decision => None,
            Reason::Propagation { i_clause } => Some(i_clause),
        };
        self.assign(lit.var, lit.is_positive(), antecedent)
    }

    pub fn unassign(&mut self, var: Var) {
        if self.data[var].take().is_none() {
            return;
        }
        if let Some(pos) = self.trail.iter().rposition(|lit| lit.var == var) {
            self.trail.remove(pos);
            for start in &mut self.levels {
                if *start > pos {
                    *start -= 1;
                }
            }
        }
    }

    pub fn eval(&self, lit: Literal) -> Option<bool> {
        self.data[lit.var]
            .as_ref()
            .map(|data| data.value == lit.is_positive())
    }

    /// Like `eval`, but an unassigned variable is an error.
    pub fn value_of(&self, lit: Literal) -> Result<bool> {
        self.eval(lit)
            .ok_or(SolverError::Unassigned { var: lit.var })
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.data[var].is_some()
    }

    pub fn trail(&self) -> &[Literal] {
        &self.trail
    }

    pub fn level(&self, var: Var) -> Option<usize> {
        self.data[var].as_ref().map(|data| data.level)
    }

    pub fn reason(&self, var: Var) -> Option<Reason> {
        self.data[var].as_ref().map(|data| data.reason)
    }

    /// Value the variable held most recently, even if unassigned since.
    pub fn saved_value(&self, var: Var) -> Option<bool> {
        self.saved[var]
    }

    pub fn last_level(&self) -> usize {
        self.levels.len()
    }

    pub fn increment_level(&mut self) {
        self.levels.push(self.trail.len());
    }

    /// Closes the innermost level without touching its assignments.
    /// Only meaningful right after those assignments were rolled back.
    pub fn decrement_level(&mut self) {
        self.levels.pop();
    }

    /// Erases every assignment made above `level`, newest first.
    pub fn backtrack(&mut self, level: usize) {
        if level >= self.last_level() {
            return;
        }
        let start = self.levels[level];
        while self.levels.len() > level {
            self.decrement_level();
        }
        while self.trail.len() > start {
            if let Some(lit) = self.trail.pop() {
                self.data[lit.var] = None;
            }
        }
    }

    /// Whether every clause has a literal that is currently true.
    pub fn satisfies<'a>(&self, clauses: impl IntoIterator<Item = &'a Clause>) -> bool {
        clauses
            .into_iter()
            .all(|clause| clause.iter().any(|&lit| self.eval(lit) == Some(true)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::SolverError,
        types::{Formula, Literal},
    };

    use super::{Assignment, Reason};

    fn lit(dimacs: i32) -> Literal {
        Literal::from_dimacs(dimacs)
    }

    #[test]
    fn basic() {
        let mut ass = Assignment::new(2);

        assert_eq!(ass.last_level(), 0);

        ass.increment_level();
        ass.set(lit(1), Reason::Decision).unwrap();
        ass.set(lit(-2), Reason::Propagation { i_clause: 0 }).unwrap();

        assert_eq!(ass.last_level(), 1);
        assert_eq!(ass.level(1), Some(1));
        assert_eq!(ass.level(2), Some(1));
        assert_eq!(ass.eval(lit(2)), Some(false));
        assert_eq!(ass.reason(2), Some(Reason::Propagation { i_clause: 0 }));

        ass.backtrack(0);
        assert_eq!(ass.last_level(), 0);
        assert_eq!(ass.eval(lit(2)), None);
        assert_eq!(ass.eval(lit(1)), None);
        assert_eq!(ass.saved_value(2), Some(false));
    }

    #[test]
    fn duplicate_and_lookup_errors() {
        let mut ass = Assignment::new(3);
        ass.assign(3, true, None).unwrap();
        assert_eq!(
            ass.assign(3, false, None),
            Err(SolverError::DuplicateAssignment { var: 3 })
        );
        assert_eq!(ass.value_of(lit(-3)), Ok(false));
        assert_eq!(ass.value_of(lit(1)), Err(SolverError::Unassigned { var: 1 }));
    }

    #[test]
    fn backtrack_keeps_lower_levels_in_order() {
        let mut ass = Assignment::new(6);
        ass.assign(1, true, Some(0)).unwrap();
        for var in 2..=6 {
            ass.increment_level();
            ass.assign(var, var % 2 == 0, None).unwrap();
        }

        ass.backtrack(3);
        assert_eq!(ass.last_level(), 3);
        let vars: Vec<_> = ass.trail().iter().map(|lit| lit.var).collect();
        assert_eq!(vars, vec![1, 2, 3, 4]);
        assert!(ass
            .trail()
            .iter()
            .all(|lit| ass.level(lit.var).unwrap() <= 3));

        // rolling back to a level at or above the current one is a no-op
        ass.backtrack(5);
        assert_eq!(ass.trail().len(), 4);
    }

    #[test]
    fn unassign_keeps_level_boundaries() {
        let mut ass = Assignment::new(4);
        ass.assign(1, true, Some(0)).unwrap();
        ass.assign(2, true, Some(1)).unwrap();
        ass.increment_level();
        ass.assign(3, false, None).unwrap();
        ass.assign(4, false, Some(2)).unwrap();

        ass.unassign(2);
        ass.unassign(2);
        assert!(!ass.is_assigned(2));

        ass.backtrack(0);
        let vars: Vec<_> = ass.trail().iter().map(|lit| lit.var).collect();
        assert_eq!(vars, vec![1]);
    }

    #[test]
    fn satisfies() {
        let formula = Formula::from_dimacs(vec![vec![1, 2], vec![-1, 2]]);
        let mut ass = Assignment::new(2);
        ass.assign(2, false, None).unwrap();
        assert!(!ass.satisfies(&formula.clauses));
        ass.assign(1, true, None).unwrap();
        assert!(!ass.satisfies(&formula.clauses));
        ass.unassign(2);
        ass.assign(2, true, None).unwrap();
        assert!(ass.satisfies(&formula.clauses));
    }
}
