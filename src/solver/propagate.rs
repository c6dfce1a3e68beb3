use log::trace;

use crate::{
    error::{Result, SolverError},
    types::Literal,
};

use super::{assignment::Reason, Solver};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Done,
    Conflict { i_clause: usize, level: usize },
}

enum Visit {
    Idle,
    Conflict,
}

impl Solver {
    /// Makes `lit` true and queues its complement, which just became false.
    pub(super) fn enqueue(&mut self, lit: Literal, reason: Reason) -> Result<()> {
        self.assignment.set(lit, reason)?;
        self.pending.push_back(lit.negate());
        Ok(())
    }

    /// Drains the queue of falsified literals, visiting only the clauses
    /// watching them.
    pub(super) fn propagate(&mut self) -> Result<Propagation> {
        while let Some(false_lit) = self.pending.pop_front() {
            // replace_watch edits this list while we walk it
            let watching = self.watches.watchers(false_lit).to_vec();

            for i_clause in watching {
                if let Visit::Conflict = self.visit(i_clause, false_lit)? {
                    return Ok(Propagation::Conflict {
                        i_clause,
                        level: self.assignment.last_level(),
                    });
                }
            }
        }

        Ok(Propagation::Done)
    }

    fn visit(&mut self, i_clause: usize, false_lit: Literal) -> Result<Visit> {
        let other = match *self.watches.watched(i_clause) {
            // a falsified unit clause
            [lit] if lit == false_lit => return Ok(Visit::Conflict),
            [lit0, lit1] if lit0 == false_lit => lit1,
            [lit0, lit1] if lit1 == false_lit => lit0,
            _ => {
                return Err(SolverError::InvariantViolation(format!(
                    "clause {i_clause} listed under {false_lit} without watching it"
                )))
            }
        };

        if self.assignment.eval(other) == Some(true) {
            return Ok(Visit::Idle);
        }

        let mut replacement = None;
        for &lit in &self.clauses[i_clause] {
            if lit == false_lit || lit == other {
                continue;
            }
            match self.assignment.eval(lit) {
                Some(true) => return Ok(Visit::Idle),
                Some(false) => (),
                None => {
                    replacement = Some(lit);
                    break;
                }
            }
        }

        if let Some(new) = replacement {
            self.watches.replace_watch(i_clause, false_lit, new);
            return Ok(Visit::Idle);
        }

        match self.assignment.eval(other) {
            None => {
                trace!("propagate {other} by clause {i_clause}");
                self.stats.propagations += 1;
                self.enqueue(other, Reason::Propagation { i_clause })?;
                Ok(Visit::Idle)
            }
            Some(false) => Ok(Visit::Conflict),
            Some(true) => Ok(Visit::Idle),
        }
    }
}
