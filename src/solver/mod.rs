mod assignment;
mod branching;
mod map;
mod propagate;
mod restart;
mod watch;

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{debug, info, trace};

use crate::{
    config::{Phase, SolverConfig},
    error::{Result, SolverError},
    types::{Clause, Formula, Literal, Proof, ProofStep, Solution, Var},
};

use self::{
    map::VarMap,
    propagate::Propagation,
    restart::Restarts,
    watch::WatchIndex,
};

pub use self::{
    assignment::{Assignment, Reason},
    branching::{Branching, Evsids, Ordered},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
    pub learned: u64,
}

struct Analysis {
    learnt: Clause,
    backjump: usize,
}

pub struct Solver {
    // original clauses followed by learnt ones; indices stay valid
    clauses: Vec<Clause>,
    variables: Vec<Var>,
    has_empty: bool,

    assignment: Assignment,
    // scratch flags for `analyze`, all false between conflicts
    seen: VarMap<bool>,

    watches: WatchIndex,
    // literals that became false and still need to be visited
    pending: VecDeque<Literal>,

    branching: Box<dyn Branching + Send>,
    restarts: Restarts,

    config: SolverConfig,
    stats: Stats,
    interrupt: Option<Arc<AtomicBool>>,

    proof: Option<Proof>,
}

impl Solver {
    pub fn new(formula: Formula) -> Self {
        Self::create(formula, SolverConfig::default(), None)
    }

    pub fn with_config(formula: Formula, config: SolverConfig) -> Self {
        Self::create(formula, config, None)
    }

    pub fn with_proof(formula: Formula, config: SolverConfig) -> Self {
        Self::create(formula, config, Some(vec![]))
    }

    fn create(formula: Formula, config: SolverConfig, proof: Option<Proof>) -> Self {
        let max_var = formula.max_var();
        let Formula { clauses, variables } = formula;
        let variables: Vec<Var> = variables.into_iter().collect();

        let mut solver = Solver {
            clauses: Vec::with_capacity(clauses.len()),
            has_empty: false,
            assignment: Assignment::new(max_var),
            seen: VarMap::new(max_var),
            watches: WatchIndex::new(max_var),
            pending: VecDeque::new(),
            branching: branching::create(config.heuristic, &variables),
            restarts: Restarts::new(config.restart),
            variables,
            config,
            stats: Stats::default(),
            interrupt: None,
            proof,
        };

        for mut clause in clauses {
            clause.sort();
            clause.dedup();
            solver.has_empty |= clause.is_empty();
            solver.add(clause);
        }

        solver
    }

    /// Stops the search with `Solution::Unknown` once `flag` is raised.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    /// Replaces the decision heuristic chosen by the config.
    pub fn set_branching(&mut self, branching: Box<dyn Branching + Send>) {
        self.branching = branching;
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    fn add(&mut self, clause: Clause) -> usize {
        let i = self.clauses.len();
        self.watches.register_clause(i, &clause);
        self.clauses.push(clause);
        i
    }

    fn level_of(&self, lit: Literal) -> Result<usize> {
        self.assignment
            .level(lit.var)
            .ok_or(SolverError::Unassigned { var: lit.var })
    }

    // based on minisat's basic clause minimization; `seen` marks the
    // variables of `learnt` and those false at level 0
    fn simplify(&self, learnt: &mut Clause) {
        let mut i = 1;
        while i < learnt.len() {
            if let Some(Reason::Propagation { i_clause }) = self.assignment.reason(learnt[i].var) {
                let remove = self.clauses[i_clause].iter().all(|&lit| {
                    self.seen[lit.var] || self.assignment.level(lit.var) == Some(0)
                });
                if remove {
                    learnt.swap_remove(i);
                    continue;
                }
            }
            i += 1;
        }
    }

    /// First-UIP learning: resolves the conflict clause against reasons
    /// of current-level literals, newest first, until one is left.
    fn analyze(&mut self, i_conflict: usize) -> Result<Analysis> {
        let last_level = self.assignment.last_level();
        if last_level == 0 {
            return Ok(Analysis {
                learnt: vec![],
                backjump: 0,
            });
        }

        // slot 0 is reserved for the asserting literal
        let mut learnt = vec![Literal::new(1, false)];
        let mut touched = vec![];
        // seen literals at `last_level` not yet resolved away
        let mut open = 0;
        let mut i_clause = i_conflict;
        let mut on_var = None;
        let mut i_trail = self.assignment.trail().len();

        let uip = loop {
            for k in 0..self.clauses[i_clause].len() {
                let lit = self.clauses[i_clause][k];
                if on_var == Some(lit.var) || self.seen[lit.var] {
                    continue;
                }
                let level = self.level_of(lit)?;
                self.seen[lit.var] = true;
                touched.push(lit.var);
                self.branching.bump(lit.var);

                if level == last_level {
                    open += 1;
                } else if level > 0 {
                    // literals false at level 0 stay false for good
                    learnt.push(lit);
                }
            }
            if open == 0 {
                return Err(SolverError::InvariantViolation(format!(
                    "learnt clause has no literal at conflict level {last_level}"
                )));
            }

            let on_lit = loop {
                if i_trail == 0 {
                    return Err(SolverError::InvariantViolation(
                        "trail exhausted before reaching the UIP".to_string(),
                    ));
                }
                i_trail -= 1;
                let lit = self.assignment.trail()[i_trail];
                if self.seen[lit.var] {
                    break lit;
                }
            };

            open -= 1;
            if open == 0 {
                break on_lit;
            }
            self.seen[on_lit.var] = false;

            i_clause = match self.assignment.reason(on_lit.var) {
                Some(Reason::Propagation { i_clause }) => i_clause,
                _ => {
                    return Err(SolverError::InvariantViolation(format!(
                        "resolution on decision variable {} before reaching the UIP",
                        on_lit.var
                    )))
                }
            };
            on_var = Some(on_lit.var);
        };
        learnt[0] = uip.negate();

        if self.config.minimize {
            self.simplify(&mut learnt);
        }
        for var in touched {
            self.seen[var] = false;
        }

        let backjump = if learnt.len() == 1 {
            0
        } else {
            let mut i_max = 1;
            let mut max_level = 0;
            for (i, &lit) in learnt.iter().enumerate().skip(1) {
                let level = self.level_of(lit)?;
                if level > max_level {
                    i_max = i;
                    max_level = level;
                }
            }
            learnt.swap(1, i_max);
            max_level
        };

        self.branching.decay();

        Ok(Analysis { learnt, backjump })
    }

    /// Backjumps, records `learnt` and asserts its first literal.
    fn learn(&mut self, learnt: Clause, backjump: usize) -> Result<()> {
        debug!(
            "learn {:?} (backjump {} -> {})",
            learnt.iter().map(|lit| lit.to_dimacs()).collect::<Vec<_>>(),
            self.assignment.last_level(),
            backjump
        );

        self.assignment.backtrack(backjump);
        self.pending.clear();

        if let Some(proof) = self.proof.as_mut() {
            proof.push((ProofStep::Add, learnt.clone()));
        }

        let lit_assert = learnt[0];
        let i_clause = self.add(learnt);
        self.stats.learned += 1;
        self.enqueue(lit_assert, Reason::Propagation { i_clause })
    }

    fn budget_exhausted(&self) -> bool {
        let conflicts = self
            .config
            .conflict_limit
            .is_some_and(|limit| self.stats.conflicts >= limit);
        let interrupted = self
            .interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        conflicts || interrupted
    }

    fn polarity(&self, var: Var) -> bool {
        match self.config.phase {
            Phase::Negative => false,
            Phase::Positive => true,
            Phase::Saved => self.assignment.saved_value(var).unwrap_or(false),
        }
    }

    fn unsat(&mut self) -> Solution {
        if let Some(proof) = self.proof.as_mut() {
            proof.push((ProofStep::Add, vec![]));
        }
        self.finish(Solution::Unsat)
    }

    fn sat(&mut self) -> Result<Solution> {
        debug_assert!(self.assignment.satisfies(&self.clauses));

        let mut model = Vec::with_capacity(self.variables.len());
        for &var in &self.variables {
            let value = self.assignment.value_of(Literal::new(var, false))?;
            model.push(Literal::new(var, !value));
        }
        Ok(self.finish(Solution::Sat { model }))
    }

    fn finish(&self, solution: Solution) -> Solution {
        let verdict = match solution {
            Solution::Sat { .. } => "sat",
            Solution::Unsat => "unsat",
            Solution::Unknown => "unknown",
        };
        info!("search.done({verdict}) {:?}", self.stats);
        solution
    }

    pub fn solve(&mut self) -> Result<Solution> {
        info!(
            "search.start ({} variables, {} clauses)",
            self.variables.len(),
            self.clauses.len()
        );

        if self.has_empty {
            return Ok(self.unsat());
        }

        for i_clause in 0..self.clauses.len() {
            let lit = match self.clauses[i_clause][..] {
                [lit] => lit,
                _ => continue,
            };
            match self.assignment.eval(lit) {
                None => self.enqueue(lit, Reason::Propagation { i_clause })?,
                Some(false) => return Ok(self.unsat()),
                Some(true) => (),
            }
        }

        loop {
            match self.propagate()? {
                Propagation::Conflict { i_clause, level } => {
                    trace!("conflict in clause {i_clause} at level {level}");
                    self.stats.conflicts += 1;
                    self.restarts.on_conflict();

                    let Analysis { learnt, backjump } = self.analyze(i_clause)?;
                    if learnt.is_empty() {
                        return Ok(self.unsat());
                    }
                    self.learn(learnt, backjump)?;
                }
                Propagation::Done => {
                    #[cfg(test)]
                    assert!(
                        self.watches_consistent(),
                        "watch index out of sync at level {}",
                        self.assignment.last_level()
                    );

                    let Some(var) = self.branching.choose(&self.assignment) else {
                        return self.sat();
                    };

                    if self.budget_exhausted() {
                        debug!("search.budget exhausted");
                        return Ok(self.finish(Solution::Unknown));
                    }

                    if self.assignment.last_level() > 0 && self.restarts.due() {
                        debug!("search.restart({})", self.stats.restarts);
                        self.stats.restarts += 1;
                        self.assignment.backtrack(0);
                    }

                    self.stats.decisions += 1;
                    self.assignment.increment_level();
                    let lit = Literal::new(var, !self.polarity(var));
                    trace!("decide {lit} at level {}", self.assignment.last_level());
                    self.enqueue(lit, Reason::Decision)?;
                }
            }
        }
    }

    /// Every clause of two or more literals without a true literal is
    /// watched on two distinct literals of its own, not both false.
    #[cfg(test)]
    fn watches_consistent(&self) -> bool {
        self.clauses.iter().enumerate().all(|(i, clause)| {
            let watched = self.watches.watched(i);
            if clause.len() < 2 || clause.iter().any(|&lit| self.assignment.eval(lit) == Some(true))
            {
                return true;
            }
            watched.len() == 2
                && watched[0] != watched[1]
                && watched.iter().all(|lit| clause.contains(lit))
                && watched
                    .iter()
                    .any(|&lit| self.assignment.eval(lit) != Some(false))
        })
    }
}

/// Checks `solution` against `formula` and the expected verdict.
pub fn verify(formula: &Formula, sat: bool, solution: &Solution) -> bool {
    match solution {
        Solution::Sat { model } => {
            if sat {
                let mut sorted = model.to_vec();
                sorted.sort();
                formula
                    .clauses
                    .iter()
                    .all(|clause| clause.iter().any(|lit| sorted.binary_search(lit).is_ok()))
            } else {
                false
            }
        }
        Solution::Unsat => !sat,
        Solution::Unknown => false,
    }
}
