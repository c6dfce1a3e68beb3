//! Cube-and-conquer over independent solver instances.

use std::{
    collections::BinaryHeap,
    iter::zip,
    sync::{atomic::AtomicBool, atomic::Ordering, mpsc::channel, Arc},
    thread,
};

use log::debug;

use crate::{
    config::SolverConfig,
    error::Result,
    solver::Solver,
    types::{Formula, Literal, Solution, Var},
};

struct FrequentVars {
    heap: BinaryHeap<(usize, Var)>,
}

impl Iterator for FrequentVars {
    type Item = Var;

    fn next(&mut self) -> Option<Self::Item> {
        self.heap.pop().map(|(_, var)| var)
    }
}

fn frequent_vars(formula: &Formula) -> FrequentVars {
    let mut var_freq: Vec<usize> = vec![0; formula.max_var() + 1];

    for lit in formula.clauses.iter().flatten() {
        var_freq[lit.var] += 1;
    }

    FrequentVars {
        heap: formula
            .variables
            .iter()
            .map(|&var| (var_freq[var], var))
            .collect(),
    }
}

type Cube = Vec<Literal>;

fn cubes(vars: &[Var], n: usize) -> Vec<Cube> {
    assert!(n <= 1 << vars.len().min(usize::BITS as usize - 1));

    match n {
        0 => vec![],
        1 => vec![vec![]],
        _ => {
            let m = n / 2;
            let var = vars[0];

            let mut res1 = cubes(&vars[1..], m);
            for cube in &mut res1 {
                cube.push(Literal::new(var, false));
            }

            let mut res2 = cubes(&vars[1..], n - m);
            for cube in &mut res2 {
                cube.push(Literal::new(var, true));
            }

            res1.extend(res2);
            res1
        }
    }
}

/// Splits `formula` into at most `n` subformulas such that
/// the original formula is SAT iff at least one of the subformulas is.
fn split(formula: Formula, n: usize) -> Vec<Formula> {
    let vars: Vec<Var> = frequent_vars(&formula).take(n).collect();
    let n = n.clamp(1, 1 << vars.len().min(usize::BITS as usize - 1));
    let cubes = cubes(&vars, n);
    let mut subformulas = vec![formula; n];

    for (subformula, cube) in zip(subformulas.iter_mut(), cubes) {
        for lit in cube {
            subformula.clauses.push(vec![lit]);
        }
    }

    subformulas
}

/// Solves `formula` on `n` threads (all available cores if `None`).
///
/// Workers share nothing but a stop flag, raised by the first one to
/// find a model.
pub fn solve(formula: Formula, n: Option<usize>, config: &SolverConfig) -> Result<Solution> {
    let n = n.unwrap_or(
        thread::available_parallelism()
            .map(|val| val.get())
            .unwrap_or(2),
    );

    let subformulas = split(formula, n);
    let stop = Arc::new(AtomicBool::new(false));

    let (tx, rx) = channel::<Result<Solution>>();

    for (i, subformula) in subformulas.into_iter().enumerate() {
        let thread_tx = tx.clone();
        let stop = Arc::clone(&stop);
        let config = config.clone();
        thread::spawn(move || {
            let mut solver = Solver::with_config(subformula, config);
            solver.set_interrupt(stop);
            let solution = solver.solve();
            debug!("parallel.worker({i}) {:?}", solution.as_ref().map(verdict));
            let _ = thread_tx.send(solution);
        });
    }

    // receiver blocks as long as some tranmitter is alive
    drop(tx);

    let mut outcome = Ok(Solution::Unsat);
    for subsolution in rx {
        match subsolution {
            Ok(Solution::Sat { model }) => {
                stop.store(true, Ordering::Relaxed);
                return Ok(Solution::Sat { model });
            }
            Ok(Solution::Unsat) => (),
            Ok(Solution::Unknown) => {
                if outcome.is_ok() {
                    outcome = Ok(Solution::Unknown);
                }
            }
            Err(err) => outcome = Err(err),
        }
    }
    outcome
}

fn verdict(solution: &Solution) -> &'static str {
    match solution {
        Solution::Sat { .. } => "sat",
        Solution::Unsat => "unsat",
        Solution::Unknown => "unknown",
    }
}
