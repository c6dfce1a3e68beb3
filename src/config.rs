//! Solver knobs.

/// Decision variable selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Heuristic {
    #[default]
    Evsids,
    /// Smallest unassigned variable; fully deterministic.
    Ordered,
}

/// Polarity given to decision variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    Negative,
    Positive,
    /// The variable's last value, negative if it never had one.
    #[default]
    Saved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Restart {
    /// Restart after `base * luby(i)` conflicts.
    Luby { base: usize },
    Never,
}

impl Default for Restart {
    fn default() -> Self {
        Restart::Luby { base: 16 }
    }
}

#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub heuristic: Heuristic,
    pub phase: Phase,
    pub restart: Restart,
    /// Give up with `Solution::Unknown` after this many conflicts.
    pub conflict_limit: Option<u64>,
    pub minimize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::default(),
            phase: Phase::default(),
            restart: Restart::default(),
            conflict_limit: None,
            minimize: true,
        }
    }
}
