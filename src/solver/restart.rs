use std::iter::Peekable;

use crate::config::Restart;

pub struct Luby {
    base: usize,
    uv: (isize, isize),
}

impl Luby {
    pub fn new(base: usize) -> Self {
        Self { base, uv: (1, 1) }
    }
}

impl Iterator for Luby {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let (u, v) = self.uv;
        // Based on Knuth's formula, see https://oeis.org/A182105.
        self.uv = if u & -u == v { (u + 1, 1) } else { (u, 2 * v) };
        Some(self.base * v as usize)
    }
}

/// Counts conflicts since the last restart against a schedule.
pub struct Restarts {
    threshold: Option<Peekable<Luby>>,
    conflicts: usize,
}

impl Restarts {
    pub fn new(restart: Restart) -> Self {
        let threshold = match restart {
            Restart::Luby { base } => Some(Luby::new(base).peekable()),
            Restart::Never => None,
        };
        Self {
            threshold,
            conflicts: 0,
        }
    }

    pub fn on_conflict(&mut self) {
        self.conflicts += 1;
    }

    /// Whether a restart is due; advances the schedule if so.
    pub fn due(&mut self) -> bool {
        let Some(threshold) = self.threshold.as_mut() else {
            return false;
        };
        match threshold.peek() {
            Some(&limit) if self.conflicts >= limit => {
                self.conflicts = 0;
                threshold.next();
                true
            }
            _ => false,
        }
    }
}
