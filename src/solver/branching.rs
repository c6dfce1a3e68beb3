use crate::{config::Heuristic, types::Var};

use super::assignment::Assignment;

/// Picks the next decision variable.
///
/// Any implementation must eventually return every unassigned variable
/// it was built with, and `None` only once all of them are assigned.
pub trait Branching {
    /// Reports a variable that took part in a conflict.
    fn bump(&mut self, _var: Var) {}

    /// Called once per conflict, after all bumps.
    fn decay(&mut self) {}

    fn choose(&mut self, assignment: &Assignment) -> Option<Var>;
}

pub fn create(heuristic: Heuristic, vars: &[Var]) -> Box<dyn Branching + Send> {
    match heuristic {
        Heuristic::Evsids => Box::new(Evsids::new(vars)),
        Heuristic::Ordered => Box::new(Ordered::new(vars)),
    }
}

/// Smallest unassigned variable first.
pub struct Ordered {
    vars: Vec<Var>,
}

impl Ordered {
    pub fn new(vars: &[Var]) -> Self {
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        Self { vars }
    }
}

impl Branching for Ordered {
    fn choose(&mut self, assignment: &Assignment) -> Option<Var> {
        self.vars
            .iter()
            .copied()
            .find(|&var| !assignment.is_assigned(var))
    }
}

/// Max-heap of variables ordered by activity. Variables popped by
/// `choose` stay parked behind `len` until restored.
struct ActivityHeap {
    heap: Vec<Var>,
    // position of each variable in `heap`, indexed by variable
    pos: Vec<usize>,
    activity: Vec<f64>,
    len: usize,
}

impl ActivityHeap {
    fn new(vars: &[Var]) -> Self {
        let max_var = vars.iter().copied().max().unwrap_or(0);
        let mut pos = vec![0; max_var + 1];
        for (i, &var) in vars.iter().enumerate() {
            pos[var] = i;
        }

        Self {
            heap: vars.to_vec(),
            pos,
            activity: vec![0.0; max_var + 1],
            len: vars.len(),
        }
    }

    fn above(&self, i: usize, j: usize) -> bool {
        self.activity[self.heap[i]] > self.activity[self.heap[j]]
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.pos[self.heap[i]] = i;
        self.pos[self.heap[j]] = j;
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.above(i, parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let mut top = i;
            for child in [2 * i + 1, 2 * i + 2] {
                if child < self.len && self.above(child, top) {
                    top = child;
                }
            }
            if top == i {
                break;
            }
            self.swap(i, top);
            i = top;
        }
    }

    fn bump(&mut self, var: Var, amount: f64) {
        self.activity[var] += amount;
        let i = self.pos[var];
        if i < self.len {
            self.sift_up(i);
        }
    }

    /// Divides every activity by `factor`, which keeps the order.
    fn scale_down(&mut self, factor: f64) {
        for activity in &mut self.activity {
            *activity /= factor;
        }
    }

    fn top(&self) -> Option<Var> {
        (self.len > 0).then(|| self.heap[0])
    }

    fn park_top(&mut self) {
        if self.len > 0 {
            self.len -= 1;
            self.swap(0, self.len);
            self.sift_down(0);
        }
    }

    fn restore_all(&mut self) {
        while self.len < self.heap.len() {
            self.len += 1;
            self.sift_up(self.len - 1);
        }
    }
}

/// Exponential VSIDS: conflict variables are bumped by a growing
/// increment, so recent conflicts weigh more.
pub struct Evsids {
    increment: f64,
    seen: Vec<bool>,
    heap: ActivityHeap,
}

impl Evsids {
    const GROWTH: f64 = 1.01;
    const THRESHOLD: f64 = 1e100;

    pub fn new(vars: &[Var]) -> Self {
        let max_var = vars.iter().copied().max().unwrap_or(0);
        Self {
            increment: 1.0,
            seen: vec![false; max_var + 1],
            heap: ActivityHeap::new(vars),
        }
    }
}

impl Branching for Evsids {
    fn bump(&mut self, var: Var) {
        // once per conflict
        if !self.seen[var] {
            self.seen[var] = true;
            self.heap.bump(var, self.increment);
        }
    }

    fn decay(&mut self) {
        self.increment *= Self::GROWTH;

        if self.increment > Self::THRESHOLD {
            self.heap.scale_down(Self::THRESHOLD);
            self.increment /= Self::THRESHOLD;
        }

        self.seen.fill(false);
    }

    fn choose(&mut self, assignment: &Assignment) -> Option<Var> {
        let mut res = None;

        while let Some(var) = self.heap.top() {
            if !assignment.is_assigned(var) {
                res = Some(var);
                break;
            }
            self.heap.park_top();
        }
        self.heap.restore_all();

        res
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::assignment::Assignment;

    use super::{Branching, Evsids, Ordered};

    #[test]
    fn ordered_skips_assigned() {
        let mut ass = Assignment::new(7);
        let mut ordered = Ordered::new(&[7, 3, 5]);
        assert_eq!(ordered.choose(&ass), Some(3));

        ass.assign(3, true, None).unwrap();
        assert_eq!(ordered.choose(&ass), Some(5));

        ass.assign(5, true, None).unwrap();
        ass.assign(7, false, None).unwrap();
        assert_eq!(ordered.choose(&ass), None);
    }

    #[test]
    fn evsids_prefers_bumped() {
        let mut ass = Assignment::new(4);
        let mut evsids = Evsids::new(&[1, 2, 3, 4]);

        evsids.bump(3);
        evsids.decay();
        evsids.bump(2);
        evsids.bump(2);
        evsids.decay();
        evsids.bump(2);
        evsids.decay();

        assert_eq!(evsids.choose(&ass), Some(2));
        ass.assign(2, false, None).unwrap();
        assert_eq!(evsids.choose(&ass), Some(3));
    }

    #[test]
    fn evsids_covers_every_var() {
        let mut ass = Assignment::new(9);
        let mut evsids = Evsids::new(&[2, 4, 9]);
        let mut chosen = vec![];
        while let Some(var) = evsids.choose(&ass) {
            chosen.push(var);
            ass.assign(var, true, None).unwrap();
        }
        chosen.sort();
        assert_eq!(chosen, vec![2, 4, 9]);
    }
}
