use crate::types::{Literal, Var};

use super::map::LitMap;

/// Two-way watch bookkeeping over clause indices.
///
/// `watchers[lit]` lists the clauses watching `lit`, `watched[c]` the
/// literals clause `c` is watched on: two for ordinary clauses, one for
/// unit clauses, none for the empty clause.
pub struct WatchIndex {
    watchers: LitMap<Vec<usize>>,
    watched: Vec<Vec<Literal>>,
}

impl WatchIndex {
    pub fn new(max_var: Var) -> Self {
        Self {
            watchers: LitMap::new(max_var),
            watched: vec![],
        }
    }

    /// Watches the first two literals of `clause`, which gets index
    /// `i_clause`. Clauses have to be registered in index order.
    pub fn register_clause(&mut self, i_clause: usize, clause: &[Literal]) {
        debug_assert_eq!(i_clause, self.watched.len());

        let watches: Vec<Literal> = clause.iter().copied().take(2).collect();
        for &lit in &watches {
            self.watchers[lit].push(i_clause);
        }
        self.watched.push(watches);
    }

    /// Moves the watch of clause `i_clause` from `old` to `new`.
    pub fn replace_watch(&mut self, i_clause: usize, old: Literal, new: Literal) {
        debug_assert!(!self.watched[i_clause].contains(&new));

        if let Some(slot) = self.watched[i_clause].iter_mut().find(|lit| **lit == old) {
            *slot = new;
        }
        self.watchers[old].retain(|&i| i != i_clause);
        self.watchers[new].push(i_clause);
    }

    pub fn watchers(&self, lit: Literal) -> &[usize] {
        &self.watchers[lit]
    }

    pub fn watched(&self, i_clause: usize) -> &[Literal] {
        &self.watched[i_clause]
    }
}

#[cfg(test)]
mod tests {
    use crate::types::Literal;

    use super::WatchIndex;

    fn lits(dimacs: &[i32]) -> Vec<Literal> {
        dimacs.iter().copied().map(Literal::from_dimacs).collect()
    }

    #[test]
    fn register() {
        let mut index = WatchIndex::new(3);
        index.register_clause(0, &lits(&[1, -2, 3]));
        index.register_clause(1, &lits(&[-2]));
        index.register_clause(2, &lits(&[]));

        assert_eq!(index.watched(0), lits(&[1, -2]).as_slice());
        assert_eq!(index.watched(1), lits(&[-2]).as_slice());
        assert!(index.watched(2).is_empty());
        assert_eq!(index.watchers(Literal::from_dimacs(-2)), &[0, 1]);
        assert!(index.watchers(Literal::from_dimacs(3)).is_empty());
    }

    #[test]
    fn replace() {
        let mut index = WatchIndex::new(3);
        index.register_clause(0, &lits(&[1, -2, 3]));
        index.replace_watch(0, Literal::from_dimacs(1), Literal::from_dimacs(3));

        assert_eq!(index.watched(0), lits(&[3, -2]).as_slice());
        assert!(index.watchers(Literal::from_dimacs(1)).is_empty());
        assert_eq!(index.watchers(Literal::from_dimacs(3)), &[0]);
        assert_eq!(index.watchers(Literal::from_dimacs(-2)), &[0]);
    }
}
