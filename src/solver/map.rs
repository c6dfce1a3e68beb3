use std::ops::{Index, IndexMut};

use crate::types::{Literal, Var};

/// Dense map indexed by variable; slot 0 is unused.
pub struct VarMap<T>(Vec<T>);

impl<T: Clone + Default> VarMap<T> {
    pub fn new(max_var: Var) -> Self {
        Self(vec![Default::default(); max_var + 1])
    }
}

impl<T> Index<Var> for VarMap<T> {
    type Output = T;

    fn index(&self, index: Var) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> IndexMut<Var> for VarMap<T> {
    fn index_mut(&mut self, index: Var) -> &mut Self::Output {
        &mut self.0[index]
    }
}

/// Dense map indexed by literal, both polarities of every variable.
pub struct LitMap<T>(Vec<T>);

impl<T> LitMap<T> {
    fn position(lit: Literal) -> usize {
        2 * lit.var + lit.negated as usize
    }
}

impl<T: Clone + Default> LitMap<T> {
    pub fn new(max_var: Var) -> Self {
        Self(vec![Default::default(); 2 * (max_var + 1)])
    }
}

impl<T> Index<Literal> for LitMap<T> {
    type Output = T;

    fn index(&self, index: Literal) -> &Self::Output {
        &self.0[LitMap::<T>::position(index)]
    }
}

impl<T> IndexMut<Literal> for LitMap<T> {
    fn index_mut(&mut self, index: Literal) -> &mut Self::Output {
        &mut self.0[LitMap::<T>::position(index)]
    }
}
