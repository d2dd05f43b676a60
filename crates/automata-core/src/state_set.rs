use crate::State;

/// Strictly ascending, duplicate-free set of state IDs backed by a plain
/// vector. Insertion of an already-present state is a no-op, so the vector
/// can be used directly as a canonical set representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet {
    states: Vec<State>,
}

impl StateSet {
    pub fn new() -> Self {
        StateSet { states: Vec::new() }
    }

    pub fn singleton(state: State) -> Self {
        StateSet {
            states: vec![state],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn contains(&self, state: State) -> bool {
        self.states.binary_search(&state).is_ok()
    }

    /// Insert a state, keeping the ascending order. Returns true if the
    /// state was not present yet.
    pub fn insert(&mut self, state: State) -> bool {
        match self.states.binary_search(&state) {
            Ok(_) => false,
            Err(pos) => {
                self.states.insert(pos, state);
                true
            }
        }
    }

    /// Merge another set into this one.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.is_empty() {
            return;
        }
        // Common case when building automata: everything appended at the end.
        if self.is_empty() || other.states[0] > *self.states.last().unwrap() {
            self.states.extend_from_slice(&other.states);
            return;
        }
        // Linear two-pointer merge of the sorted runs.
        let mut merged = Vec::with_capacity(self.states.len() + other.states.len());
        let (mut i, mut j) = (0, 0);
        while i < self.states.len() && j < other.states.len() {
            match self.states[i].cmp(&other.states[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(self.states[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(other.states[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(self.states[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&self.states[i..]);
        merged.extend_from_slice(&other.states[j..]);
        self.states = merged;
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.states.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[State] {
        &self.states
    }

    /// Largest state in the set, or None when empty.
    #[inline]
    pub fn max(&self) -> Option<State> {
        self.states.last().copied()
    }
}

impl From<Vec<State>> for StateSet {
    fn from(mut states: Vec<State>) -> Self {
        states.sort_unstable();
        states.dedup();
        StateSet { states }
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        StateSet::from(iter.into_iter().collect::<Vec<State>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut set = StateSet::new();
        for s in [5, 1, 3, 2, 4] {
            assert!(set.insert(s));
        }
        assert_eq!(set.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_insert_idempotent() {
        let mut set = StateSet::from(vec![1, 2, 3]);
        assert!(!set.insert(2));
        assert_eq!(set.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_from_unsorted_vec() {
        let set = StateSet::from(vec![3, 1, 3, 0, 1]);
        assert_eq!(set.as_slice(), &[0, 1, 3]);
    }

    #[test]
    fn test_union_with() {
        let mut a = StateSet::from(vec![0, 2, 4]);
        let b = StateSet::from(vec![1, 2, 5]);
        a.union_with(&b);
        assert_eq!(a.as_slice(), &[0, 1, 2, 4, 5]);
    }

    #[test]
    fn test_union_interleaved_with_duplicates() {
        let mut a = StateSet::from(vec![1, 3, 5, 7, 9]);
        let b = StateSet::from(vec![0, 3, 4, 7, 8, 10]);
        a.union_with(&b);
        assert_eq!(a.as_slice(), &[0, 1, 3, 4, 5, 7, 8, 9, 10]);

        // Union with itself is the identity.
        let before = a.clone();
        let copy = a.clone();
        a.union_with(&copy);
        assert_eq!(a, before);
    }

    #[test]
    fn test_union_append_fast_path() {
        let mut a = StateSet::from(vec![0, 1]);
        a.union_with(&StateSet::from(vec![2, 3]));
        assert_eq!(a.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_contains() {
        let set = StateSet::from(vec![1, 4, 9]);
        assert!(set.contains(4));
        assert!(!set.contains(5));
        assert_eq!(set.max(), Some(9));
    }
}
