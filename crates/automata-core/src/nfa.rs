use rustc_hash::FxHashSet;

use crate::delta::Delta;
use crate::state_set::StateSet;
use crate::{State, Symbol, EPSILON};

/// A witness for an accepted word: the word together with the state
/// sequence traversed, including states entered by spontaneous transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub word: Vec<Symbol>,
    pub path: Vec<State>,
}

/// A nondeterministic finite automaton: transition relation plus initial
/// and final state sets.
///
/// Invariant: every state referenced by `initial`, `final_states`, or any
/// transition is below `delta.num_of_states()`. The mutators below grow the
/// relation to keep this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nfa {
    pub delta: Delta,
    pub initial: StateSet,
    pub final_states: StateSet,
}

impl Nfa {
    pub fn new() -> Self {
        Nfa::default()
    }

    #[inline]
    pub fn num_of_states(&self) -> usize {
        self.delta.num_of_states()
    }

    /// Allocate a fresh state and return its ID.
    pub fn add_state(&mut self) -> State {
        self.delta.add_state()
    }

    pub fn add_initial_state(&mut self, state: State) {
        self.delta.allocate(state as usize + 1);
        self.initial.insert(state);
    }

    pub fn add_final_state(&mut self, state: State) {
        self.delta.allocate(state as usize + 1);
        self.final_states.insert(state);
    }

    /// Reference acceptance oracle: does the automaton accept `word`?
    ///
    /// Spontaneous transitions are those labelled exactly `EPSILON`; use
    /// [`simulate_with`](Nfa::simulate_with) for a different threshold.
    pub fn simulate(&self, word: &[Symbol]) -> bool {
        self.simulate_with(word, EPSILON)
    }

    /// Acceptance oracle with an explicit first-epsilon threshold: every
    /// symbol `>= first_epsilon` is taken without consuming input.
    ///
    /// Exhaustive nondeterministic depth-first search. Visited
    /// `(state, input index)` pairs are tracked so that cycles of
    /// spontaneous transitions cannot loop the search.
    pub fn simulate_with(&self, word: &[Symbol], first_epsilon: Symbol) -> bool {
        self.find_run_with(word, first_epsilon).is_some()
    }

    /// Like [`simulate`](Nfa::simulate), but returns the accepting run.
    pub fn find_run(&self, word: &[Symbol]) -> Option<Run> {
        self.find_run_with(word, EPSILON)
    }

    pub fn find_run_with(&self, word: &[Symbol], first_epsilon: Symbol) -> Option<Run> {
        let mut visited: FxHashSet<(State, usize)> = FxHashSet::default();
        let mut path: Vec<State> = Vec::new();
        for state in self.initial.iter() {
            if self.run_from(state, word, 0, first_epsilon, &mut visited, &mut path) {
                return Some(Run {
                    word: word.to_vec(),
                    path,
                });
            }
        }
        None
    }

    fn run_from(
        &self,
        state: State,
        word: &[Symbol],
        index: usize,
        first_epsilon: Symbol,
        visited: &mut FxHashSet<(State, usize)>,
        path: &mut Vec<State>,
    ) -> bool {
        if !visited.insert((state, index)) {
            return false;
        }
        path.push(state);

        if index == word.len() && self.final_states.contains(state) {
            return true;
        }

        let row = self.delta.state_post(state);

        // Consuming step on the next input symbol.
        if index < word.len() && word[index] < first_epsilon {
            if let Some(post) = row.symbol_post(word[index]) {
                for target in post.targets.iter() {
                    if self.run_from(target, word, index + 1, first_epsilon, visited, path) {
                        return true;
                    }
                }
            }
        }

        // Spontaneous steps: the epsilon-class suffix of the row.
        for post in &row.as_slice()[row.first_epsilon_index(first_epsilon)..] {
            for target in post.targets.iter() {
                if self.run_from(target, word, index, first_epsilon, visited, path) {
                    return true;
                }
            }
        }

        path.pop();
        false
    }

    /// The automaton with every transition reversed and initial/final
    /// states swapped. Accepts exactly the reversals of accepted words.
    pub fn revert(&self) -> Nfa {
        let mut result = Nfa::new();
        result.delta.allocate(self.num_of_states());
        for (source, symbol, target) in self.delta.transitions() {
            result.delta.add(target, symbol, source);
        }
        result.initial = self.final_states.clone();
        result.final_states = self.initial.clone();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = 'a' as Symbol;
    const B: Symbol = 'b' as Symbol;

    /// `lhs.add(0,'a',{0,1}); lhs.add(1,'b',2); initial={0}; final={2}`.
    fn aab_nfa() -> Nfa {
        let mut nfa = Nfa::new();
        nfa.delta.add_set(0, A, &StateSet::from(vec![0, 1]));
        nfa.delta.add(1, B, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);
        nfa
    }

    #[test]
    fn test_simulate_branching() {
        let nfa = aab_nfa();
        assert!(nfa.simulate(&[A, B]));
        assert!(nfa.simulate(&[A, A, B]));
        assert!(!nfa.simulate(&[A]));
        assert!(!nfa.simulate(&[B, A]));
        assert!(!nfa.simulate(&[]));
    }

    #[test]
    fn test_simulate_epsilon_bridge() {
        // 0 -a-> 1 -eps-> 2 (final)
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 1);
        nfa.delta.add(1, EPSILON, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        assert!(nfa.simulate(&[A]));
        assert!(!nfa.simulate(&[]));
    }

    #[test]
    fn test_simulate_epsilon_cycle_terminates() {
        // Spontaneous cycle 0 <-> 1 with no way to consume input.
        let mut nfa = Nfa::new();
        nfa.delta.add(0, EPSILON, 1);
        nfa.delta.add(1, EPSILON, 0);
        nfa.add_initial_state(0);
        nfa.add_final_state(1);

        assert!(nfa.simulate(&[]));
        assert!(!nfa.simulate(&[A]));
    }

    #[test]
    fn test_simulate_epsilon_self_loop_rejects() {
        let mut nfa = Nfa::new();
        nfa.delta.add(0, EPSILON, 0);
        nfa.add_initial_state(0);
        nfa.add_final_state(1);

        assert!(!nfa.simulate(&[]));
    }

    #[test]
    fn test_simulate_with_threshold() {
        // Symbol 100 is spontaneous under first_epsilon = 50.
        let mut nfa = Nfa::new();
        nfa.delta.add(0, 100, 1);
        nfa.delta.add(1, 3, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        assert!(nfa.simulate_with(&[3], 50));
        assert!(!nfa.simulate(&[3]));
    }

    #[test]
    fn test_find_run_witness() {
        let nfa = aab_nfa();
        let run = nfa.find_run(&[A, B]).unwrap();
        assert_eq!(run.word, vec![A, B]);
        assert_eq!(run.path.first(), Some(&0));
        assert_eq!(run.path.last(), Some(&2));
        assert!(nfa.find_run(&[B]).is_none());
    }

    #[test]
    fn test_revert_reverses_language() {
        let nfa = aab_nfa();
        let rev = nfa.revert();
        assert!(rev.simulate(&[B, A]));
        assert!(rev.simulate(&[B, A, A]));
        assert!(!rev.simulate(&[A, B]));
        assert_eq!(rev.num_of_states(), nfa.num_of_states());
    }

    #[test]
    fn test_add_initial_final_idempotent() {
        let mut nfa = Nfa::new();
        nfa.add_initial_state(1);
        nfa.add_initial_state(1);
        nfa.add_final_state(0);
        nfa.add_final_state(0);
        assert_eq!(nfa.initial.len(), 1);
        assert_eq!(nfa.final_states.len(), 1);
        assert_eq!(nfa.num_of_states(), 2);
    }
}
