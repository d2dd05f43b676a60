use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::nfa::Nfa;
use crate::state_set::StateSet;
use crate::{State, Symbol};

pub type Word = Vec<Symbol>;
pub type WordSet = FxHashSet<Word>;

const UNREACHABLE: usize = usize::MAX;

/// Per-state map of the shortest words accepted from that state.
///
/// Distances to a final state are found by breadth-first search over the
/// reverted automaton, then the word sets are filled in by increasing
/// distance. Every transition counts as consuming its symbol, so the map is
/// meaningful for automata without spontaneous transitions.
pub struct ShortestWordsMap {
    dist: Vec<usize>,
    words: Vec<WordSet>,
}

impl ShortestWordsMap {
    pub fn new(nfa: &Nfa) -> Self {
        let num_states = nfa.num_of_states();
        let mut dist = vec![UNREACHABLE; num_states];
        let mut words: Vec<WordSet> = vec![WordSet::default(); num_states];

        // 1. Distance to acceptance, backwards from the final states.
        let reverted = nfa.revert();
        let mut queue: VecDeque<State> = VecDeque::new();
        for final_state in nfa.final_states.iter() {
            dist[final_state as usize] = 0;
            queue.push_back(final_state);
        }
        while let Some(state) = queue.pop_front() {
            for post in reverted.delta.state_post(state) {
                for predecessor in post.targets.iter() {
                    if dist[predecessor as usize] == UNREACHABLE {
                        dist[predecessor as usize] = dist[state as usize] + 1;
                        queue.push_back(predecessor);
                    }
                }
            }
        }

        // 2. Word sets by increasing distance: prepend each symbol leading
        // one step closer to acceptance.
        let mut by_dist: Vec<State> = (0..num_states as State)
            .filter(|&s| dist[s as usize] != UNREACHABLE)
            .collect();
        by_dist.sort_unstable_by_key(|&s| dist[s as usize]);

        for &state in &by_dist {
            let d = dist[state as usize];
            if d == 0 {
                words[state as usize].insert(Word::new());
                continue;
            }
            let mut shortest = WordSet::default();
            for post in nfa.delta.state_post(state) {
                for target in post.targets.iter() {
                    if dist[target as usize] == d - 1 {
                        for suffix in &words[target as usize] {
                            let mut word = Word::with_capacity(suffix.len() + 1);
                            word.push(post.symbol);
                            word.extend_from_slice(suffix);
                            shortest.insert(word);
                        }
                    }
                }
            }
            words[state as usize] = shortest;
        }

        ShortestWordsMap { dist, words }
    }

    /// Shortest words accepted from `state`; empty when no final state is
    /// reachable.
    pub fn shortest_words_for(&self, state: State) -> &WordSet {
        &self.words[state as usize]
    }

    /// Shortest words accepted from any state in `states`: the union over
    /// the states realizing the minimum distance.
    pub fn shortest_words_for_set(&self, states: &StateSet) -> WordSet {
        let best = states
            .iter()
            .map(|s| self.dist[s as usize])
            .min()
            .unwrap_or(UNREACHABLE);
        let mut result = WordSet::default();
        if best == UNREACHABLE {
            return result;
        }
        for state in states.iter() {
            if self.dist[state as usize] == best {
                result.extend(self.words[state as usize].iter().cloned());
            }
        }
        result
    }
}

/// The shortest words accepted by the whole automaton.
pub fn shortest_words(nfa: &Nfa) -> WordSet {
    ShortestWordsMap::new(nfa).shortest_words_for_set(&nfa.initial)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = 'a' as Symbol;
    const B: Symbol = 'b' as Symbol;

    fn word_set(words: &[&[Symbol]]) -> WordSet {
        words.iter().map(|w| w.to_vec()).collect()
    }

    #[test]
    fn test_shortest_word_single() {
        let mut nfa = Nfa::new();
        nfa.delta.add_set(0, A, &StateSet::from(vec![0, 1]));
        nfa.delta.add(1, B, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        assert_eq!(shortest_words(&nfa), word_set(&[&[A, B]]));
    }

    #[test]
    fn test_shortest_words_branching() {
        // Two shortest words of equal length: "ab" and "ba".
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 1);
        nfa.delta.add(0, B, 2);
        nfa.delta.add(1, B, 3);
        nfa.delta.add(2, A, 3);
        nfa.add_initial_state(0);
        nfa.add_final_state(3);

        assert_eq!(shortest_words(&nfa), word_set(&[&[A, B], &[B, A]]));
    }

    #[test]
    fn test_per_state_lookup() {
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 1);
        nfa.delta.add(1, B, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        let map = ShortestWordsMap::new(&nfa);
        assert_eq!(map.shortest_words_for(1), &word_set(&[&[B]]));
        assert_eq!(map.shortest_words_for(2), &word_set(&[&[]]));
    }

    #[test]
    fn test_accepting_empty_word() {
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 0);
        nfa.add_initial_state(0);
        nfa.add_final_state(0);

        assert_eq!(shortest_words(&nfa), word_set(&[&[]]));
    }

    #[test]
    fn test_no_accepting_path() {
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 1);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        assert!(shortest_words(&nfa).is_empty());
    }

    #[test]
    fn test_set_query_takes_minimum_layer() {
        // From state 1 the shortest word is "b"; from state 0 it is "ab".
        let mut nfa = Nfa::new();
        nfa.delta.add(0, A, 1);
        nfa.delta.add(1, B, 2);
        nfa.add_initial_state(0);
        nfa.add_final_state(2);

        let map = ShortestWordsMap::new(&nfa);
        let both = StateSet::from(vec![0, 1]);
        assert_eq!(map.shortest_words_for_set(&both), word_set(&[&[B]]));
    }
}
