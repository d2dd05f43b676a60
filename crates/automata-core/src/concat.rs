use crate::nfa::Nfa;
use crate::State;

/// Marks an lhs state with no image in the result (lhs final states are
/// elided by the construction).
pub const ELIDED: State = State::MAX;

/// Concatenation of two automata by state renumbering, without introducing
/// spontaneous transitions.
///
/// Every non-final `lhs` state gets a fresh result ID in original order,
/// followed by every `rhs` state; `lhs` final states do not appear in the
/// result. Transitions touching an `lhs` final state are spliced through
/// the `rhs` initial states, so the seam can blow up by
/// `|lhs finals| * |rhs initials|` per transition. That cost is inherent to
/// the construction.
pub struct Concatenator<'a> {
    lhs: &'a Nfa,
    rhs: &'a Nfa,
    lhs_map: Vec<State>,
    rhs_map: Vec<State>,
    result: Nfa,
}

impl<'a> Concatenator<'a> {
    pub fn new(lhs: &'a Nfa, rhs: &'a Nfa) -> Self {
        let mut concatenator = Concatenator {
            lhs,
            rhs,
            lhs_map: Vec::new(),
            rhs_map: Vec::new(),
            result: Nfa::new(),
        };
        concatenator.map_states();
        concatenator.make_initial_states();
        concatenator.make_final_states();
        concatenator.add_lhs_transitions();
        concatenator.add_rhs_transitions();
        concatenator
    }

    pub fn into_result(self) -> Nfa {
        self.result
    }

    /// lhs -> result state map; `ELIDED` marks lhs final states.
    pub fn lhs_state_map(&self) -> &[State] {
        &self.lhs_map
    }

    /// rhs -> result state map.
    pub fn rhs_state_map(&self) -> &[State] {
        &self.rhs_map
    }

    fn map_states(&mut self) {
        let lhs_states = self.lhs.num_of_states();
        let rhs_states = self.rhs.num_of_states();

        self.lhs_map = vec![ELIDED; lhs_states];
        let mut next: State = 0;
        for lhs_state in 0..lhs_states as State {
            if !self.lhs.final_states.contains(lhs_state) {
                self.lhs_map[lhs_state as usize] = next;
                next += 1;
            }
        }
        self.rhs_map = (0..rhs_states as State).map(|s| next + s).collect();
        self.result.delta.allocate(next as usize + rhs_states);
    }

    fn make_initial_states(&mut self) {
        for lhs_initial in self.lhs.initial.iter() {
            if self.lhs.final_states.contains(lhs_initial) {
                // An initial final state is replaced by the rhs entry points.
                for rhs_initial in self.rhs.initial.iter() {
                    let image = self.rhs_map[rhs_initial as usize];
                    self.result.add_initial_state(image);
                }
            } else {
                let image = self.lhs_map[lhs_initial as usize];
                self.result.add_initial_state(image);
            }
        }
    }

    fn make_final_states(&mut self) {
        for rhs_final in self.rhs.final_states.iter() {
            self.result.add_final_state(self.rhs_map[rhs_final as usize]);
        }
    }

    fn add_lhs_transitions(&mut self) {
        for (source, symbol, target) in self.lhs.delta.transitions() {
            let source_final = self.lhs.final_states.contains(source);
            let target_final = self.lhs.final_states.contains(target);
            match (source_final, target_final) {
                (false, false) => {
                    self.result.delta.add(
                        self.lhs_map[source as usize],
                        symbol,
                        self.lhs_map[target as usize],
                    );
                }
                (false, true) => {
                    // Redirect into every rhs entry point.
                    for rhs_initial in self.rhs.initial.iter() {
                        self.result.delta.add(
                            self.lhs_map[source as usize],
                            symbol,
                            self.rhs_map[rhs_initial as usize],
                        );
                    }
                }
                (true, _) if source == target => {
                    // A self-loop on a final state survives as a self-loop
                    // on every rhs entry point.
                    for rhs_initial in self.rhs.initial.iter() {
                        let image = self.rhs_map[rhs_initial as usize];
                        self.result.delta.add(image, symbol, image);
                    }
                }
                (true, false) => {
                    // Re-source from every rhs entry point back into lhs.
                    for rhs_initial in self.rhs.initial.iter() {
                        self.result.delta.add(
                            self.rhs_map[rhs_initial as usize],
                            symbol,
                            self.lhs_map[target as usize],
                        );
                    }
                }
                (true, true) => {
                    // Both endpoints elided: splice across all entry pairs.
                    for rhs_source in self.rhs.initial.iter() {
                        for rhs_target in self.rhs.initial.iter() {
                            self.result.delta.add(
                                self.rhs_map[rhs_source as usize],
                                symbol,
                                self.rhs_map[rhs_target as usize],
                            );
                        }
                    }
                }
            }
        }
    }

    fn add_rhs_transitions(&mut self) {
        for (source, symbol, target) in self.rhs.delta.transitions() {
            self.result.delta.add(
                self.rhs_map[source as usize],
                symbol,
                self.rhs_map[target as usize],
            );
        }
    }
}

/// Concatenation `lhs . rhs`.
pub fn concatenate(lhs: &Nfa, rhs: &Nfa) -> Nfa {
    Concatenator::new(lhs, rhs).into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    const A: Symbol = 'a' as Symbol;
    const B: Symbol = 'b' as Symbol;

    fn words(alphabet: &[Symbol], max_len: usize) -> Vec<Vec<Symbol>> {
        let mut all: Vec<Vec<Symbol>> = vec![Vec::new()];
        let mut layer: Vec<Vec<Symbol>> = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for word in &layer {
                for &symbol in alphabet {
                    let mut extended = word.clone();
                    extended.push(symbol);
                    next.push(extended);
                }
            }
            all.extend(next.iter().cloned());
            layer = next;
        }
        all
    }

    /// Does some split of `word` land in lhs then rhs?
    fn splits_accept(lhs: &Nfa, rhs: &Nfa, word: &[Symbol]) -> bool {
        (0..=word.len())
            .any(|cut| lhs.simulate(&word[..cut]) && rhs.simulate(&word[cut..]))
    }

    fn single_word(symbol: Symbol) -> Nfa {
        let mut nfa = Nfa::new();
        nfa.delta.add(0, symbol, 1);
        nfa.add_initial_state(0);
        nfa.add_final_state(1);
        nfa
    }

    #[test]
    fn test_concatenate_single_words() {
        let result = concatenate(&single_word(A), &single_word(B));
        for word in words(&[A, B], 3) {
            assert_eq!(result.simulate(&word), word == [A, B], "word {:?}", word);
        }
    }

    #[test]
    fn test_concatenation_split_law() {
        // a*b followed by ab*; the lhs final state has no outgoing
        // transitions, so the splice is exact.
        let mut lhs = Nfa::new();
        lhs.delta.add(0, A, 0);
        lhs.delta.add(0, B, 1);
        lhs.add_initial_state(0);
        lhs.add_final_state(1);

        let mut rhs = Nfa::new();
        rhs.delta.add(0, A, 1);
        rhs.delta.add(1, B, 1);
        rhs.add_initial_state(0);
        rhs.add_final_state(1);

        let result = concatenate(&lhs, &rhs);
        for word in words(&[A, B], 5) {
            assert_eq!(
                result.simulate(&word),
                splits_accept(&lhs, &rhs, &word),
                "word {:?}",
                word
            );
        }
    }

    #[test]
    fn test_self_loop_on_final_state_survives() {
        // One lhs state, initial and final, with an 'a' self-loop: a*.
        let mut lhs = Nfa::new();
        lhs.delta.add(0, A, 0);
        lhs.add_initial_state(0);
        lhs.add_final_state(0);

        let rhs = single_word(B);

        let concatenator = Concatenator::new(&lhs, &rhs);
        assert_eq!(concatenator.lhs_state_map(), &[ELIDED]);

        let entry = concatenator.rhs_state_map()[0];
        let result = concatenator.into_result();

        // The loop reappears as a self-loop on the rhs entry point.
        let post = result.delta.state_post(entry).symbol_post(A).unwrap();
        assert!(post.targets.contains(entry));

        // a*b exactly.
        for word in words(&[A, B], 4) {
            let expected = !word.is_empty()
                && word[word.len() - 1] == B
                && word[..word.len() - 1].iter().all(|&s| s == A);
            assert_eq!(result.simulate(&word), expected, "word {:?}", word);
        }
    }

    #[test]
    fn test_lhs_final_initial_uses_rhs_entry() {
        // lhs accepts only the empty word, so lhs . rhs == rhs.
        let mut lhs = Nfa::new();
        lhs.add_initial_state(0);
        lhs.add_final_state(0);

        let rhs = single_word(B);
        let result = concatenate(&lhs, &rhs);

        assert!(result.simulate(&[B]));
        assert!(!result.simulate(&[]));
        assert!(!result.simulate(&[B, B]));
    }

    #[test]
    fn test_state_maps() {
        // lhs: 0 -a-> 1 (final), 2 unreachable non-final.
        let mut lhs = Nfa::new();
        lhs.delta.add(0, A, 1);
        lhs.delta.allocate(3);
        lhs.add_initial_state(0);
        lhs.add_final_state(1);

        let rhs = single_word(B);
        let concatenator = Concatenator::new(&lhs, &rhs);

        assert_eq!(concatenator.lhs_state_map(), &[0, ELIDED, 1]);
        assert_eq!(concatenator.rhs_state_map(), &[2, 3]);
        assert_eq!(concatenator.into_result().num_of_states(), 4);
    }

    #[test]
    fn test_empty_rhs_language() {
        // rhs has no initial states: the concatenation accepts nothing.
        let mut rhs = Nfa::new();
        rhs.delta.add(0, B, 1);
        rhs.add_final_state(1);

        let result = concatenate(&single_word(A), &rhs);
        for word in words(&[A, B], 3) {
            assert!(!result.simulate(&word), "word {:?}", word);
        }
    }
}
