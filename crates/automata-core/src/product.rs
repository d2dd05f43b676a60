use log::debug;
use rustc_hash::FxHashMap;

use crate::delta::SymbolPost;
use crate::nfa::Nfa;
use crate::sync::SynchronizedIterator;
use crate::{State, Symbol};

/// Largest pair space `|lhs| * |rhs|` for which the dense matrix is
/// allocated. Above this, the per-lhs-state hash maps with range filters
/// take over.
const PAIR_TABLE_DENSE_LIMIT: u64 = 100_000_000;

const UNASSIGNED: State = State::MAX;

/// Pair -> product-state lookup, chosen once per product call based on the
/// size of the pair space.
enum PairTable {
    /// Row-major `|lhs| * |rhs|` matrix, `UNASSIGNED` for absent pairs.
    Dense {
        rhs_states: usize,
        cells: Vec<State>,
    },
    /// Per-lhs-state map from rhs state to product state. The min/max
    /// trackers record the range of partners seen per state on either side,
    /// so most absent pairs are rejected without touching a hash map.
    Sparse {
        rows: Vec<FxHashMap<State, State>>,
        min_rhs: Vec<State>,
        max_rhs: Vec<State>,
        min_lhs: Vec<State>,
        max_lhs: Vec<State>,
    },
}

impl PairTable {
    fn new(lhs_states: usize, rhs_states: usize) -> Self {
        if lhs_states as u64 * rhs_states as u64 <= PAIR_TABLE_DENSE_LIMIT {
            PairTable::Dense {
                rhs_states,
                cells: vec![UNASSIGNED; lhs_states * rhs_states],
            }
        } else {
            PairTable::Sparse {
                rows: vec![FxHashMap::default(); lhs_states],
                min_rhs: vec![State::MAX; lhs_states],
                max_rhs: vec![0; lhs_states],
                min_lhs: vec![State::MAX; rhs_states],
                max_lhs: vec![0; rhs_states],
            }
        }
    }

    fn get(&self, lhs_state: State, rhs_state: State) -> Option<State> {
        match self {
            PairTable::Dense { rhs_states, cells } => {
                let cell = cells[lhs_state as usize * rhs_states + rhs_state as usize];
                (cell != UNASSIGNED).then_some(cell)
            }
            PairTable::Sparse {
                rows,
                min_rhs,
                max_rhs,
                min_lhs,
                max_lhs,
            } => {
                if rhs_state < min_rhs[lhs_state as usize]
                    || rhs_state > max_rhs[lhs_state as usize]
                    || lhs_state < min_lhs[rhs_state as usize]
                    || lhs_state > max_lhs[rhs_state as usize]
                {
                    return None;
                }
                rows[lhs_state as usize].get(&rhs_state).copied()
            }
        }
    }

    fn insert(&mut self, lhs_state: State, rhs_state: State, product_state: State) {
        match self {
            PairTable::Dense { rhs_states, cells } => {
                cells[lhs_state as usize * *rhs_states + rhs_state as usize] = product_state;
            }
            PairTable::Sparse {
                rows,
                min_rhs,
                max_rhs,
                min_lhs,
                max_lhs,
            } => {
                let l = lhs_state as usize;
                let r = rhs_state as usize;
                min_rhs[l] = min_rhs[l].min(rhs_state);
                max_rhs[l] = max_rhs[l].max(rhs_state);
                min_lhs[r] = min_lhs[r].min(lhs_state);
                max_lhs[r] = max_lhs[r].max(lhs_state);
                rows[l].insert(rhs_state, product_state);
            }
        }
    }
}

/// Worklist-driven generalized product of two automata.
///
/// Explores reachable state pairs, creating one product state per pair on
/// first discovery. `final_condition` decides finality of a pair
/// (intersection supplies "final in both"); symbols `>= first_epsilon` are
/// spontaneous and are taken on one side while the other state is held
/// fixed.
struct ProductBuilder<'a, F> {
    lhs: &'a Nfa,
    rhs: &'a Nfa,
    final_condition: F,
    first_epsilon: Symbol,
    result: Nfa,
    pairs: PairTable,
    worklist: Vec<(State, State)>,
    pair_map: Option<&'a mut FxHashMap<(State, State), State>>,
}

impl<'a, F: Fn(State, State) -> bool> ProductBuilder<'a, F> {
    fn new(
        lhs: &'a Nfa,
        rhs: &'a Nfa,
        final_condition: F,
        first_epsilon: Symbol,
        pair_map: Option<&'a mut FxHashMap<(State, State), State>>,
    ) -> Self {
        ProductBuilder {
            lhs,
            rhs,
            final_condition,
            first_epsilon,
            result: Nfa::new(),
            pairs: PairTable::new(lhs.num_of_states(), rhs.num_of_states()),
            worklist: Vec::new(),
            pair_map,
        }
    }

    fn register_pair(&mut self, lhs_state: State, rhs_state: State, product_state: State) {
        self.pairs.insert(lhs_state, rhs_state, product_state);
        if let Some(map) = self.pair_map.as_deref_mut() {
            map.insert((lhs_state, rhs_state), product_state);
        }
    }

    /// Product state for a pair, created on first sight. A fresh pair is
    /// registered, queued, and marked final per the predicate; finality is
    /// decided exactly once, here.
    fn product_state(&mut self, lhs_state: State, rhs_state: State) -> State {
        if let Some(existing) = self.pairs.get(lhs_state, rhs_state) {
            return existing;
        }
        let product_state = self.result.add_state();
        self.register_pair(lhs_state, rhs_state, product_state);
        self.worklist.push((lhs_state, rhs_state));
        if (self.final_condition)(lhs_state, rhs_state) {
            self.result.add_final_state(product_state);
        }
        product_state
    }

    fn process_pair(&mut self, lhs_source: State, rhs_source: State) {
        let lhs = self.lhs;
        let rhs = self.rhs;
        let source = self
            .pairs
            .get(lhs_source, rhs_source)
            .expect("queued pair was registered");

        // Normal symbols: lock-step merge over both rows. The epsilon-class
        // suffix sorts last, so the merge stops at the first such symbol.
        let mut sync = SynchronizedIterator::with_capacity(2);
        sync.push(lhs.delta.state_post(lhs_source).as_slice());
        sync.push(rhs.delta.state_post(rhs_source).as_slice());
        while sync.advance() {
            let posts = sync.get_current();
            let symbol = posts[0].symbol;
            if symbol >= self.first_epsilon {
                break;
            }
            let mut product_post = SymbolPost::new(symbol);
            for lhs_target in posts[0].targets.iter() {
                for rhs_target in posts[1].targets.iter() {
                    let target = self.product_state(lhs_target, rhs_target);
                    product_post.targets.insert(target);
                }
            }
            // Synchronized symbols arrive in ascending order: plain append.
            self.result.delta.state_post_mut(source).push(product_post);
        }

        // Spontaneous lhs symbols, rhs state held fixed.
        let lhs_row = lhs.delta.state_post(lhs_source);
        for post in &lhs_row.as_slice()[lhs_row.first_epsilon_index(self.first_epsilon)..] {
            let mut product_post = SymbolPost::new(post.symbol);
            for lhs_target in post.targets.iter() {
                let target = self.product_state(lhs_target, rhs_source);
                product_post.targets.insert(target);
            }
            self.result.delta.state_post_mut(source).add_post(product_post);
        }

        // Spontaneous rhs symbols, lhs state held fixed. The same symbol may
        // already sit in the row from the lhs pass; add_post merges.
        let rhs_row = rhs.delta.state_post(rhs_source);
        for post in &rhs_row.as_slice()[rhs_row.first_epsilon_index(self.first_epsilon)..] {
            let mut product_post = SymbolPost::new(post.symbol);
            for rhs_target in post.targets.iter() {
                let target = self.product_state(lhs_source, rhs_target);
                product_post.targets.insert(target);
            }
            self.result.delta.state_post_mut(source).add_post(product_post);
        }
    }

    fn build(mut self) -> Nfa {
        let lhs = self.lhs;
        let rhs = self.rhs;
        for lhs_initial in lhs.initial.iter() {
            for rhs_initial in rhs.initial.iter() {
                let product_state = self.result.add_state();
                self.register_pair(lhs_initial, rhs_initial, product_state);
                self.worklist.push((lhs_initial, rhs_initial));
                self.result.add_initial_state(product_state);
                if (self.final_condition)(lhs_initial, rhs_initial) {
                    self.result.add_final_state(product_state);
                }
            }
        }

        let mut processed: u64 = 0;
        while let Some((lhs_source, rhs_source)) = self.worklist.pop() {
            processed += 1;
            if processed % 1000 == 0 {
                debug!(
                    "product: processed={} states={} worklist={}",
                    processed,
                    self.result.num_of_states(),
                    self.worklist.len(),
                );
            }
            self.process_pair(lhs_source, rhs_source);
        }
        self.result
    }
}

/// Generalized binary product of `lhs` and `rhs` with a pluggable
/// final-state predicate.
///
/// `pair_map`, when given, receives the discovered pair -> product-state
/// map, for callers building inclusion or equivalence checks on top.
pub fn product<F>(
    lhs: &Nfa,
    rhs: &Nfa,
    final_condition: F,
    first_epsilon: Symbol,
    pair_map: Option<&mut FxHashMap<(State, State), State>>,
) -> Nfa
where
    F: Fn(State, State) -> bool,
{
    ProductBuilder::new(lhs, rhs, final_condition, first_epsilon, pair_map).build()
}

/// Intersection: the product under the "final in both" predicate.
pub fn intersection(
    lhs: &Nfa,
    rhs: &Nfa,
    first_epsilon: Symbol,
    pair_map: Option<&mut FxHashMap<(State, State), State>>,
) -> Nfa {
    product(
        lhs,
        rhs,
        |lhs_state, rhs_state| {
            lhs.final_states.contains(lhs_state) && rhs.final_states.contains(rhs_state)
        },
        first_epsilon,
        pair_map,
    )
}
