use crate::state_set::StateSet;
use crate::{State, Symbol};

/// One symbol together with the set of states reachable under it.
///
/// A `StatePost` keyed by symbol never holds two posts with the same
/// symbol, so a row of these behaves as a symbol -> targets map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolPost {
    pub symbol: Symbol,
    pub targets: StateSet,
}

impl SymbolPost {
    pub fn new(symbol: Symbol) -> Self {
        SymbolPost {
            symbol,
            targets: StateSet::new(),
        }
    }
}

/// The outgoing-transition row of one source state: symbol posts kept in
/// ascending symbol order with no repeated symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePost {
    posts: Vec<SymbolPost>,
}

impl StatePost {
    #[inline]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SymbolPost> {
        self.posts.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[SymbolPost] {
        &self.posts
    }

    /// Look up the post for a symbol by binary search.
    pub fn symbol_post(&self, symbol: Symbol) -> Option<&SymbolPost> {
        self.posts
            .binary_search_by_key(&symbol, |post| post.symbol)
            .ok()
            .map(|idx| &self.posts[idx])
    }

    /// Index of the first epsilon-class post, i.e. the first post whose
    /// symbol is >= `first_epsilon`. Equals `len()` when the row has none.
    #[inline]
    pub fn first_epsilon_index(&self, first_epsilon: Symbol) -> usize {
        self.posts.partition_point(|post| post.symbol < first_epsilon)
    }

    /// Append a post already known to sort after everything in the row.
    /// Used by builders that produce symbols in ascending order.
    pub fn push(&mut self, post: SymbolPost) {
        debug_assert!(self
            .posts
            .last()
            .map_or(true, |last| last.symbol < post.symbol));
        self.posts.push(post);
    }

    /// Merge `targets` into the post for `symbol`, creating the post at its
    /// sorted position when missing. An empty target set is a no-op.
    pub fn add(&mut self, symbol: Symbol, targets: &StateSet) {
        if targets.is_empty() {
            return;
        }
        // Fast path: symbols are typically added in ascending order.
        if self.posts.last().map_or(true, |last| last.symbol < symbol) {
            self.posts.push(SymbolPost {
                symbol,
                targets: targets.clone(),
            });
            return;
        }
        match self
            .posts
            .binary_search_by_key(&symbol, |post| post.symbol)
        {
            Ok(idx) => self.posts[idx].targets.union_with(targets),
            Err(idx) => self.posts.insert(
                idx,
                SymbolPost {
                    symbol,
                    targets: targets.clone(),
                },
            ),
        }
    }

    /// Merge a whole post into the row, moving its target set in when the
    /// symbol is new. An empty post is a no-op.
    pub fn add_post(&mut self, post: SymbolPost) {
        if post.targets.is_empty() {
            return;
        }
        if self.posts.last().map_or(true, |last| last.symbol < post.symbol) {
            self.posts.push(post);
            return;
        }
        match self
            .posts
            .binary_search_by_key(&post.symbol, |p| p.symbol)
        {
            Ok(idx) => self.posts[idx].targets.union_with(&post.targets),
            Err(idx) => self.posts.insert(idx, post),
        }
    }

    fn add_single(&mut self, symbol: Symbol, target: State) {
        if self.posts.last().map_or(true, |last| last.symbol < symbol) {
            self.posts.push(SymbolPost {
                symbol,
                targets: StateSet::singleton(target),
            });
            return;
        }
        match self
            .posts
            .binary_search_by_key(&symbol, |post| post.symbol)
        {
            Ok(idx) => {
                self.posts[idx].targets.insert(target);
            }
            Err(idx) => self.posts.insert(
                idx,
                SymbolPost {
                    symbol,
                    targets: StateSet::singleton(target),
                },
            ),
        }
    }
}

impl<'a> IntoIterator for &'a StatePost {
    type Item = &'a SymbolPost;
    type IntoIter = std::slice::Iter<'a, SymbolPost>;

    fn into_iter(self) -> Self::IntoIter {
        self.posts.iter()
    }
}

/// The full transition relation: one `StatePost` row per state, indexed by
/// state ID. Grows monotonically to cover the largest state ever referenced
/// and never shrinks. Equality is deep structural equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    state_posts: Vec<StatePost>,
}

impl Delta {
    pub fn new() -> Self {
        Delta {
            state_posts: Vec::new(),
        }
    }

    #[inline]
    pub fn num_of_states(&self) -> usize {
        self.state_posts.len()
    }

    /// Grow the relation to hold at least `num_states` rows. Rows added this
    /// way are empty.
    pub fn allocate(&mut self, num_states: usize) {
        if num_states > self.state_posts.len() {
            self.state_posts.resize(num_states, StatePost::default());
        }
    }

    /// Allocate a fresh state with an empty row and return its ID.
    pub fn add_state(&mut self) -> State {
        let state = self.state_posts.len() as State;
        self.state_posts.push(StatePost::default());
        state
    }

    /// Add the transition `source --symbol--> target`, growing the relation
    /// to cover both endpoints.
    pub fn add(&mut self, source: State, symbol: Symbol, target: State) {
        self.allocate(source.max(target) as usize + 1);
        self.state_posts[source as usize].add_single(symbol, target);
    }

    /// Add `source --symbol--> t` for every `t` in `targets`. An empty
    /// target set is a no-op and does not grow the relation.
    pub fn add_set(&mut self, source: State, symbol: Symbol, targets: &StateSet) {
        let Some(max_target) = targets.max() else {
            return;
        };
        self.allocate(source.max(max_target) as usize + 1);
        self.state_posts[source as usize].add(symbol, targets);
    }

    /// The adjacency row of `state`. Panics on out-of-range access: reading
    /// a state the relation was never grown to is a caller bug.
    #[inline]
    pub fn state_post(&self, state: State) -> &StatePost {
        &self.state_posts[state as usize]
    }

    #[inline]
    pub(crate) fn state_post_mut(&mut self, state: State) -> &mut StatePost {
        &mut self.state_posts[state as usize]
    }

    /// Iterate every transition as `(source, symbol, target)` triples, in
    /// source order, symbol order within a source.
    pub fn transitions(&self) -> impl Iterator<Item = (State, Symbol, State)> + '_ {
        self.state_posts
            .iter()
            .enumerate()
            .flat_map(|(source, row)| {
                row.iter().flat_map(move |post| {
                    post.targets
                        .iter()
                        .map(move |target| (source as State, post.symbol, target))
                })
            })
    }
}
