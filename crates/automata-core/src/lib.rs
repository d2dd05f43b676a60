pub mod concat;
pub mod delta;
pub mod inter_aut;
pub mod nfa;
pub mod product;
pub mod state_set;
pub mod strings;
pub mod sync;

/// State identifier: a dense index into per-state structures.
pub type State = u32;

/// Symbol identifier. Values at or above a caller-chosen "first epsilon"
/// threshold denote spontaneous transitions; `EPSILON` is the reserved
/// maximum sentinel, spontaneous under every threshold.
pub type Symbol = u32;

pub const EPSILON: Symbol = u32::MAX;

pub use concat::{concatenate, Concatenator};
pub use delta::{Delta, StatePost, SymbolPost};
pub use nfa::{Nfa, Run};
pub use product::{intersection, product};
pub use state_set::StateSet;
