use crate::delta::SymbolPost;
use crate::Symbol;

/// Sort key a synchronized iterator aligns its input sequences on.
pub trait SyncKey {
    type Key: Ord + Copy;

    fn sync_key(&self) -> Self::Key;
}

impl SyncKey for SymbolPost {
    type Key = Symbol;

    #[inline]
    fn sync_key(&self) -> Symbol {
        self.symbol
    }
}

/// N-way lock-step iterator over key-sorted slices.
///
/// `advance` moves every cursor forward to the next key present in all
/// slices simultaneously and returns false once any slice is exhausted.
/// After a successful `advance`, `get_current` exposes the positioned
/// element of each slice.
///
/// The normal-symbol phase of the product construction uses this to turn
/// "symbols present in both rows" into a single merge pass.
pub struct SynchronizedIterator<'a, T: SyncKey> {
    rows: Vec<&'a [T]>,
    positions: Vec<usize>,
    started: bool,
}

impl<'a, T: SyncKey> SynchronizedIterator<'a, T> {
    pub fn with_capacity(num_rows: usize) -> Self {
        SynchronizedIterator {
            rows: Vec::with_capacity(num_rows),
            positions: Vec::with_capacity(num_rows),
            started: false,
        }
    }

    pub fn push(&mut self, row: &'a [T]) {
        debug_assert!(!self.started, "rows must be pushed before iterating");
        self.rows.push(row);
        self.positions.push(0);
    }

    /// Move to the next key shared by every row. Returns false when no such
    /// key remains.
    pub fn advance(&mut self) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        if self.started {
            // Step every cursor past the previous match.
            for pos in &mut self.positions {
                *pos += 1;
            }
        }
        self.started = true;

        let mut target = match self.rows[0].get(self.positions[0]) {
            Some(element) => element.sync_key(),
            None => return false,
        };
        loop {
            let mut all_match = true;
            for (row, pos) in self.rows.iter().zip(self.positions.iter_mut()) {
                let key = loop {
                    match row.get(*pos) {
                        None => return false,
                        Some(element) if element.sync_key() < target => *pos += 1,
                        Some(element) => break element.sync_key(),
                    }
                };
                if key > target {
                    // Some earlier cursor is now behind; raise the bar and
                    // make another pass. `target` only ever grows.
                    target = key;
                    all_match = false;
                }
            }
            if all_match {
                return true;
            }
        }
    }

    /// The element each row is positioned on. Only meaningful after
    /// `advance` returned true.
    pub fn get_current(&self) -> Vec<&'a T> {
        self.rows
            .iter()
            .zip(self.positions.iter())
            .map(|(row, &pos)| &row[pos])
            .collect()
    }
}
