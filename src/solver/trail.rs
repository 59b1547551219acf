use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

/// A stack of undo entries that is partitioned into search levels. Entries
/// pushed after [Trail::new_level] belong to the new level and are handed
/// back, newest first, when search backtracks below it.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    level: usize,
    // At index i is the trail length at which level i + 1 starts.
    delimiters: Vec<usize>,
    entries: Vec<T>
}

impl<T> Default for Trail<T> {
    fn default() -> Trail<T> {
        Trail {
            level: 0,
            delimiters: Vec::new(),
            entries: Vec::new()
        }
    }
}

impl<T> Trail<T> {

    pub(crate) fn new_level(&mut self) {
        self.level += 1;
        self.delimiters.push(self.entries.len());
    }

    pub(crate) fn level(&self) -> usize {
        self.level
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.entries.push(entry)
    }

    /// Removes all entries above the given level and returns them in reverse
    /// push order.
    ///
    /// # Panics
    ///
    /// If `level` is not below the current level.
    pub(crate) fn backtrack(&mut self, level: usize) -> Rev<Drain<'_, T>> {
        assert!(level < self.level, "cannot backtrack to level {} from {}",
            level, self.level);

        let len = self.delimiters[level];
        self.level = level;
        self.delimiters.truncate(level);
        self.entries.drain(len..).rev()
    }

    /// Removes every entry, including those of level 0, and returns them in
    /// reverse push order.
    pub(crate) fn clear(&mut self) -> Rev<Drain<'_, T>> {
        self.level = 0;
        self.delimiters.clear();
        self.entries.drain(..).rev()
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.entries
    }
}
