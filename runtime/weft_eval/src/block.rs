//! Blocks: the runtime's unit of scoped storage.
//!
//! A block is an ordered sequence of entries (scalar values or nested
//! blocks) with an optional cursor. An unset cursor means append-only; a set
//! cursor is an absolute insertion point within `[0, len]`. Pops always take
//! the entries immediately preceding the cursor (the tail when unset) and
//! keep their original relative order.

use weft_ir::{cursor_out_of_range, insufficient_elements, WeftResult};

use crate::value::Value;

/// One element of a block.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Scalar(Value),
    Nested(Block),
}

impl Entry {
    /// Serialized form: a scalar's terminated line, or a nested block's
    /// full rendering.
    pub fn render(&self) -> String {
        match self {
            Entry::Scalar(value) => value.serialize(),
            Entry::Nested(block) => block.render(),
        }
    }

    /// Short tag name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Scalar(value) => value.kind(),
            Entry::Nested(_) => "block",
        }
    }
}

/// An ordered, cursor-addressable sequence of entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    entries: Vec<Entry>,
    cursor: Option<usize>,
}

impl Block {
    /// A new empty block with an unset cursor.
    pub fn new() -> Block {
        Block::default()
    }

    /// A block pre-loaded with `entries`, cursor unset.
    pub fn from_entries(entries: Vec<Entry>) -> Block {
        Block {
            entries,
            cursor: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cursor position, if set.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The entry at `index`, if within the block.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Entries in order, for inspection.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Count of entries before the cursor — the whole block when unset.
    ///
    /// This is the wildcard (`*`) count for `pop` and `call`.
    pub fn before_cursor(&self) -> usize {
        self.cursor.unwrap_or(self.entries.len())
    }

    /// Insert one entry at the cursor (advancing it), or append.
    pub fn push(&mut self, entry: Entry) {
        match self.cursor {
            Some(at) => {
                self.entries.insert(at, entry);
                self.cursor = Some(at + 1);
            }
            None => self.entries.push(entry),
        }
    }

    /// Splice a whole sequence at the cursor position in one step
    /// (the cursor advances by the sequence length), or extend at the end.
    pub fn push_all(&mut self, entries: Vec<Entry>) {
        match self.cursor {
            Some(at) => {
                let count = entries.len();
                self.entries.splice(at..at, entries);
                self.cursor = Some(at + count);
            }
            None => self.entries.extend(entries),
        }
    }

    /// Remove the `n` entries immediately preceding the cursor (the last
    /// `n` when unset), returning them in original relative order. A set
    /// cursor retreats by `n`.
    pub fn pop(&mut self, n: usize) -> WeftResult<Vec<Entry>> {
        let end = self.before_cursor();
        if n > end {
            return Err(insufficient_elements(n, end));
        }
        let start = end - n;
        let popped: Vec<Entry> = self.entries.drain(start..end).collect();
        if self.cursor.is_some() {
            self.cursor = Some(start);
        }
        Ok(popped)
    }

    /// Remove everything before the cursor (the whole block when unset) and
    /// reset the cursor.
    pub fn pop_all(&mut self) -> Vec<Entry> {
        let end = self.before_cursor();
        let popped: Vec<Entry> = self.entries.drain(..end).collect();
        self.cursor = None;
        popped
    }

    /// Take the block's full content, leaving it empty with an unset cursor.
    pub fn take_entries(&mut self) -> Vec<Entry> {
        self.cursor = None;
        std::mem::take(&mut self.entries)
    }

    /// Clear all entries and the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Reverse entry order. A set cursor at index `i` becomes
    /// `len - i - 1`, preserving its position relative to the reversed
    /// content; the boundary position `i == len` folds to `0`.
    pub fn flip(&mut self) {
        self.entries.reverse();
        let len = self.entries.len();
        self.cursor = self.cursor.map(|i| len.saturating_sub(i + 1));
    }

    /// Set the cursor to an absolute index within `[0, len]`, or clear it.
    pub fn select(&mut self, index: Option<usize>) -> WeftResult<()> {
        if let Some(i) = index {
            if i > self.entries.len() {
                return Err(cursor_out_of_range(i, self.entries.len()));
            }
        }
        self.cursor = index;
        Ok(())
    }

    /// Concatenated serialization of every entry, nested blocks rendered
    /// recursively in place.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.render());
        }
        out
    }
}
