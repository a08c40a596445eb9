//! The locals environment: named scoped stacks visible to one frame.
//!
//! A `Locals` maps block names to entries (a nested `Block`, or a scalar
//! `Value` when a variable holds a single value rather than a stack), and
//! tracks which block is active together with the stack of open-but-unclosed
//! block names. A fresh environment always contains an empty `"arg"` block,
//! and `"arg"` is active.

use rustc_hash::FxHashMap;

use weft_ir::{block_close_mismatch, block_type_mismatch, WeftResult};

use crate::block::{Block, Entry};

/// Name of the default block every environment starts with.
pub const ARG_BLOCK: &str = "arg";

/// One frame's visible scope.
#[derive(Clone, Debug)]
pub struct Locals {
    vars: FxHashMap<String, Entry>,
    active: String,
    open_stack: Vec<String>,
}

impl Locals {
    /// A fresh environment: an empty active `"arg"` block, nothing open.
    pub fn new() -> Locals {
        Locals::with_args(Vec::new())
    }

    /// A fresh environment whose `"arg"` block holds `args`.
    ///
    /// This is the callee environment installed by the call protocol.
    pub fn with_args(args: Vec<Entry>) -> Locals {
        let mut vars = FxHashMap::default();
        vars.insert(ARG_BLOCK.to_string(), Entry::Nested(Block::from_entries(args)));
        Locals {
            vars,
            active: ARG_BLOCK.to_string(),
            open_stack: Vec::new(),
        }
    }

    /// Name of the currently active block.
    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// The currently active block.
    pub fn active(&self) -> &Block {
        match self.vars.get(&self.active) {
            Some(Entry::Nested(block)) => block,
            _ => unreachable!("active name `{}` must hold a block", self.active),
        }
    }

    /// The currently active block, mutably.
    pub fn active_mut(&mut self) -> &mut Block {
        match self.vars.get_mut(&self.active) {
            Some(Entry::Nested(block)) => block,
            _ => unreachable!("active name `{}` must hold a block", self.active),
        }
    }

    /// Look up a variable.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.vars.get(name)
    }

    /// Look up a variable, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.vars.get_mut(name)
    }

    /// Bind `name` to `entry`, replacing any previous binding.
    ///
    /// Rebinding the active block name to a scalar is rejected: the active
    /// name must keep holding a block.
    pub fn define(&mut self, name: &str, entry: Entry) -> WeftResult<()> {
        if name == self.active && matches!(entry, Entry::Scalar(_)) {
            return Err(block_type_mismatch(name));
        }
        self.vars.insert(name.to_string(), entry);
        Ok(())
    }

    /// Remove a binding, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Entry> {
        self.vars.remove(name)
    }

    /// Open the named block: the current active name is pushed onto the
    /// open-block stack, a fresh empty block is created under `name` if
    /// absent, and `name` becomes active.
    pub fn open_block(&mut self, name: &str) -> WeftResult<()> {
        match self.vars.get(name) {
            Some(Entry::Scalar(_)) => return Err(block_type_mismatch(name)),
            Some(Entry::Nested(_)) => {}
            None => {
                self.vars.insert(name.to_string(), Entry::Nested(Block::new()));
            }
        }
        let previous = std::mem::replace(&mut self.active, name.to_string());
        self.open_stack.push(previous);
        Ok(())
    }

    /// Close the named block: `name` must be the active block; the previous
    /// active name is popped back off the open-block stack.
    pub fn close_block(&mut self, name: &str) -> WeftResult<()> {
        if name != self.active {
            return Err(block_close_mismatch(self.active.clone(), name));
        }
        // The base block is never on the open stack, so it cannot be closed.
        match self.open_stack.pop() {
            Some(previous) => {
                self.active = previous;
                Ok(())
            }
            None => Err(block_close_mismatch(self.active.clone(), name)),
        }
    }

    /// Variable names and entries, unordered, for trace snapshots.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.vars.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Depth of the open-block stack.
    pub fn open_depth(&self) -> usize {
        self.open_stack.len()
    }
}

impl Default for Locals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_environment_has_an_active_arg_block() {
        let locals = Locals::new();
        assert_eq!(locals.active_name(), ARG_BLOCK);
        assert!(locals.active().is_empty());
    }

    #[test]
    fn open_makes_a_fresh_block_active() {
        let mut locals = Locals::new();
        locals.open_block("scratch").unwrap();
        assert_eq!(locals.active_name(), "scratch");
        assert_eq!(locals.open_depth(), 1);
    }

    #[test]
    fn close_restores_the_previous_active_block() {
        let mut locals = Locals::new();
        locals.open_block("outer").unwrap();
        locals.open_block("inner").unwrap();
        locals.close_block("inner").unwrap();
        assert_eq!(locals.active_name(), "outer");
        locals.close_block("outer").unwrap();
        assert_eq!(locals.active_name(), ARG_BLOCK);
    }

    #[test]
    fn close_of_a_non_active_block_fails() {
        let mut locals = Locals::new();
        locals.open_block("outer").unwrap();
        let err = locals.close_block("elsewhere").unwrap_err();
        assert_eq!(err.message, "cannot close `elsewhere`: the active block is `outer`");
    }

    #[test]
    fn open_over_a_scalar_fails() {
        let mut locals = Locals::new();
        locals
            .define("answer", Entry::Scalar(Value::Int(42)))
            .unwrap();
        let err = locals.open_block("answer").unwrap_err();
        assert_eq!(err.message, "`answer` holds a scalar value, not a block");
    }

    #[test]
    fn reopening_an_existing_block_keeps_its_contents() {
        let mut locals = Locals::new();
        locals.open_block("notes").unwrap();
        locals
            .active_mut()
            .push(Entry::Scalar(Value::Line("kept".to_string())));
        locals.close_block("notes").unwrap();
        locals.open_block("notes").unwrap();
        assert_eq!(locals.active().len(), 1);
    }

    #[test]
    fn active_name_cannot_be_rebound_to_a_scalar() {
        let mut locals = Locals::new();
        let err = locals
            .define(ARG_BLOCK, Entry::Scalar(Value::Int(1)))
            .unwrap_err();
        assert_eq!(err.message, "`arg` holds a scalar value, not a block");
    }
}
