//! Trace sink for `debug` snapshots.
//!
//! The `debug` instruction renders a snapshot of the execution state and
//! hands it to the configured sink. Display formatting is a side effect
//! only; program state never changes. The runtime is single-threaded, so
//! the buffering sink uses `RefCell` rather than a lock.

use std::cell::RefCell;
use std::fmt::Write;

use crate::block::Entry;
use crate::environment::Locals;
use crate::frames::{FrameEntry, FrameStack};

/// Where `debug` snapshots go.
#[derive(Debug, Default)]
pub enum TraceSink {
    /// Write to stdout.
    Stdout,
    /// Capture to a buffer (tests, embedding).
    Buffer(RefCell<String>),
    /// Discard silently (the default).
    #[default]
    Silent,
}

impl TraceSink {
    /// A buffering sink for capture.
    pub fn buffer() -> TraceSink {
        TraceSink::Buffer(RefCell::new(String::new()))
    }

    /// Emit one snapshot.
    pub fn emit(&self, snapshot: &str) {
        match self {
            TraceSink::Stdout => println!("{snapshot}"),
            TraceSink::Buffer(buffer) => {
                let mut buf = buffer.borrow_mut();
                buf.push_str(snapshot);
                buf.push('\n');
            }
            TraceSink::Silent => {}
        }
    }

    /// Everything captured so far; empty for non-capturing sinks.
    pub fn captured(&self) -> String {
        match self {
            TraceSink::Buffer(buffer) => buffer.borrow().clone(),
            TraceSink::Stdout | TraceSink::Silent => String::new(),
        }
    }
}

/// Render a human-readable snapshot of the execution state.
pub(crate) fn render_snapshot(pc: usize, frames: &FrameStack, locals: &Locals) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- pc {pc} --------------------------------------");
    for frame in frames.iter() {
        match frame {
            FrameEntry::Call(f) => {
                let _ = writeln!(out, "- call {} (resume {})", f.name, f.return_pc + 1);
            }
            FrameEntry::Loop(f) => {
                let _ = writeln!(
                    out,
                    "- for {} in {} (iteration {})",
                    f.var, f.source, f.index
                );
            }
        }
    }
    let _ = writeln!(out, "- locals (active `{}`) -----------------", locals.active_name());
    let mut names: Vec<&str> = locals.iter().map(|(name, _)| name).collect();
    names.sort_unstable();
    for name in names {
        if let Some(entry) = locals.get(name) {
            match entry {
                Entry::Scalar(value) => {
                    let _ = writeln!(out, "{name}: {value}");
                }
                Entry::Nested(block) => {
                    let _ = writeln!(out, "{name}:");
                    for rendered_line in block.render().lines() {
                        let _ = writeln!(out, "    {rendered_line}");
                    }
                }
            }
        }
    }
    out.push_str("--------------------------------------------------");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Entry;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_sink_captures_snapshots() {
        let sink = TraceSink::buffer();
        sink.emit("one");
        sink.emit("two");
        assert_eq!(sink.captured(), "one\ntwo\n");
    }

    #[test]
    fn silent_sink_discards() {
        let sink = TraceSink::Silent;
        sink.emit("gone");
        assert_eq!(sink.captured(), "");
    }

    #[test]
    fn snapshot_lists_locals_with_indented_blocks() {
        let mut locals = Locals::new();
        locals
            .active_mut()
            .push(Entry::Scalar(Value::Line("hello".to_string())));
        let snapshot = render_snapshot(3, &FrameStack::new(), &locals);
        assert!(snapshot.contains("pc 3"));
        assert!(snapshot.contains("arg:"));
        assert!(snapshot.contains("    hello"));
    }
}
