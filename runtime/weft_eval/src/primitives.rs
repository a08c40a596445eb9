//! The primitive collaborator boundary.
//!
//! Primitives are native callables invoked by name from program text,
//! bypassing the call-frame protocol: the dispatcher pops the argument list
//! from the caller's active block, invokes the primitive synchronously, and
//! pushes its result entries straight back. Registration normalizes `_` to
//! `-` so a Rust-named `bool_reduce` is callable as `bool-reduce`.

use rustc_hash::FxHashMap;

use crate::block::Entry;
use crate::value::Value;

/// A native callable: argument entries in, result entries out.
///
/// A returned error propagates to the dispatcher as a fatal collaborator
/// error.
pub type PrimitiveFn = fn(Vec<Entry>) -> Result<Vec<Entry>, String>;

/// Named registry of primitives.
#[derive(Clone, Debug, Default)]
pub struct PrimitiveRegistry {
    fns: FxHashMap<String, PrimitiveFn>,
}

impl PrimitiveRegistry {
    /// An empty registry.
    pub fn new() -> PrimitiveRegistry {
        PrimitiveRegistry::default()
    }

    /// A registry pre-loaded with the builtin text primitives.
    pub fn with_builtins() -> PrimitiveRegistry {
        let mut registry = PrimitiveRegistry::new();
        registry.register("echo", echo);
        registry.register("join", join);
        registry.register("count", count);
        registry.register("lines", lines);
        registry
    }

    /// Register `f` under `name`, with `_` normalized to `-`.
    pub fn register(&mut self, name: &str, f: PrimitiveFn) {
        self.fns.insert(name.replace('_', "-"), f);
    }

    /// Look up a primitive by its normalized name.
    pub fn get(&self, name: &str) -> Option<PrimitiveFn> {
        self.fns.get(name).copied()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fns.contains_key(name)
    }
}

/// The text of an entry without terminators, nested blocks rendered whole.
fn entry_text(entry: &Entry) -> String {
    match entry {
        Entry::Scalar(value) => value.text(),
        Entry::Nested(block) => {
            let mut rendered = block.render();
            while rendered.ends_with('\n') {
                rendered.pop();
            }
            rendered
        }
    }
}

/// Return the arguments unchanged.
fn echo(args: Vec<Entry>) -> Result<Vec<Entry>, String> {
    Ok(args)
}

/// Concatenate the arguments' text into one line.
fn join(args: Vec<Entry>) -> Result<Vec<Entry>, String> {
    let joined: String = args.iter().map(entry_text).collect();
    Ok(vec![Entry::Scalar(Value::parse(&joined))])
}

/// The number of arguments, as an integer.
fn count(args: Vec<Entry>) -> Result<Vec<Entry>, String> {
    let n = i64::try_from(args.len()).map_err(|_| "argument count overflow".to_string())?;
    Ok(vec![Entry::Scalar(Value::Int(n))])
}

/// Split each argument's text into one entry per line.
fn lines(args: Vec<Entry>) -> Result<Vec<Entry>, String> {
    let mut out = Vec::new();
    for arg in &args {
        for line in entry_text(arg).lines() {
            out.push(Entry::Scalar(Value::parse(line)));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(s: &str) -> Entry {
        Entry::Scalar(Value::Line(s.to_string()))
    }

    #[test]
    fn registration_normalizes_underscores() {
        let mut registry = PrimitiveRegistry::new();
        registry.register("bool_reduce", echo);
        assert!(registry.contains("bool-reduce"));
        assert!(!registry.contains("bool_reduce"));
    }

    #[test]
    fn join_concatenates_argument_text() {
        let f = PrimitiveRegistry::with_builtins().get("join").unwrap();
        let result = f(vec![line("a"), line("b"), Entry::Scalar(Value::Int(3))]).unwrap();
        assert_eq!(result, vec![line("ab3")]);
    }

    #[test]
    fn count_returns_the_argument_count() {
        let f = PrimitiveRegistry::with_builtins().get("count").unwrap();
        let result = f(vec![line("a"), line("b")]).unwrap();
        assert_eq!(result, vec![Entry::Scalar(Value::Int(2))]);
    }

    #[test]
    fn lines_splits_multiline_text() {
        let f = PrimitiveRegistry::with_builtins().get("lines").unwrap();
        let result = f(vec![line("one\ntwo")]).unwrap();
        assert_eq!(result, vec![line("one"), line("two")]);
    }

    #[test]
    fn echo_is_identity() {
        let f = PrimitiveRegistry::with_builtins().get("echo").unwrap();
        let args = vec![line("x"), Entry::Scalar(Value::Bool(true))];
        assert_eq!(f(args.clone()).unwrap(), args);
    }
}
