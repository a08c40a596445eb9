//! Weft Eval - Interpreter for the weft runtime.
//!
//! This crate executes preprocessed weft programs: line-oriented scripts
//! mixing textual templating with calls to an external text-completion
//! service.
//!
//! # Architecture
//!
//! - `Value` / `Entry` / `Block`: the typed value system and the
//!   cursor-addressable scoped stacks it lives in
//! - `Locals`: the named-block environment visible to one frame
//! - `FrameStack`: call frames and loop frames, innermost last
//! - `Interpreter`: the dispatcher loop, built via `InterpreterBuilder`
//! - the template resolver, deciding segment by segment between local
//!   substitution and a blocking completion request
//! - `CompletionClient` / `PrimitiveRegistry`: the two collaborator
//!   boundaries, both injectable
//!
//! # Re-exports
//!
//! Program and error types come from `weft_ir` and are re-exported here for
//! convenience: `Program`, `Instruction`, `Template`, `WeftError`,
//! `WeftErrorKind`, `WeftResult`.

mod block;
mod completion;
mod environment;
mod frames;
mod interpreter;
mod primitives;
mod template;
mod trace;
mod value;

pub use weft_ir::{
    ArgCount, Instruction, Program, Segment, Template, WeftError, WeftErrorKind, WeftResult,
};

pub use block::{Block, Entry};
pub use completion::{
    CompletionClient, CompletionError, ConsoleClient, Request, RetryPolicy, ScriptedClient,
    UnconfiguredClient,
};
pub use environment::{Locals, ARG_BLOCK};
pub use frames::{ForFrame, Frame, FrameEntry, FrameStack};
pub use interpreter::{Interpreter, InterpreterBuilder, HALTED};
pub use primitives::{PrimitiveFn, PrimitiveRegistry};
pub use trace::TraceSink;
pub use value::Value;
