//! `InterpreterBuilder` for creating `Interpreter` instances with various
//! configurations.
//!
//! Every collaborator boundary is injectable: the completion client, the
//! retry policy around it, the primitive registry, the trace sink, and the
//! step limit. The defaults are safe for embedding — builtin primitives, a
//! completion client that fails until a real one is provided, a silent
//! trace sink, and no step limit.

use weft_ir::Program;

use crate::completion::{CompletionClient, RetryPolicy, UnconfiguredClient};
use crate::environment::Locals;
use crate::frames::FrameStack;
use crate::primitives::PrimitiveRegistry;
use crate::trace::TraceSink;

use super::Interpreter;

/// Builder for `Interpreter` instances.
pub struct InterpreterBuilder {
    program: Program,
    client: Box<dyn CompletionClient>,
    primitives: PrimitiveRegistry,
    retry: RetryPolicy,
    trace: TraceSink,
    step_limit: Option<u64>,
}

impl InterpreterBuilder {
    /// A builder with the default configuration.
    pub fn new(program: Program) -> InterpreterBuilder {
        InterpreterBuilder {
            program,
            client: Box::new(UnconfiguredClient),
            primitives: PrimitiveRegistry::with_builtins(),
            retry: RetryPolicy::default(),
            trace: TraceSink::Silent,
            step_limit: None,
        }
    }

    /// Set the completion client holes are resolved against.
    #[must_use]
    pub fn completion(mut self, client: impl CompletionClient + 'static) -> Self {
        self.client = Box::new(client);
        self
    }

    /// Set the retry policy applied around completion calls.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the primitive registry.
    #[must_use]
    pub fn primitives(mut self, primitives: PrimitiveRegistry) -> Self {
        self.primitives = primitives;
        self
    }

    /// Set the sink `debug` snapshots are written to.
    #[must_use]
    pub fn trace_sink(mut self, trace: TraceSink) -> Self {
        self.trace = trace;
        self
    }

    /// Abort the run after `limit` instructions.
    #[must_use]
    pub fn step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Build the interpreter, counter at line zero.
    pub fn build(self) -> Interpreter {
        Interpreter {
            program: self.program,
            pc: 0,
            locals: Locals::new(),
            frames: FrameStack::new(),
            primitives: self.primitives,
            client: self.client,
            retry: self.retry,
            trace: self.trace,
            step_limit: self.step_limit,
            steps: 0,
        }
    }
}
