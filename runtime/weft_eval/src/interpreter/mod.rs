//! The dispatcher: one program counter over the classified line sequence.
//!
//! `Interpreter` is the single mutable execution context — program counter,
//! locals environment, frame stack, and collaborator handles — threaded by
//! exclusive ownership through the dispatch loop. There are no globals and
//! no sharing of mutable state across frames.
//!
//! Each step fetches the instruction at the counter, matches exhaustively,
//! and executes. An operation yields a `Ctrl`: advance, jump, or halt.
//! Running off the end of the program halts normally; `exit` parks the
//! counter on an invalid sentinel. On a fatal error the loop stops
//! immediately and the last consistent snapshot of locals and frames stays
//! available for inspection.

mod builder;
mod exec;

pub use builder::InterpreterBuilder;

use weft_ir::{step_limit_exceeded, Program, WeftResult};

use crate::completion::{CompletionClient, RetryPolicy};
use crate::environment::Locals;
use crate::frames::FrameStack;
use crate::primitives::PrimitiveRegistry;
use crate::trace::TraceSink;

/// Sentinel the counter is parked on after `exit`.
pub const HALTED: usize = usize::MAX;

/// What an executed instruction asks the dispatch loop to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Ctrl {
    /// Fall through to the next line.
    Advance,
    /// Continue at the given line.
    Jump(usize),
    /// Stop the loop.
    Halt,
}

/// The weft runtime: owns all execution state for one program run.
pub struct Interpreter {
    program: Program,
    pc: usize,
    locals: Locals,
    frames: FrameStack,
    primitives: PrimitiveRegistry,
    client: Box<dyn CompletionClient>,
    retry: RetryPolicy,
    trace: TraceSink,
    step_limit: Option<u64>,
    steps: u64,
}

impl Interpreter {
    /// An interpreter with the default configuration.
    ///
    /// Equivalent to `InterpreterBuilder::new(program).build()`: builtin
    /// primitives, no completion client, silent trace sink.
    pub fn new(program: Program) -> Interpreter {
        InterpreterBuilder::new(program).build()
    }

    /// Run the dispatch loop until the program halts or fails.
    pub fn run(&mut self) -> WeftResult<()> {
        while self.pc < self.program.len() {
            self.steps += 1;
            if let Some(limit) = self.step_limit {
                if self.steps > limit {
                    return Err(step_limit_exceeded(limit).at_line(self.pc));
                }
            }
            // Clone the instruction out so execution can borrow state freely.
            let Some(instruction) = self.program.get(self.pc).cloned() else {
                break;
            };
            tracing::trace!(pc = self.pc, %instruction, "dispatch");
            match self.exec(&instruction).map_err(|e| e.at_line(self.pc))? {
                Ctrl::Advance => self.pc += 1,
                Ctrl::Jump(target) => self.pc = target,
                Ctrl::Halt => {
                    self.pc = HALTED;
                    break;
                }
            }
        }
        Ok(())
    }

    /// The program being executed.
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The current program counter (`HALTED` after `exit`).
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The locals environment, for inspection after a run or a failure.
    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    /// The frame stack, for inspection after a run or a failure.
    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    /// The trace sink, for reading captured `debug` snapshots.
    pub fn trace(&self) -> &TraceSink {
        &self.trace
    }
}
