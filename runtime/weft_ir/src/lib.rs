//! Weft IR - Program representation for the weft runtime.
//!
//! This crate owns everything the runtime needs to know about a program
//! before execution starts:
//!
//! - `Instruction`: the closed instruction set, produced once per line by the
//!   load-time classifier
//! - `Template` / `Segment`: the parsed form of a push line's text
//! - `Program`: the preprocessed, addressable line sequence plus its symbol
//!   table
//! - `WeftError` / `WeftErrorKind`: the single error family shared by the
//!   loader and the runtime, with one factory function per kind

pub mod errors;
mod instruction;
mod program;
mod template;

pub use errors::{WeftError, WeftErrorKind, WeftResult};

// Re-export error constructors for convenience (canonical path is weft_ir::errors::*)
pub use errors::{
    // Load errors
    duplicate_symbol_definition, malformed_directive, unknown_instruction, unsupported_constraint,
    // Resolution errors
    undefined_symbol, undefined_variable,
    // Value and block errors
    block_close_mismatch, block_type_mismatch, cursor_out_of_range, insufficient_elements,
    type_mismatch,
    // Control flow errors
    break_outside_loop, endfor_outside_loop, return_inside_loop, return_with_empty_frame_stack,
    // Collaborator and hardening errors
    collaborator_error, step_limit_exceeded,
};
pub use instruction::{ArgCount, Instruction, COMMENT_MARKER, SILENCE_MARKER};
pub use program::{Program, FUNCTION_MARKER, LABEL_MARKER};
pub use template::{Segment, StopList, Template};
