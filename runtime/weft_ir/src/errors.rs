//! Error types for loading and executing weft programs.
//!
//! Every failure the runtime can produce is fatal: the dispatcher halts and
//! the last consistent snapshot of the execution state is left in place for
//! inspection. Errors carry the offending line index when one is known.
//!
//! # Structured Error Categories
//!
//! `WeftErrorKind` provides typed error categories. Factory functions (e.g.
//! `undefined_symbol()`) are the public API — they populate both `kind` and
//! `message`, and the dispatcher tags the line index via `at_line`.

use std::fmt;

/// Result of a load or execution step.
pub type WeftResult<T> = Result<T, WeftError>;

/// Typed error category.
///
/// Each variant carries the structured data for the error condition,
/// enabling programmatic matching instead of string parsing. The `Display`
/// impl produces the human-readable message stored on `WeftError`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WeftErrorKind {
    // Load
    UnknownInstruction {
        token: String,
    },
    MalformedDirective {
        detail: String,
    },
    DuplicateSymbolDefinition {
        name: String,
        first_line: usize,
    },
    UnsupportedConstraint {
        token: String,
    },

    // Resolution
    UndefinedSymbol {
        name: String,
    },
    UndefinedVariable {
        name: String,
    },

    // Values and blocks
    TypeMismatch {
        expected: String,
        got: String,
    },
    InsufficientElements {
        requested: usize,
        available: usize,
    },
    CursorOutOfRange {
        index: usize,
        len: usize,
    },
    BlockTypeMismatch {
        name: String,
    },
    BlockCloseMismatch {
        expected: String,
        got: String,
    },

    // Control flow
    BreakOutsideLoop,
    EndforOutsideLoop,
    ReturnWithEmptyFrameStack,
    ReturnInsideLoop,

    // Collaborators
    CollaboratorError {
        detail: String,
    },

    // Hardening
    StepLimitExceeded {
        limit: u64,
    },
}

impl fmt::Display for WeftErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Load
            Self::UnknownInstruction { token } => {
                write!(f, "unknown instruction: {token}")
            }
            Self::MalformedDirective { detail } => {
                write!(f, "malformed directive: {detail}")
            }
            Self::DuplicateSymbolDefinition { name, first_line } => {
                write!(
                    f,
                    "symbol `{name}` is already defined at line {first_line}"
                )
            }
            Self::UnsupportedConstraint { token } => {
                write!(f, "unsupported hole constraint: {token}")
            }

            // Resolution
            Self::UndefinedSymbol { name } => write!(f, "undefined symbol: {name}"),
            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),

            // Values and blocks
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InsufficientElements {
                requested,
                available,
            } => {
                write!(
                    f,
                    "insufficient elements: requested {requested}, have {available}"
                )
            }
            Self::CursorOutOfRange { index, len } => {
                write!(f, "cursor index {index} out of range for block of length {len}")
            }
            Self::BlockTypeMismatch { name } => {
                write!(f, "`{name}` holds a scalar value, not a block")
            }
            Self::BlockCloseMismatch { expected, got } => {
                write!(f, "cannot close `{got}`: the active block is `{expected}`")
            }

            // Control flow
            Self::BreakOutsideLoop => write!(f, "break outside of a loop"),
            Self::EndforOutsideLoop => write!(f, "endfor outside of a loop"),
            Self::ReturnWithEmptyFrameStack => {
                write!(f, "return with no call frame to return to")
            }
            Self::ReturnInsideLoop => {
                write!(f, "return inside an open loop (break out of the loop first)")
            }

            // Collaborators
            Self::CollaboratorError { detail } => write!(f, "collaborator failed: {detail}"),

            // Hardening
            Self::StepLimitExceeded { limit } => {
                write!(f, "step limit of {limit} instructions exceeded")
            }
        }
    }
}

/// Load or runtime error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeftError {
    /// Structured error category.
    pub kind: WeftErrorKind,
    /// Human-readable message, equal to `kind.to_string()`.
    pub message: String,
    /// Line index the error is attributed to, when known.
    pub line: Option<usize>,
}

impl WeftError {
    /// Create an error from a structured kind.
    ///
    /// The message is computed from the kind's `Display` impl. Used
    /// internally by the factory functions.
    fn from_kind(kind: WeftErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            line: None,
        }
    }

    /// Attach a line index if one is not already recorded.
    ///
    /// The innermost site that knows the line wins; outer layers calling
    /// `at_line` again leave the original attribution intact.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }
}

impl fmt::Display for WeftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for WeftError {}

// Factory functions.
//
// One constructor per kind, mirroring the kind's fields. These are the only
// way errors are produced outside this module.

/// Unknown leading token on a program line.
pub fn unknown_instruction(token: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::UnknownInstruction {
        token: token.into(),
    })
}

/// Directive line that does not match its required shape.
pub fn malformed_directive(detail: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::MalformedDirective {
        detail: detail.into(),
    })
}

/// A label or function directive redefining an existing name.
pub fn duplicate_symbol_definition(name: impl Into<String>, first_line: usize) -> WeftError {
    WeftError::from_kind(WeftErrorKind::DuplicateSymbolDefinition {
        name: name.into(),
        first_line,
    })
}

/// A hole constraint token the resolver does not support.
pub fn unsupported_constraint(token: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::UnsupportedConstraint {
        token: token.into(),
    })
}

/// `goto`/`if-goto`/`call` target missing from the symbol table.
pub fn undefined_symbol(name: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::UndefinedSymbol { name: name.into() })
}

/// Template variable or loop source missing from the locals.
pub fn undefined_variable(name: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::UndefinedVariable { name: name.into() })
}

/// Wrong value tag for an operation (e.g. non-Bool fed to `if-goto`).
pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::TypeMismatch {
        expected: expected.into(),
        got: got.into(),
    })
}

/// A pop or call asked for more elements than the block holds.
pub fn insufficient_elements(requested: usize, available: usize) -> WeftError {
    WeftError::from_kind(WeftErrorKind::InsufficientElements {
        requested,
        available,
    })
}

/// `select` index outside `[0, len]`.
pub fn cursor_out_of_range(index: usize, len: usize) -> WeftError {
    WeftError::from_kind(WeftErrorKind::CursorOutOfRange { index, len })
}

/// Opening a block over a name bound to a scalar.
pub fn block_type_mismatch(name: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::BlockTypeMismatch { name: name.into() })
}

/// Closing a block that is not the active one.
pub fn block_close_mismatch(expected: impl Into<String>, got: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::BlockCloseMismatch {
        expected: expected.into(),
        got: got.into(),
    })
}

/// `break` with no loop frame innermost.
pub fn break_outside_loop() -> WeftError {
    WeftError::from_kind(WeftErrorKind::BreakOutsideLoop)
}

/// `endfor` with no loop frame innermost.
pub fn endfor_outside_loop() -> WeftError {
    WeftError::from_kind(WeftErrorKind::EndforOutsideLoop)
}

/// `return` with an empty frame stack.
pub fn return_with_empty_frame_stack() -> WeftError {
    WeftError::from_kind(WeftErrorKind::ReturnWithEmptyFrameStack)
}

/// `return` while the innermost frame is a loop frame.
pub fn return_inside_loop() -> WeftError {
    WeftError::from_kind(WeftErrorKind::ReturnInsideLoop)
}

/// Completion or primitive collaborator failure.
pub fn collaborator_error(detail: impl Into<String>) -> WeftError {
    WeftError::from_kind(WeftErrorKind::CollaboratorError {
        detail: detail.into(),
    })
}

/// Configured step limit exhausted.
pub fn step_limit_exceeded(limit: u64) -> WeftError {
    WeftError::from_kind(WeftErrorKind::StepLimitExceeded { limit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_matches_kind_display() {
        let err = undefined_symbol("plan");
        assert_eq!(err.message, "undefined symbol: plan");
        assert_eq!(err.message, err.kind.to_string());
    }

    #[test]
    fn at_line_keeps_innermost_attribution() {
        let err = insufficient_elements(3, 1).at_line(7).at_line(42);
        assert_eq!(err.line, Some(7));
        assert_eq!(err.to_string(), "line 7: insufficient elements: requested 3, have 1");
    }

    #[test]
    fn display_without_line() {
        let err = break_outside_loop();
        assert_eq!(err.to_string(), "break outside of a loop");
    }
}
