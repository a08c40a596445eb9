//! The weft instruction set and the line classifier.
//!
//! Each source line is classified exactly once at load time into a closed
//! `Instruction` variant; the dispatcher then matches exhaustively instead of
//! re-inspecting leading tokens at run time.

use std::fmt;

use crate::errors::{malformed_directive, unknown_instruction, WeftResult};
use crate::template::Template;

/// Comment marker: lines starting with this are inert.
pub const COMMENT_MARKER: &str = ";";

/// Silence marker: lines starting with this are inert.
pub const SILENCE_MARKER: &str = ">!";

/// Argument count for `pop` and `call`.
///
/// `All` is the wildcard `*`: every element before the active block's cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgCount {
    Exact(usize),
    All,
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::All => write!(f, "*"),
        }
    }
}

/// One classified program line.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// `> <text>` — resolve the template and push the result.
    Push(Template),
    /// `pop [<n>|*] [to] <name>` — pop elements into a local.
    Pop { count: ArgCount, dest: String },
    /// `goto <name>` — unconditional transfer.
    Goto(String),
    /// `if-goto <name>` — pop one Bool; jump when true.
    IfGoto(String),
    /// `call <name> [<n>|*]`, or the bare `<name> [<n>|*]` shorthand.
    Call { name: String, count: ArgCount },
    /// `return` — pop the innermost call frame.
    Return,
    /// `for <var> in <block>` — loop header.
    For { var: String, source: String },
    /// `endfor` — loop footer.
    EndFor,
    /// `<name>` — open a named scoped block.
    OpenBlock(String),
    /// `</name>` — close a named scoped block.
    CloseBlock(String),
    /// `break` — exit the innermost loop.
    Break,
    /// `exit` — halt execution.
    Exit,
    /// `debug` — emit a trace snapshot; no state change.
    Debug,
    /// Blank lines, comments, silenced lines, and directive lines.
    Nop,
}

impl Instruction {
    /// Classify one source line (leading whitespace already stripped).
    ///
    /// Directive lines (`#`-prefixed) classify as `Nop`; their symbol table
    /// entries are extracted separately by the preprocessor.
    pub fn classify(line: &str) -> WeftResult<Instruction> {
        let line = line.trim_end();
        if line.is_empty()
            || line.starts_with(COMMENT_MARKER)
            || line.starts_with(SILENCE_MARKER)
            || line.starts_with('#')
        {
            return Ok(Instruction::Nop);
        }

        if let Some(text) = line.strip_prefix('>') {
            let text = text.strip_prefix(' ').unwrap_or(text);
            return Ok(Instruction::Push(Template::parse(text)?));
        }

        if let Some(inner) = line.strip_prefix("</") {
            return Ok(Instruction::CloseBlock(block_name(inner, line)?));
        }
        if let Some(inner) = line.strip_prefix('<') {
            return Ok(Instruction::OpenBlock(block_name(inner, line)?));
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = tokens.split_first() else {
            return Ok(Instruction::Nop);
        };

        match head {
            "pop" => parse_pop(rest),
            "goto" => parse_jump(rest, Instruction::Goto),
            "if-goto" => parse_jump(rest, Instruction::IfGoto),
            "call" => parse_call(rest),
            "return" => parse_bare(rest, "return", Instruction::Return),
            "for" => parse_for(rest),
            "endfor" => parse_bare(rest, "endfor", Instruction::EndFor),
            "break" => parse_bare(rest, "break", Instruction::Break),
            "exit" => parse_bare(rest, "exit", Instruction::Exit),
            "debug" => parse_bare(rest, "debug", Instruction::Debug),
            name => parse_shorthand_call(name, rest),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(_) => write!(f, "push"),
            Self::Pop { count, dest } => write!(f, "pop {count} to {dest}"),
            Self::Goto(name) => write!(f, "goto {name}"),
            Self::IfGoto(name) => write!(f, "if-goto {name}"),
            Self::Call { name, count } => write!(f, "call {name} {count}"),
            Self::Return => write!(f, "return"),
            Self::For { var, source } => write!(f, "for {var} in {source}"),
            Self::EndFor => write!(f, "endfor"),
            Self::OpenBlock(name) => write!(f, "open {name}"),
            Self::CloseBlock(name) => write!(f, "close {name}"),
            Self::Break => write!(f, "break"),
            Self::Exit => write!(f, "exit"),
            Self::Debug => write!(f, "debug"),
            Self::Nop => write!(f, "nop"),
        }
    }
}

fn parse_count(token: &str) -> Option<ArgCount> {
    if token == "*" {
        return Some(ArgCount::All);
    }
    token.parse::<usize>().ok().map(ArgCount::Exact)
}

fn parse_pop(rest: &[&str]) -> WeftResult<Instruction> {
    let mut rest = rest;
    let count = match rest.first().and_then(|t| parse_count(t)) {
        Some(count) => {
            rest = &rest[1..];
            count
        }
        None => ArgCount::Exact(1),
    };
    if rest.len() > 1 && rest[0] == "to" {
        rest = &rest[1..];
    }
    match rest {
        [dest] => Ok(Instruction::Pop {
            count,
            dest: (*dest).to_string(),
        }),
        _ => Err(malformed_directive("pop expects `pop [<n>|*] [to] <name>`")),
    }
}

fn parse_jump(rest: &[&str], make: impl FnOnce(String) -> Instruction) -> WeftResult<Instruction> {
    match rest {
        [name] => Ok(make((*name).to_string())),
        _ => Err(malformed_directive("jump expects a single symbol name")),
    }
}

fn parse_call(rest: &[&str]) -> WeftResult<Instruction> {
    match rest {
        [name] => Ok(Instruction::Call {
            name: (*name).to_string(),
            count: ArgCount::Exact(0),
        }),
        [name, count] => match parse_count(count) {
            Some(count) => Ok(Instruction::Call {
                name: (*name).to_string(),
                count,
            }),
            None => Err(malformed_directive(format!(
                "call count must be a number or `*`, not `{count}`"
            ))),
        },
        _ => Err(malformed_directive("call expects `call <name> [<n>|*]`")),
    }
}

fn parse_bare(rest: &[&str], keyword: &str, instruction: Instruction) -> WeftResult<Instruction> {
    if rest.is_empty() {
        Ok(instruction)
    } else {
        Err(malformed_directive(format!("`{keyword}` takes no operands")))
    }
}

fn parse_for(rest: &[&str]) -> WeftResult<Instruction> {
    match rest {
        [var, "in", source] => Ok(Instruction::For {
            var: (*var).to_string(),
            source: (*source).to_string(),
        }),
        _ => Err(malformed_directive("for expects `for <var> in <block>`")),
    }
}

/// A bare `<name> [<n>|*]` line is shorthand for `call <name> [<n>|*]`.
fn parse_shorthand_call(name: &str, rest: &[&str]) -> WeftResult<Instruction> {
    match rest {
        [] => Ok(Instruction::Call {
            name: name.to_string(),
            count: ArgCount::Exact(0),
        }),
        [count] => match parse_count(count) {
            Some(count) => Ok(Instruction::Call {
                name: name.to_string(),
                count,
            }),
            None => Err(unknown_instruction(name)),
        },
        _ => Err(unknown_instruction(name)),
    }
}

fn block_name(inner: &str, line: &str) -> WeftResult<String> {
    let Some(name) = inner.strip_suffix('>') else {
        return Err(malformed_directive(format!(
            "block marker `{line}` is missing its closing `>`"
        )));
    };
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(malformed_directive(format!(
            "block marker `{line}` must name a single block"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(line: &str) -> Instruction {
        Instruction::classify(line).unwrap()
    }

    #[test]
    fn blank_comment_silence_and_directives_are_nops() {
        assert_eq!(classify(""), Instruction::Nop);
        assert_eq!(classify("   "), Instruction::Nop);
        assert_eq!(classify("; a comment"), Instruction::Nop);
        assert_eq!(classify(">! silenced line"), Instruction::Nop);
        assert_eq!(classify("## some-label"), Instruction::Nop);
        assert_eq!(classify("# some-function"), Instruction::Nop);
    }

    #[test]
    fn push_line_keeps_text_after_marker() {
        let Instruction::Push(template) = classify("> Hello {name}!") else {
            panic!("expected push");
        };
        assert_eq!(template.segments().len(), 3);
    }

    #[test]
    fn pop_forms() {
        assert_eq!(
            classify("pop result"),
            Instruction::Pop {
                count: ArgCount::Exact(1),
                dest: "result".into()
            }
        );
        assert_eq!(
            classify("pop 3 lines"),
            Instruction::Pop {
                count: ArgCount::Exact(3),
                dest: "lines".into()
            }
        );
        assert_eq!(
            classify("pop * to rest"),
            Instruction::Pop {
                count: ArgCount::All,
                dest: "rest".into()
            }
        );
        assert_eq!(
            classify("pop to result"),
            Instruction::Pop {
                count: ArgCount::Exact(1),
                dest: "result".into()
            }
        );
    }

    #[test]
    fn pop_without_destination_is_malformed() {
        assert!(Instruction::classify("pop").is_err());
        assert!(Instruction::classify("pop 2 to a b").is_err());
    }

    #[test]
    fn jumps() {
        assert_eq!(classify("goto top"), Instruction::Goto("top".into()));
        assert_eq!(classify("if-goto done"), Instruction::IfGoto("done".into()));
        assert!(Instruction::classify("goto a b").is_err());
    }

    #[test]
    fn explicit_call_forms() {
        assert_eq!(
            classify("call review 2"),
            Instruction::Call {
                name: "review".into(),
                count: ArgCount::Exact(2)
            }
        );
        assert_eq!(
            classify("call review *"),
            Instruction::Call {
                name: "review".into(),
                count: ArgCount::All
            }
        );
        assert_eq!(
            classify("call review"),
            Instruction::Call {
                name: "review".into(),
                count: ArgCount::Exact(0)
            }
        );
        assert!(Instruction::classify("call review two").is_err());
    }

    #[test]
    fn bare_name_is_call_shorthand() {
        assert_eq!(
            classify("bool-reduce 3"),
            Instruction::Call {
                name: "bool-reduce".into(),
                count: ArgCount::Exact(3)
            }
        );
        assert_eq!(
            classify("gen"),
            Instruction::Call {
                name: "gen".into(),
                count: ArgCount::Exact(0)
            }
        );
    }

    #[test]
    fn unknown_token_shapes_are_rejected() {
        let err = Instruction::classify("frobnicate the stack").unwrap_err();
        assert_eq!(err.message, "unknown instruction: frobnicate");
    }

    #[test]
    fn for_header_shape() {
        assert_eq!(
            classify("for item in tasks"),
            Instruction::For {
                var: "item".into(),
                source: "tasks".into()
            }
        );
        assert!(Instruction::classify("for item of tasks").is_err());
        assert!(Instruction::classify("for item").is_err());
    }

    #[test]
    fn block_markers() {
        assert_eq!(classify("<scratch>"), Instruction::OpenBlock("scratch".into()));
        assert_eq!(classify("</scratch>"), Instruction::CloseBlock("scratch".into()));
        assert!(Instruction::classify("<scratch").is_err());
        assert!(Instruction::classify("<two words>").is_err());
    }

    #[test]
    fn keywords_take_no_operands() {
        assert_eq!(classify("return"), Instruction::Return);
        assert_eq!(classify("endfor"), Instruction::EndFor);
        assert_eq!(classify("break"), Instruction::Break);
        assert_eq!(classify("exit"), Instruction::Exit);
        assert_eq!(classify("debug"), Instruction::Debug);
        assert!(Instruction::classify("return 1").is_err());
    }
}
