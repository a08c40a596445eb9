//! Template syntax for push lines.
//!
//! A push line's text is scanned once at load time into a sequence of
//! segments, matched left to right over non-escaped bracket pairs:
//!
//! - literal text, passed through verbatim;
//! - `{name}` — substitute the serialized form of the local `name`;
//! - `[dest|*stop|...]` — a hole: ask the completion collaborator for text,
//!   bind it to the local `dest`, optionally truncated at a stop sequence.
//!
//! Backslash-escaped `[` `]` `{` `}` are literal (the backslash is consumed);
//! a backslash before any other character is kept verbatim. In stop tokens,
//! `\n` denotes a newline so scripts can stop a completion at end of line.

use smallvec::SmallVec;

use crate::errors::{malformed_directive, unsupported_constraint, WeftResult};

/// Stop sequences for a hole. Nearly always zero or one entry.
pub type StopList = SmallVec<[String; 1]>;

/// One scanned piece of a push line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text, escapes already unescaped.
    Literal(String),
    /// `{name}` — local substitution, no collaborator involved.
    Variable(String),
    /// `[dest|*stop|...]` — completion request bound to `dest`.
    Hole { dest: String, stops: StopList },
}

/// A parsed push line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Scan `text` into segments.
    ///
    /// Fails on an unterminated `{...}` or `[...]`, an empty variable or
    /// destination name, and on any hole constraint that is not a `*`-prefixed
    /// stop token.
    pub fn parse(text: &str) -> WeftResult<Template> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped @ ('[' | ']' | '{' | '}')) => literal.push(escaped),
                    Some(other) => {
                        literal.push('\\');
                        literal.push(other);
                    }
                    None => literal.push('\\'),
                },
                '{' => {
                    flush_literal(&mut literal, &mut segments);
                    segments.push(scan_variable(&mut chars)?);
                }
                '[' => {
                    flush_literal(&mut literal, &mut segments);
                    segments.push(scan_hole(&mut chars)?);
                }
                other => literal.push(other),
            }
        }
        flush_literal(&mut literal, &mut segments);

        Ok(Template { segments })
    }

    /// The scanned segments, in source order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the line contains at least one hole.
    pub fn has_holes(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Hole { .. }))
    }
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn scan_variable(chars: &mut std::str::Chars<'_>) -> WeftResult<Segment> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == '}' {
            if name.is_empty() {
                return Err(malformed_directive("empty `{}` variable segment"));
            }
            return Ok(Segment::Variable(name));
        }
        name.push(c);
    }
    Err(malformed_directive("unterminated `{` variable segment"))
}

fn scan_hole(chars: &mut std::str::Chars<'_>) -> WeftResult<Segment> {
    let mut body = String::new();
    let mut closed = false;
    while let Some(c) = chars.next() {
        match c {
            ']' => {
                closed = true;
                break;
            }
            '\\' => match chars.next() {
                Some(escaped @ ('[' | ']' | '{' | '}')) => body.push(escaped),
                Some(other) => {
                    body.push('\\');
                    body.push(other);
                }
                None => body.push('\\'),
            },
            other => body.push(other),
        }
    }
    if !closed {
        return Err(malformed_directive("unterminated `[` hole segment"));
    }

    let mut tokens = body.split('|');
    let dest = tokens.next().unwrap_or("").trim().to_string();
    if dest.is_empty() {
        return Err(malformed_directive("hole without a destination name"));
    }

    let mut stops = StopList::new();
    for token in tokens {
        match token.strip_prefix('*') {
            Some(stop) => stops.push(unescape_stop(stop)),
            None => return Err(unsupported_constraint(token)),
        }
    }
    Ok(Segment::Hole { dest, stops })
}

/// Translate `\n` in a stop token to a newline.
fn unescape_stop(token: &str) -> String {
    token.replace("\\n", "\n")
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    #[test]
    fn plain_text_is_one_literal() {
        let t = Template::parse("Hello world").unwrap();
        assert_eq!(t.segments(), &[lit("Hello world")]);
        assert!(!t.has_holes());
    }

    #[test]
    fn variable_between_literals() {
        let t = Template::parse("Hello {name}!").unwrap();
        assert_eq!(
            t.segments(),
            &[lit("Hello "), Segment::Variable("name".into()), lit("!")]
        );
    }

    #[test]
    fn hole_with_stop_token() {
        let t = Template::parse("Say [greeting|*\\n]").unwrap();
        let Segment::Hole { dest, stops } = &t.segments()[1] else {
            panic!("expected hole");
        };
        assert_eq!(dest, "greeting");
        assert_eq!(stops.as_slice(), &["\n".to_string()]);
        assert!(t.has_holes());
    }

    #[test]
    fn hole_without_constraints() {
        let t = Template::parse("[answer]").unwrap();
        assert_eq!(
            t.segments(),
            &[Segment::Hole {
                dest: "answer".into(),
                stops: StopList::new(),
            }]
        );
    }

    #[test]
    fn multiple_stop_tokens() {
        let t = Template::parse("[verdict|*Yes|*No]").unwrap();
        let Segment::Hole { stops, .. } = &t.segments()[0] else {
            panic!("expected hole");
        };
        assert_eq!(stops.as_slice(), &["Yes".to_string(), "No".to_string()]);
    }

    #[test]
    fn escaped_brackets_are_literal() {
        let t = Template::parse("array\\[0\\] and \\{braces\\}").unwrap();
        assert_eq!(t.segments(), &[lit("array[0] and {braces}")]);
    }

    #[test]
    fn backslash_before_other_chars_kept() {
        let t = Template::parse("a\\nb").unwrap();
        assert_eq!(t.segments(), &[lit("a\\nb")]);
    }

    #[test]
    fn unsupported_constraint_is_rejected() {
        let err = Template::parse("[x|maxlen=4]").unwrap_err();
        assert_eq!(err.message, "unsupported hole constraint: maxlen=4");
    }

    #[test]
    fn unterminated_variable_is_rejected() {
        assert!(Template::parse("Hello {name").is_err());
    }

    #[test]
    fn unterminated_hole_is_rejected() {
        assert!(Template::parse("Say [greeting").is_err());
    }

    #[test]
    fn empty_hole_dest_is_rejected() {
        assert!(Template::parse("[|*x]").is_err());
    }

    #[test]
    fn stray_closers_stay_literal() {
        let t = Template::parse("a } b ] c").unwrap();
        assert_eq!(t.segments(), &[lit("a } b ] c")]);
    }
}
