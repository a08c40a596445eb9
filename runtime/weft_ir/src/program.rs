//! Preprocessing: raw source text into an addressable program.
//!
//! The preprocessor makes a single pass over the source lines. Directive
//! lines (`## <name>` labels, `# <name>` function entries) contribute their
//! `name -> line index` mapping to the symbol table and stay in the line
//! sequence as `Nop`s, so every address is a raw source line index. All
//! other lines are classified once into `Instruction`s, in original order
//! and count.

use rustc_hash::FxHashMap;

use crate::errors::{duplicate_symbol_definition, malformed_directive, WeftResult};
use crate::instruction::Instruction;

/// Label directive prefix: `## <name>` marks an addressable point.
pub const LABEL_MARKER: &str = "##";

/// Function directive prefix: `# <name>` marks a callable's entry line.
pub const FUNCTION_MARKER: &str = "#";

/// An immutable, addressable weft program.
#[derive(Clone, Debug)]
pub struct Program {
    instructions: Vec<Instruction>,
    symbols: FxHashMap<String, usize>,
    lines: Vec<String>,
}

impl Program {
    /// Preprocess `source` into a program.
    ///
    /// Fails on the first malformed or unknown line, and on a label or
    /// function directive redefining an existing name. Errors carry the
    /// offending line index.
    pub fn load(source: &str) -> WeftResult<Program> {
        let mut instructions = Vec::new();
        let mut symbols: FxHashMap<String, usize> = FxHashMap::default();
        let mut lines = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = raw.trim_start();

            if let Some(name) = directive_name(line) {
                let name = name.map_err(|e| e.at_line(index))?;
                if let Some(&first_line) = symbols.get(&name) {
                    return Err(duplicate_symbol_definition(name, first_line).at_line(index));
                }
                symbols.insert(name, index);
                instructions.push(Instruction::Nop);
            } else {
                instructions.push(Instruction::classify(line).map_err(|e| e.at_line(index))?);
            }
            lines.push(raw.to_string());
        }

        Ok(Program {
            instructions,
            symbols,
            lines,
        })
    }

    /// The instruction at `pc`, if within the program.
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    /// Number of lines (and instructions) in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program has no lines.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Resolve a symbol to its line index.
    pub fn symbol(&self, name: &str) -> Option<usize> {
        self.symbols.get(name).copied()
    }

    /// All symbols, unordered.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, usize)> {
        self.symbols.iter().map(|(name, &index)| (name.as_str(), index))
    }

    /// The classified instructions, in line order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The raw source line at `index`, for diagnostics.
    pub fn source_line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}

/// Extract a directive's name, if `line` is a directive.
///
/// Returns `None` for non-directive lines. A directive with a missing or
/// multi-token name is malformed.
fn directive_name(line: &str) -> Option<WeftResult<String>> {
    let rest = if let Some(rest) = line.strip_prefix(LABEL_MARKER) {
        rest
    } else if let Some(rest) = line.strip_prefix(FUNCTION_MARKER) {
        rest
    } else {
        return None;
    };

    let name = rest.trim();
    if name.is_empty() || name.split_whitespace().count() != 1 {
        return Some(Err(malformed_directive(format!(
            "directive `{line}` must name a single symbol"
        ))));
    }
    Some(Ok(name.to_string()))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "\
; warm-up
# greet
> Hello
return
## main
call greet 0
exit
";

    #[test]
    fn directives_stay_in_the_line_sequence() {
        let program = Program::load(SOURCE).unwrap();
        assert_eq!(program.len(), 7);
        assert_eq!(program.get(1), Some(&Instruction::Nop));
        assert_eq!(program.get(4), Some(&Instruction::Nop));
    }

    #[test]
    fn symbols_map_to_raw_line_indices() {
        let program = Program::load(SOURCE).unwrap();
        assert_eq!(program.symbol("greet"), Some(1));
        assert_eq!(program.symbol("main"), Some(4));
        assert_eq!(program.symbol("missing"), None);
    }

    #[test]
    fn duplicate_symbol_is_fatal_with_second_line() {
        let err = Program::load("## twice\n## twice\n").unwrap_err();
        assert_eq!(err.line, Some(1));
        assert_eq!(err.message, "symbol `twice` is already defined at line 0");
    }

    #[test]
    fn label_and_function_share_one_namespace() {
        let err = Program::load("# name\n## name\n").unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn classification_errors_carry_the_line() {
        let err = Program::load("> ok\nfrobnicate the stack\n").unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn directive_without_name_is_malformed() {
        assert!(Program::load("##\n").is_err());
        assert!(Program::load("# two words\n").is_err());
    }

    #[test]
    fn source_lines_are_retained_verbatim() {
        let program = Program::load("    > indented\n").unwrap();
        assert_eq!(program.source_line(0), Some("    > indented"));
    }

    #[test]
    fn leading_whitespace_is_ignored_for_classification() {
        let program = Program::load("    ## inner\n").unwrap();
        assert_eq!(program.symbol("inner"), Some(0));
    }
}
