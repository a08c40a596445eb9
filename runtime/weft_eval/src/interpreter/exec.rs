//! Instruction execution.
//!
//! One method per instruction, dispatched by exhaustive matching from
//! `exec`. Control transfers follow the jump convention of the symbol
//! table: directive lines are `Nop`s, so jumping to a symbol's own line
//! falls through into the body.

use weft_ir::{
    block_type_mismatch, break_outside_loop, collaborator_error, endfor_outside_loop,
    insufficient_elements, malformed_directive, return_inside_loop,
    return_with_empty_frame_stack, type_mismatch, undefined_symbol, undefined_variable, ArgCount,
    Instruction, Template, WeftResult,
};

use crate::block::{Block, Entry};
use crate::environment::Locals;
use crate::frames::{ForFrame, Frame, FrameEntry};
use crate::template::resolve;
use crate::trace::render_snapshot;
use crate::value::Value;

use super::{Ctrl, Interpreter};

impl Interpreter {
    pub(super) fn exec(&mut self, instruction: &Instruction) -> WeftResult<Ctrl> {
        match instruction {
            Instruction::Nop => Ok(Ctrl::Advance),
            Instruction::Push(template) => self.exec_push(template),
            Instruction::Pop { count, dest } => self.exec_pop(*count, dest),
            Instruction::Goto(name) => self.exec_goto(name),
            Instruction::IfGoto(name) => self.exec_if_goto(name),
            Instruction::Call { name, count } => self.exec_call(name, *count),
            Instruction::Return => self.exec_return(),
            Instruction::For { var, source } => self.exec_for(var, source),
            Instruction::EndFor => self.exec_endfor(),
            Instruction::OpenBlock(name) => {
                self.locals.open_block(name)?;
                Ok(Ctrl::Advance)
            }
            Instruction::CloseBlock(name) => {
                self.locals.close_block(name)?;
                Ok(Ctrl::Advance)
            }
            Instruction::Break => self.exec_break(),
            Instruction::Exit => Ok(Ctrl::Halt),
            Instruction::Debug => {
                let snapshot = render_snapshot(self.pc, &self.frames, &self.locals);
                self.trace.emit(&snapshot);
                Ok(Ctrl::Advance)
            }
        }
    }

    /// Literal or wildcard argument count against the active block.
    fn resolve_count(&self, count: ArgCount) -> usize {
        match count {
            ArgCount::Exact(n) => n,
            ArgCount::All => self.locals.active().before_cursor(),
        }
    }

    /// Pop exactly one entry from the active block.
    fn pop_one(&mut self) -> WeftResult<Entry> {
        let mut popped = self.locals.active_mut().pop(1)?;
        match popped.pop() {
            Some(entry) => Ok(entry),
            None => Err(insufficient_elements(1, 0)),
        }
    }

    fn exec_push(&mut self, template: &Template) -> WeftResult<Ctrl> {
        let text = resolve(template, &mut self.locals, self.client.as_mut(), self.retry)?;
        self.locals
            .active_mut()
            .push(Entry::Scalar(Value::parse(&text)));
        Ok(Ctrl::Advance)
    }

    fn exec_pop(&mut self, count: ArgCount, dest: &str) -> WeftResult<Ctrl> {
        let n = self.resolve_count(count);
        let entries = self.locals.active_mut().pop(n)?;
        match self.locals.get_mut(dest) {
            Some(Entry::Nested(block)) => block.push_all(entries),
            Some(Entry::Scalar(_)) => {
                // A scalar destination is overwritten by a single popped
                // entry; a multi-element pop needs a block destination.
                match <[Entry; 1]>::try_from(entries) {
                    Ok([entry]) => self.locals.define(dest, entry)?,
                    Err(_) => return Err(block_type_mismatch(dest)),
                }
            }
            None => {
                self.locals
                    .define(dest, Entry::Nested(Block::from_entries(entries)))?;
            }
        }
        Ok(Ctrl::Advance)
    }

    fn exec_goto(&mut self, name: &str) -> WeftResult<Ctrl> {
        let target = self
            .program
            .symbol(name)
            .ok_or_else(|| undefined_symbol(name))?;
        tracing::debug!(name, target, "goto");
        Ok(Ctrl::Jump(target))
    }

    fn exec_if_goto(&mut self, name: &str) -> WeftResult<Ctrl> {
        // Resolve the target on both branches; a dangling symbol is a
        // script bug whether or not this run takes the jump.
        let target = self
            .program
            .symbol(name)
            .ok_or_else(|| undefined_symbol(name))?;
        match self.pop_one()? {
            Entry::Scalar(Value::Bool(true)) => {
                tracing::debug!(name, target, "if-goto taken");
                Ok(Ctrl::Jump(target))
            }
            Entry::Scalar(Value::Bool(false)) => Ok(Ctrl::Advance),
            other => Err(type_mismatch("bool", other.kind())),
        }
    }

    fn exec_call(&mut self, name: &str, count: ArgCount) -> WeftResult<Ctrl> {
        let n = self.resolve_count(count);
        let args = self.locals.active_mut().pop(n)?;

        // Primitives bypass the frame protocol entirely.
        if let Some(primitive) = self.primitives.get(name) {
            tracing::debug!(name, args = args.len(), "primitive call");
            let result = primitive(args).map_err(collaborator_error)?;
            self.locals.active_mut().push_all(result);
            return Ok(Ctrl::Advance);
        }

        let entry = self
            .program
            .symbol(name)
            .ok_or_else(|| undefined_symbol(name))?;
        tracing::debug!(name, entry, args = n, "call");
        let saved = std::mem::replace(&mut self.locals, Locals::with_args(args));
        self.frames.push(FrameEntry::Call(Frame {
            name: name.to_string(),
            return_pc: self.pc,
            saved,
        }));
        Ok(Ctrl::Jump(entry))
    }

    fn exec_return(&mut self) -> WeftResult<Ctrl> {
        match self.frames.pop() {
            None => Err(return_with_empty_frame_stack()),
            Some(FrameEntry::Loop(frame)) => {
                // Leave the stack as it was for diagnostics.
                self.frames.push(FrameEntry::Loop(frame));
                Err(return_inside_loop())
            }
            Some(FrameEntry::Call(frame)) => {
                let result = self.locals.active_mut().take_entries();
                tracing::debug!(
                    name = %frame.name,
                    resume = frame.return_pc + 1,
                    results = result.len(),
                    "return"
                );
                self.locals = frame.saved;
                self.locals.active_mut().push_all(result);
                Ok(Ctrl::Jump(frame.return_pc + 1))
            }
        }
    }

    fn exec_for(&mut self, var: &str, source: &str) -> WeftResult<Ctrl> {
        let reentry =
            matches!(self.frames.last(), Some(FrameEntry::Loop(f)) if f.open_pc == self.pc);

        if reentry {
            if let Some(FrameEntry::Loop(frame)) = self.frames.last_mut() {
                // The body has been closed once; this is an endfor re-entry.
                if frame.close_pc.is_some() {
                    frame.index += 1;
                    let block_name = frame.block_name.clone();
                    if let Some(Entry::Nested(block)) = self.locals.get_mut(&block_name) {
                        block.clear();
                    }
                }
            }
        } else {
            match self.locals.get(source) {
                None => return Err(undefined_variable(source)),
                Some(Entry::Scalar(value)) => return Err(type_mismatch("block", value.kind())),
                Some(Entry::Nested(block)) => {
                    if block.is_empty() {
                        return Err(insufficient_elements(1, 0));
                    }
                }
            }
            let block_name = format!("for:{var}:{source}");
            self.locals.open_block(&block_name)?;
            self.frames.push(FrameEntry::Loop(ForFrame {
                block_name,
                open_pc: self.pc,
                close_pc: None,
                index: 0,
                var: var.to_string(),
                source: source.to_string(),
            }));
        }

        let (index, close_pc, block_name) = match self.frames.last() {
            Some(FrameEntry::Loop(frame)) => {
                (frame.index, frame.close_pc, frame.block_name.clone())
            }
            _ => return Err(endfor_outside_loop()),
        };

        let element = match self.locals.get(source) {
            Some(Entry::Nested(block)) => {
                if index >= block.len() {
                    None
                } else {
                    block.get(index).cloned()
                }
            }
            Some(Entry::Scalar(value)) => return Err(type_mismatch("block", value.kind())),
            None => return Err(undefined_variable(source)),
        };

        match element {
            Some(element) => {
                tracing::trace!(var, index, "loop iteration");
                self.locals.define(var, element)?;
                Ok(Ctrl::Advance)
            }
            None => {
                let Some(close) = close_pc else {
                    return Err(malformed_directive(
                        "loop source shrank to empty before its `endfor` was found",
                    ));
                };
                tracing::debug!(var, source, "loop done");
                self.frames.pop();
                self.locals.remove(var);
                self.locals.close_block(&block_name)?;
                Ok(Ctrl::Jump(close + 1))
            }
        }
    }

    fn exec_endfor(&mut self) -> WeftResult<Ctrl> {
        match self.frames.last_mut() {
            Some(FrameEntry::Loop(frame)) => {
                // First pass fixes the loop's lower boundary permanently.
                if frame.close_pc.is_none() {
                    frame.close_pc = Some(self.pc);
                }
                Ok(Ctrl::Jump(frame.open_pc))
            }
            _ => Err(endfor_outside_loop()),
        }
    }

    fn exec_break(&mut self) -> WeftResult<Ctrl> {
        let frame = match self.frames.pop() {
            Some(FrameEntry::Loop(frame)) => frame,
            Some(other) => {
                self.frames.push(other);
                return Err(break_outside_loop());
            }
            None => return Err(break_outside_loop()),
        };
        let close = match frame.close_pc {
            Some(close) => close,
            // Break on the first pass: the endfor has not run yet, so find it.
            None => self.find_endfor(frame.open_pc)?,
        };
        tracing::debug!(var = %frame.var, close, "break");
        self.locals.remove(&frame.var);
        self.locals.close_block(&frame.block_name)?;
        Ok(Ctrl::Jump(close + 1))
    }

    /// Line index of the `endfor` matching the `for` at `open_pc`.
    fn find_endfor(&self, open_pc: usize) -> WeftResult<usize> {
        let mut depth = 0usize;
        for (offset, instruction) in self.program.instructions()[open_pc + 1..].iter().enumerate() {
            match instruction {
                Instruction::For { .. } => depth += 1,
                Instruction::EndFor => {
                    if depth == 0 {
                        return Ok(open_pc + 1 + offset);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(malformed_directive("`for` without a matching `endfor`"))
    }
}
