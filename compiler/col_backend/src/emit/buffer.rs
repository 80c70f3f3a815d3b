//! Instruction buffer with forward-jump patching.
//!
//! A forward jump is reserved with an unresolved argument and patched once
//! the target (the end of the buffer at that time) is known. Each reserved
//! jump yields a [`JumpAnchor`] that must be patched exactly once; building
//! a buffer with an unpatched jump is an internal problem.
//!
//! Jumps of distance zero are elided. Eliding shortens the buffer, so
//! already patched jumps that pointed past the removed instruction are
//! pulled back by one, which may in turn make one of them zero-length.

use col_diagnostic::{Problem, Result};

use crate::opcode::Opcode;

/// Argument of an instruction.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Operand {
    Byte(u8),
    /// A forward jump waiting for its target.
    Unresolved,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    #[inline]
    pub const fn new(opcode: Opcode, arg: u8) -> Self {
        Instruction {
            opcode,
            operand: Operand::Byte(arg),
        }
    }
}

/// A reserved forward jump. Consumed by [`InstructionBuffer::patch`].
#[derive(Debug)]
#[must_use = "a reserved jump must be patched"]
pub struct JumpAnchor {
    index: usize,
}

/// Target of a backward jump.
#[derive(Copy, Clone, Debug)]
pub struct LoopHead {
    index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct InstructionBuffer {
    instructions: Vec<Instruction>,
}

impl InstructionBuffer {
    pub fn new() -> Self {
        InstructionBuffer::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn push(&mut self, opcode: Opcode, arg: u8) {
        self.instructions.push(Instruction::new(opcode, arg));
    }

    /// Push an instruction without argument.
    pub fn push_op(&mut self, opcode: Opcode) {
        self.push(opcode, 0);
    }

    /// Push an index argument, which must fit the one-byte operand.
    pub fn push_index(&mut self, opcode: Opcode, index: usize, what: &str) -> Result<()> {
        let arg = u8::try_from(index)
            .map_err(|_| Problem::internal(format!("{what} index {index} exceeds one byte")))?;
        self.push(opcode, arg);
        Ok(())
    }

    /// Reserve a forward jump to a target not yet emitted.
    pub fn reserve_jump(&mut self, opcode: Opcode) -> JumpAnchor {
        debug_assert!(opcode.is_forward_jump());
        let index = self.instructions.len();
        self.instructions.push(Instruction {
            opcode,
            operand: Operand::Unresolved,
        });
        JumpAnchor { index }
    }

    /// Point a reserved jump at the current end of the buffer.
    pub fn patch(&mut self, anchor: JumpAnchor) -> Result<()> {
        let offset = self.instructions.len() - (anchor.index + 1);
        if offset == 0 {
            self.elide(anchor.index);
            return Ok(());
        }
        let arg = u8::try_from(offset)
            .map_err(|_| Problem::internal(format!("jump offset {offset} exceeds one byte")))?;
        match self.instructions.get_mut(anchor.index) {
            Some(jump) if jump.operand == Operand::Unresolved => {
                jump.operand = Operand::Byte(arg);
                Ok(())
            }
            _ => Err(Problem::internal("jump anchor does not refer to a reserved jump")),
        }
    }

    /// Remember the current end as the target of a later backward jump.
    pub fn loop_head(&self) -> LoopHead {
        LoopHead {
            index: self.instructions.len(),
        }
    }

    /// Emit a backward jump to `head`.
    pub fn jump_back(&mut self, head: LoopHead) -> Result<()> {
        let offset = self.instructions.len() + 1 - head.index;
        let arg = u8::try_from(offset)
            .map_err(|_| Problem::internal(format!("jump offset {offset} exceeds one byte")))?;
        self.push(Opcode::JmpB, arg);
        Ok(())
    }

    /// Remove or neutralize the zero-length jump at `index`, the last
    /// instruction.
    ///
    /// A conditional jump still pops its condition, so it becomes `DROP`.
    fn elide(&mut self, mut index: usize) {
        loop {
            if self.instructions[index].opcode == Opcode::JmpFf {
                tracing::trace!(index, "zero-length conditional jump becomes DROP");
                self.instructions[index] = Instruction::new(Opcode::Drop, 0);
                return;
            }

            tracing::trace!(index, "eliding zero-length jump");
            self.instructions.truncate(index);

            // Jumps that targeted the old end now target the new one.
            let old_end = index + 1;
            let mut next = None;
            for (at, instruction) in self.instructions.iter_mut().enumerate() {
                if !instruction.opcode.is_forward_jump() {
                    continue;
                }
                let Operand::Byte(offset) = instruction.operand else {
                    continue;
                };
                if at + 1 + usize::from(offset) == old_end {
                    instruction.operand = Operand::Byte(offset - 1);
                    if offset == 1 {
                        next = Some(at);
                    }
                }
            }

            match next {
                Some(at) => index = at,
                None => return,
            }
        }
    }

    /// Encode as two bytes per instruction.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut code = Vec::with_capacity(self.instructions.len() * 2);
        for (at, instruction) in self.instructions.iter().enumerate() {
            let Operand::Byte(arg) = instruction.operand else {
                return Err(Problem::internal(format!(
                    "unresolved {} at instruction {at}",
                    instruction.opcode
                )));
            };
            code.push(instruction.opcode.byte());
            code.push(arg);
        }
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn ops(buffer: &InstructionBuffer) -> Vec<(Opcode, u8)> {
        buffer
            .instructions()
            .iter()
            .map(|i| match i.operand {
                Operand::Byte(arg) => (i.opcode, arg),
                Operand::Unresolved => (i.opcode, 0xFF),
            })
            .collect()
    }

    #[test]
    fn test_patch_forward_jump() {
        let mut buffer = InstructionBuffer::new();
        buffer.push_op(Opcode::True);
        let anchor = buffer.reserve_jump(Opcode::JmpFf);
        buffer.push(Opcode::Int, 1);
        buffer.push_op(Opcode::Drop);
        buffer.patch(anchor).unwrap();
        assert_eq!(
            buffer.build().unwrap(),
            vec![0x30, 0, 0x41, 2, 0x32, 1, 0x09, 0]
        );
    }

    #[test]
    fn test_zero_length_jump_is_removed() {
        let mut buffer = InstructionBuffer::new();
        buffer.push_op(Opcode::None);
        let anchor = buffer.reserve_jump(Opcode::JmpF);
        buffer.patch(anchor).unwrap();
        assert_eq!(ops(&buffer), vec![(Opcode::None, 0)]);
    }

    #[test]
    fn test_zero_length_conditional_jump_becomes_drop() {
        let mut buffer = InstructionBuffer::new();
        buffer.push_op(Opcode::True);
        let anchor = buffer.reserve_jump(Opcode::JmpFf);
        buffer.patch(anchor).unwrap();
        assert_eq!(ops(&buffer), vec![(Opcode::True, 0), (Opcode::Drop, 0)]);
    }

    #[test]
    fn test_elision_retargets_earlier_jumps() {
        // if c { x } else { } : the else jump is empty and removed
        let mut buffer = InstructionBuffer::new();
        buffer.push_op(Opcode::True);
        let if_false = buffer.reserve_jump(Opcode::JmpFf);
        buffer.push(Opcode::Int, 1);
        buffer.push_op(Opcode::Drop);
        let if_end = buffer.reserve_jump(Opcode::JmpF);
        buffer.patch(if_false).unwrap();
        buffer.patch(if_end).unwrap();
        assert_eq!(
            ops(&buffer),
            vec![
                (Opcode::True, 0),
                (Opcode::JmpFf, 2),
                (Opcode::Int, 1),
                (Opcode::Drop, 0),
            ]
        );
    }

    #[test]
    fn test_elision_cascades() {
        // if c { } else { } : both jumps collapse
        let mut buffer = InstructionBuffer::new();
        buffer.push_op(Opcode::True);
        let if_false = buffer.reserve_jump(Opcode::JmpFf);
        let if_end = buffer.reserve_jump(Opcode::JmpF);
        buffer.patch(if_false).unwrap();
        buffer.patch(if_end).unwrap();
        assert_eq!(ops(&buffer), vec![(Opcode::True, 0), (Opcode::Drop, 0)]);
    }

    #[test]
    fn test_loop_jump_back() {
        let mut buffer = InstructionBuffer::new();
        buffer.push(Opcode::Store, 1);
        let head = buffer.loop_head();
        buffer.push(Opcode::HasNext, 1);
        let exit = buffer.reserve_jump(Opcode::JmpFf);
        buffer.push(Opcode::Next, 1);
        buffer.push(Opcode::Store, 2);
        buffer.jump_back(head).unwrap();
        buffer.patch(exit).unwrap();
        assert_eq!(
            ops(&buffer),
            vec![
                (Opcode::Store, 1),
                (Opcode::HasNext, 1),
                (Opcode::JmpFf, 3),
                (Opcode::Next, 1),
                (Opcode::Store, 2),
                (Opcode::JmpB, 5),
            ]
        );
    }

    #[test]
    fn test_unpatched_jump_is_internal() {
        let mut buffer = InstructionBuffer::new();
        let _pending = buffer.reserve_jump(Opcode::JmpF);
        assert!(buffer.build().unwrap_err().is_internal());
    }

    #[test]
    fn test_jump_too_far_is_internal() {
        let mut buffer = InstructionBuffer::new();
        let anchor = buffer.reserve_jump(Opcode::JmpF);
        for _ in 0..300 {
            buffer.push_op(Opcode::None);
        }
        assert!(buffer.patch(anchor).unwrap_err().is_internal());
    }

    #[test]
    fn test_index_too_large_is_internal() {
        let mut buffer = InstructionBuffer::new();
        assert!(buffer.push_index(Opcode::Const, 256, "constant").is_err());
        assert!(buffer.push_index(Opcode::Const, 255, "constant").is_ok());
    }
}
