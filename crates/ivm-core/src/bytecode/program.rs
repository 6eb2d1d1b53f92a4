//! Compiled Program
//!
//! An immutable instruction sequence with its constant pool and calling
//! convention metadata. Programs are produced by
//! [`ProgramBuilder`](super::builder::ProgramBuilder) only.

use std::fmt;

use super::instruction::Instruction;

/// Largest frame a program may declare (registers are `u16`-addressed)
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Constant pool entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Property name
    Name(String),

    /// Small integer literal
    Smi(i32),
}

/// Constant pool (read-only)
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    values: Vec<Constant>,
}

impl ConstantPool {
    pub fn new(values: Vec<Constant>) -> Self {
        ConstantPool { values }
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.values.get(index as usize)
    }

    pub fn name(&self, index: u16) -> Option<&str> {
        match self.get(index) {
            Some(Constant::Name(name)) => Some(name),
            _ => None,
        }
    }

    pub fn smi(&self, index: u16) -> Option<i32> {
        match self.get(index) {
            Some(Constant::Smi(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compiled bytecode program
#[derive(Debug, Clone)]
pub struct Program {
    instructions: Vec<Instruction>,
    constants: ConstantPool,
    parameter_count: usize,
    frame_size: usize,
}

impl Program {
    pub(crate) fn new(
        instructions: Vec<Instruction>,
        constants: ConstantPool,
        parameter_count: usize,
        frame_size: usize,
    ) -> Self {
        Program {
            instructions,
            constants,
            parameter_count,
            frame_size,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    /// Number of leading registers bound from the argument list
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Total registers in a frame running this program
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }
}

/// Disassembly, one instruction per line
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "parameters: {}, frame size: {}",
            self.parameter_count, self.frame_size
        )?;
        for (pc, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{:4}: {}", pc, instruction)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::compile;
    use crate::intrinsic::IntrinsicId;

    #[test]
    fn disassembly_lists_forwarding_program() {
        let program = compile(IntrinsicId::IsArray, 1).expect("compile failed");
        assert_eq!(
            program.to_string(),
            "parameters: 1, frame size: 2\n   0: Mov r0, r1\n   1: CallRuntime [is-array], r1, #1\n   2: Return\n"
        );
    }
}
