//! Execution Frame
//!
//! Per-invocation register file, program counter and accumulator.
//! This layer is index-based; it knows nothing about instructions.

use crate::bytecode::Register;
use crate::error::{ExecResult, ExecutionFault};

use super::value::{TaggedValue, UNDEFINED};

/// Registers for a single invocation
#[derive(Debug)]
pub struct Frame {
    registers: Vec<TaggedValue>,
    pub pc: usize,
    pub accumulator: TaggedValue,
}

impl Frame {
    /// Bind `args` into the leading registers; the rest start `undefined`.
    pub fn new(size: usize, args: &[TaggedValue]) -> Self {
        let mut registers = Vec::with_capacity(size.max(args.len()));
        registers.extend_from_slice(args);
        registers.resize(size.max(args.len()), UNDEFINED);
        Frame {
            registers,
            pc: 0,
            accumulator: UNDEFINED,
        }
    }

    pub fn size(&self) -> usize {
        self.registers.len()
    }

    pub fn load(&self, register: Register) -> ExecResult<TaggedValue> {
        self.registers
            .get(register.index())
            .cloned()
            .ok_or(ExecutionFault::InvalidRegister(register.0))
    }

    pub fn store(&mut self, register: Register, value: TaggedValue) -> ExecResult<()> {
        let slot = self
            .registers
            .get_mut(register.index())
            .ok_or(ExecutionFault::InvalidRegister(register.0))?;
        *slot = value;
        Ok(())
    }

    /// `count` consecutive registers starting at `base`
    pub fn window(&self, base: Register, count: usize) -> ExecResult<&[TaggedValue]> {
        let start = base.index();
        if count == 0 {
            return Ok(&[]);
        }
        self.registers.get(start..start + count).ok_or_else(|| {
            let last = start + count - 1;
            ExecutionFault::InvalidRegister(u16::try_from(last).unwrap_or(u16::MAX))
        })
    }
}
