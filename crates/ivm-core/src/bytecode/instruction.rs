//! Bytecode Instruction Representation
//!
//! Defines the instruction format and register operands.
//! This layer contains no execution semantics.

use std::fmt;

use super::opcode::OpCode;
use crate::intrinsic::IntrinsicId;

/// Register operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(pub u16);

impl Register {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Bytecode instruction: an opcode and up to three operands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operands: [u16; 3],
}

impl Instruction {
    /// Create an instruction with no operand
    pub fn new(opcode: OpCode) -> Self {
        Instruction {
            opcode,
            operands: [0; 3],
        }
    }

    /// Create an instruction with a single operand
    pub fn with_operand(opcode: OpCode, operand: u16) -> Self {
        Instruction {
            opcode,
            operands: [operand, 0, 0],
        }
    }

    /// Create an instruction with all operand slots given
    pub fn with_operands(opcode: OpCode, operands: [u16; 3]) -> Self {
        Instruction { opcode, operands }
    }

    pub fn operand(&self, index: usize) -> u16 {
        self.operands[index]
    }

    pub fn register(&self, index: usize) -> Register {
        Register(self.operands[index])
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.operands;
        match self.opcode {
            OpCode::LdaConstant => write!(f, "LdaConstant [{}]", a),
            OpCode::Ldar | OpCode::Star | OpCode::Add => {
                write!(f, "{:?} {}", self.opcode, Register(a))
            }
            OpCode::Mov => write!(f, "Mov {}, {}", Register(a), Register(b)),
            OpCode::GetNamedProperty => {
                write!(f, "GetNamedProperty {}, [{}]", Register(a), b)
            }
            OpCode::CallRuntime => {
                let id = u8::try_from(a).ok().and_then(IntrinsicId::from_u8);
                match id {
                    Some(id) => write!(f, "CallRuntime [{}], {}, #{}", id, Register(b), c),
                    None => write!(f, "CallRuntime [0x{:04X}], {}, #{}", a, Register(b), c),
                }
            }
            opcode => write!(f, "{:?}", opcode),
        }
    }
}
