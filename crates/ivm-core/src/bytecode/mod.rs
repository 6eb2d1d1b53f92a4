pub mod builder;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use builder::{compile, ProgramBuilder};
pub use instruction::{Instruction, Register};
pub use opcode::OpCode;
pub use program::{Constant, ConstantPool, Program, MAX_FRAME_SIZE};
