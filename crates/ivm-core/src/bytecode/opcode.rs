//! Bytecode Opcode Definitions
//!
//! Defines the raw opcode set for the register/accumulator interpreter.
//! This file contains no execution semantics.
//! Opcode values are a stable contract.

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    // Accumulator loads
    LdaUndefined = 0x01,
    LdaNull      = 0x02,
    LdaTrue      = 0x03,
    LdaFalse     = 0x04,
    LdaConstant  = 0x05,

    // Register transfers
    Ldar = 0x10,
    Star = 0x11,
    Mov  = 0x12,

    // Property access
    GetNamedProperty = 0x20,

    // Arithmetic
    Add = 0x30,

    // Control flow
    CallRuntime = 0x40,
    Return      = 0x41,

    // System
    Nop = 0xF0,
}
