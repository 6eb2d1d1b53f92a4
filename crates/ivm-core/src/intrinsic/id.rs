//! Intrinsic identifiers
//!
//! Small, explicit id type for native functions. Byte values are stable;
//! support for bytecode invocation is a static property of each id.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Native function identifier
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntrinsicId {
    // Type classification
    IsReceiver = 0x01,
    IsArray    = 0x02,
    IsSmi      = 0x03,
    IsRegExp   = 0x04,
    IsDate     = 0x05,

    // Calls
    Call = 0x10,

    // Runtime-only
    Abort = 0xF0,
}

/// Argument count policy of an intrinsic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic { min: usize },
}

impl Arity {
    pub fn accepts(self, argc: usize) -> bool {
        match self {
            Arity::Fixed(n) => argc == n,
            Arity::Variadic { min } => argc >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "exactly {}", n),
            Arity::Variadic { min } => write!(f, "at least {}", min),
        }
    }
}

impl IntrinsicId {
    pub const ALL: [IntrinsicId; 7] = [
        IntrinsicId::IsReceiver,
        IntrinsicId::IsArray,
        IntrinsicId::IsSmi,
        IntrinsicId::IsRegExp,
        IntrinsicId::IsDate,
        IntrinsicId::Call,
        IntrinsicId::Abort,
    ];

    /// Convert raw byte to intrinsic id
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(IntrinsicId::IsReceiver),
            0x02 => Some(IntrinsicId::IsArray),
            0x03 => Some(IntrinsicId::IsSmi),
            0x04 => Some(IntrinsicId::IsRegExp),
            0x05 => Some(IntrinsicId::IsDate),
            0x10 => Some(IntrinsicId::Call),
            0xF0 => Some(IntrinsicId::Abort),
            _ => None,
        }
    }

    /// Kebab-case name used in diagnostics and on the command line
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicId::IsReceiver => "is-receiver",
            IntrinsicId::IsArray => "is-array",
            IntrinsicId::IsSmi => "is-smi",
            IntrinsicId::IsRegExp => "is-regexp",
            IntrinsicId::IsDate => "is-date",
            IntrinsicId::Call => "call",
            IntrinsicId::Abort => "abort",
        }
    }

    /// Name used by `%Name(...)` runtime calls in script snippets
    pub fn runtime_name(self) -> &'static str {
        match self {
            IntrinsicId::IsReceiver => "IsReceiver",
            IntrinsicId::IsArray => "IsArray",
            IntrinsicId::IsSmi => "IsSmi",
            IntrinsicId::IsRegExp => "IsRegExp",
            IntrinsicId::IsDate => "IsDate",
            IntrinsicId::Call => "Call",
            IntrinsicId::Abort => "Abort",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            IntrinsicId::IsReceiver
            | IntrinsicId::IsArray
            | IntrinsicId::IsSmi
            | IntrinsicId::IsRegExp
            | IntrinsicId::IsDate
            | IntrinsicId::Abort => Arity::Fixed(1),
            IntrinsicId::Call => Arity::Variadic { min: 2 },
        }
    }

    /// Whether bytecode may name this id in a `CallRuntime` instruction.
    pub fn is_supported(self) -> bool {
        !matches!(self, IntrinsicId::Abort)
    }
}

/// Free-function form of [`IntrinsicId::is_supported`].
pub fn is_supported(id: IntrinsicId) -> bool {
    id.is_supported()
}

impl fmt::Display for IntrinsicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<IntrinsicId> for u8 {
    fn from(id: IntrinsicId) -> Self {
        id as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown intrinsic `{0}`")]
pub struct UnknownIntrinsic(pub String);

impl TryFrom<u8> for IntrinsicId {
    type Error = UnknownIntrinsic;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        IntrinsicId::from_u8(byte).ok_or_else(|| UnknownIntrinsic(format!("0x{:02X}", byte)))
    }
}

impl FromStr for IntrinsicId {
    type Err = UnknownIntrinsic;

    /// Accepts either the kebab-case name or the runtime name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntrinsicId::ALL
            .into_iter()
            .find(|id| id.name() == s || id.runtime_name() == s)
            .ok_or_else(|| UnknownIntrinsic(s.to_string()))
    }
}
