//! IVM Error Types
//!
//! Defines the two fault classes of the intrinsic VM core.
//! Build faults are contract violations caught while assembling a program;
//! execution faults terminate a single invocation. Neither is retried.

use thiserror::Error;

use crate::intrinsic::{Arity, IntrinsicId};

/// Errors raised while assembling a [`Program`](crate::bytecode::Program).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildFault {
    #[error("intrinsic `{0}` is not invocable from bytecode")]
    UnsupportedIntrinsic(IntrinsicId),

    #[error("intrinsic `{id}` expects {expected} arguments, got {actual}")]
    ArityMismatch {
        id: IntrinsicId,
        expected: Arity,
        actual: usize,
    },

    #[error("register r{register} out of range (frame size {frame_size})")]
    RegisterOutOfRange { register: u16, frame_size: usize },

    #[error("frame of {requested} registers exceeds addressable range of {max}")]
    FrameTooLarge { requested: usize, max: usize },

    #[error("constant pool index {0} out of range")]
    InvalidConstant(u16),

    #[error("program does not end with a return")]
    MissingReturn,
}

/// Errors that move the interpreter into its faulted state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFault {
    #[error("program expects {expected} arguments, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("unknown intrinsic id 0x{0:04X}")]
    UnknownIntrinsic(u16),

    #[error("intrinsic `{0}` has no native implementation")]
    UnresolvedIntrinsic(IntrinsicId),

    #[error("invalid register access: r{0}")]
    InvalidRegister(u16),

    #[error("invalid constant access: {0}")]
    InvalidConstant(u16),

    #[error("frame of {requested} registers exceeds configured limit of {max}")]
    FrameTooLarge { requested: usize, max: usize },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("small integer overflow")]
    NumericOverflow,

    #[error("{0} is not callable")]
    NotCallable(&'static str),

    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("execution ran past the last instruction")]
    MissingReturn,

    #[error("intrinsic `{intrinsic}` failed: {message}")]
    NativeFault {
        intrinsic: IntrinsicId,
        message: String,
    },
}

/// Either fault class, for callers that compile and run in one step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IvmError {
    #[error("build fault: {0}")]
    Build(#[from] BuildFault),

    #[error("execution fault: {0}")]
    Execution(#[from] ExecutionFault),
}

/// Conversion errors of the tagged value model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{0} is outside the small integer tagging range")]
    SmiOutOfRange(i64),
}

pub type BuildResult<T> = Result<T, BuildFault>;
pub type ExecResult<T> = Result<T, ExecutionFault>;
pub type IvmResult<T> = Result<T, IvmError>;
