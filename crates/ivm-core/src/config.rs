//! IVM Configuration
//!
//! Defines runtime limits for the interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

use crate::bytecode::program::MAX_FRAME_SIZE;

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Maximum number of registers a program frame may declare
    pub max_frame_size: usize,

    /// Maximum nesting of interpreter invocations (natives re-entering)
    pub max_call_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_frame_size: MAX_FRAME_SIZE,
            max_call_depth: 64,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }
}
