//! Intrinsic Registry
//!
//! Maps intrinsic ids to native implementations.
//! Behavior: an empty registry resolves nothing; lookups fail-closed.

use std::collections::HashMap;

use crate::error::{ExecResult, ExecutionFault};
use crate::vm::interpreter::Invoker;
use crate::vm::value::TaggedValue;

use super::id::{Arity, IntrinsicId};
use super::natives;

/// Native implementation. The invoker is the way back into the
/// interpreter for natives that run interpreted code.
pub type NativeFn = fn(&dyn Invoker, &[TaggedValue]) -> ExecResult<TaggedValue>;

/// Registered native
#[derive(Debug, Clone, Copy)]
pub struct IntrinsicEntry {
    pub id: IntrinsicId,
    pub arity: Arity,
    pub native: NativeFn,
}

/// Registry consulted by the interpreter on every `CallRuntime`.
#[derive(Debug, Clone, Default)]
pub struct IntrinsicRegistry {
    entries: HashMap<IntrinsicId, IntrinsicEntry>,
}

impl IntrinsicRegistry {
    /// New registry resolves nothing
    pub fn new() -> Self {
        IntrinsicRegistry {
            entries: HashMap::new(),
        }
    }

    /// Registry with every built-in native installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(IntrinsicId::IsReceiver, natives::is_receiver);
        registry.register(IntrinsicId::IsArray, natives::is_array);
        registry.register(IntrinsicId::IsSmi, natives::is_smi);
        registry.register(IntrinsicId::IsRegExp, natives::is_regexp);
        registry.register(IntrinsicId::IsDate, natives::is_date);
        registry.register(IntrinsicId::Call, natives::call);
        registry.register(IntrinsicId::Abort, natives::abort);
        registry
    }

    /// Install or replace the native for `id` (host-level operation)
    pub fn register(&mut self, id: IntrinsicId, native: NativeFn) {
        self.entries.insert(
            id,
            IntrinsicEntry {
                id,
                arity: id.arity(),
                native,
            },
        );
    }

    pub fn unregister(&mut self, id: &IntrinsicId) {
        self.entries.remove(id);
    }

    pub fn contains(&self, id: IntrinsicId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Resolve `id` and fail-closed if it has no native
    pub fn lookup(&self, id: IntrinsicId) -> ExecResult<&IntrinsicEntry> {
        self.entries
            .get(&id)
            .ok_or(ExecutionFault::UnresolvedIntrinsic(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_fails_closed() {
        let registry = IntrinsicRegistry::new();
        assert_eq!(
            registry.lookup(IntrinsicId::IsArray).err(),
            Some(ExecutionFault::UnresolvedIntrinsic(IntrinsicId::IsArray))
        );
    }

    #[test]
    fn defaults_cover_every_id() {
        let mut registry = IntrinsicRegistry::with_defaults();
        for id in IntrinsicId::ALL {
            assert!(registry.contains(id), "missing native for {}", id);
        }
        registry.unregister(&IntrinsicId::Call);
        assert!(registry.lookup(IntrinsicId::Call).is_err());
    }

    #[test]
    fn entries_carry_the_declared_arity() {
        let registry = IntrinsicRegistry::with_defaults();
        for id in IntrinsicId::ALL {
            let entry = registry.lookup(id).expect("missing native");
            assert_eq!(entry.id, id);
            assert_eq!(entry.arity, id.arity());
        }
    }

    #[test]
    fn abort_native_always_faults() {
        use crate::config::VmConfig;
        use crate::vm::interpreter::Interpreter;

        let vm = Interpreter::new(VmConfig::new());
        let entry = IntrinsicRegistry::with_defaults()
            .lookup(IntrinsicId::Abort)
            .copied()
            .expect("missing native");
        let fault = (entry.native)(&vm, &[TaggedValue::from(3)]).unwrap_err();
        assert_eq!(
            fault,
            ExecutionFault::NativeFault {
                intrinsic: IntrinsicId::Abort,
                message: "aborted: 3".to_string(),
            }
        );
    }
}
