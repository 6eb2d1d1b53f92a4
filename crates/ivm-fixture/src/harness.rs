//! Test harness.
//!
//! Owns an interpreter and a value factory so scenario tests can build
//! fixtures and invoke intrinsics without handling faults themselves.

use std::rc::Rc;

use ivm_core::{
    IntoArguments, Interpreter, IntrinsicCallable, IntrinsicId, ProgramCache, TaggedValue,
    VmConfig, NULL, UNDEFINED,
};

use crate::factory::Factory;

#[derive(Debug)]
pub struct Harness {
    interpreter: Interpreter,
    factory: Factory,
    programs: Rc<ProgramCache>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    pub fn with_config(config: VmConfig) -> Self {
        Harness {
            interpreter: Interpreter::new(config),
            factory: Factory::new(),
            programs: Rc::new(ProgramCache::new()),
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Forwarding programs compiled so far, shared by every callable
    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    /// Adapter for `id` bound to this harness's interpreter
    pub fn callable(&self, id: IntrinsicId) -> IntrinsicCallable<'_> {
        IntrinsicCallable::with_cache(&self.interpreter, id, Rc::clone(&self.programs))
    }

    /// Invoke `id` once, panicking on any fault.
    pub fn invoke(&self, id: IntrinsicId, args: impl IntoArguments) -> TaggedValue {
        self.callable(id).call(args)
    }

    /// Build a value from a snippet.
    ///
    /// # Panics
    ///
    /// Panics with the offending script if it cannot be constructed.
    pub fn new_object(&self, script: &str) -> TaggedValue {
        match self.factory.new_object(script) {
            Ok(value) => value,
            Err(err) => panic!("fixture `{}` failed: {}", script, err),
        }
    }

    pub fn undefined(&self) -> TaggedValue {
        UNDEFINED
    }

    pub fn null(&self) -> TaggedValue {
        NULL
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivm_core::{FALSE, TRUE};

    #[test]
    fn invokes_against_fixture_values() {
        let harness = Harness::new();
        let array = harness.new_object("([1])");
        assert_eq!(harness.invoke(IntrinsicId::IsArray, (array,)), TRUE);
        assert_eq!(harness.invoke(IntrinsicId::IsArray, (harness.null(),)), FALSE);
    }

    #[test]
    fn repeated_invocations_reuse_programs() {
        let harness = Harness::new();
        for n in 0..3 {
            assert_eq!(harness.invoke(IntrinsicId::IsSmi, (n,)), TRUE);
        }
        assert_eq!(harness.programs().len(), 1);
        harness.invoke(IntrinsicId::IsArray, (1,));
        assert_eq!(harness.programs().len(), 2);
    }

    #[test]
    #[should_panic(expected = "fixture `new Map()` failed")]
    fn broken_fixture_names_the_script() {
        Harness::new().new_object("new Map()");
    }
}
