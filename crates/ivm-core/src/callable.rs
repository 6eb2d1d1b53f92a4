//! Callable Adapter
//!
//! Presents "call intrinsic X" as an ordinary host function: host arguments
//! are normalized to tagged values, a forwarding program is compiled once per
//! arity, and the interpreter runs it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::bytecode::{compile, Program};
use crate::error::{BuildResult, IvmResult};
use crate::intrinsic::IntrinsicId;
use crate::vm::{Interpreter, TaggedValue};

/// Host argument lists accepted by [`IntrinsicCallable`]
pub trait IntoArguments {
    fn into_arguments(self) -> Vec<TaggedValue>;
}

impl IntoArguments for Vec<TaggedValue> {
    fn into_arguments(self) -> Vec<TaggedValue> {
        self
    }
}

impl IntoArguments for &[TaggedValue] {
    fn into_arguments(self) -> Vec<TaggedValue> {
        self.to_vec()
    }
}

impl<T: Into<TaggedValue>, const N: usize> IntoArguments for [T; N] {
    fn into_arguments(self) -> Vec<TaggedValue> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! tuple_arguments {
    ($($name:ident),*) => {
        impl<$($name: Into<TaggedValue>),*> IntoArguments for ($($name,)*) {
            #[allow(non_snake_case)]
            fn into_arguments(self) -> Vec<TaggedValue> {
                let ($($name,)*) = self;
                vec![$($name.into()),*]
            }
        }
    };
}

tuple_arguments!(A);
tuple_arguments!(A, B);
tuple_arguments!(A, B, C);
tuple_arguments!(A, B, C, D);
tuple_arguments!(A, B, C, D, E);
tuple_arguments!(A, B, C, D, E, F);
tuple_arguments!(A, B, C, D, E, F, G);
tuple_arguments!(A, B, C, D, E, F, G, H);

/// Forwarding programs keyed by intrinsic and arity
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: RefCell<HashMap<(IntrinsicId, usize), Arc<Program>>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Program forwarding `arity` arguments to `id`, compiled on first use
    pub fn get(&self, id: IntrinsicId, arity: usize) -> BuildResult<Arc<Program>> {
        if let Some(program) = self.programs.borrow().get(&(id, arity)) {
            return Ok(Arc::clone(program));
        }
        let program = Arc::new(compile(id, arity)?);
        self.programs
            .borrow_mut()
            .insert((id, arity), Arc::clone(&program));
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.programs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.borrow().is_empty()
    }
}

/// An intrinsic bound to an interpreter, callable with host arguments
#[derive(Debug)]
pub struct IntrinsicCallable<'vm> {
    interpreter: &'vm Interpreter,
    id: IntrinsicId,
    programs: Rc<ProgramCache>,
}

impl<'vm> IntrinsicCallable<'vm> {
    /// Bind `id` to `interpreter`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not invocable from bytecode.
    pub fn new(interpreter: &'vm Interpreter, id: IntrinsicId) -> Self {
        Self::with_cache(interpreter, id, Rc::new(ProgramCache::new()))
    }

    /// Like [`IntrinsicCallable::new`], compiling into a shared cache.
    pub fn with_cache(
        interpreter: &'vm Interpreter,
        id: IntrinsicId,
        programs: Rc<ProgramCache>,
    ) -> Self {
        assert_invocable(id);
        IntrinsicCallable {
            interpreter,
            id,
            programs,
        }
    }

    pub fn id(&self) -> IntrinsicId {
        self.id
    }

    /// Forwarding program for `arity` arguments, compiled on first use
    pub fn program(&self, arity: usize) -> BuildResult<Arc<Program>> {
        self.programs.get(self.id, arity)
    }

    /// Invoke the intrinsic and surface any fault.
    pub fn try_call(&self, args: impl IntoArguments) -> IvmResult<TaggedValue> {
        self.invoke(&args.into_arguments())
    }

    /// Invoke the intrinsic.
    ///
    /// # Panics
    ///
    /// Panics if the intrinsic is not invocable from bytecode, or if
    /// compiling or running the call faults. Either means the fixture is
    /// broken, so the message names the intrinsic and its arguments.
    pub fn call(&self, args: impl IntoArguments) -> TaggedValue {
        assert_invocable(self.id);
        let args = args.into_arguments();
        match self.invoke(&args) {
            Ok(value) => value,
            Err(err) => panic!("{}({}) failed: {}", self.id, render(&args), err),
        }
    }

    fn invoke(&self, args: &[TaggedValue]) -> IvmResult<TaggedValue> {
        let program = self.program(args.len())?;
        Ok(self.interpreter.invoke(&program, args)?)
    }
}

fn assert_invocable(id: IntrinsicId) {
    assert!(
        id.is_supported(),
        "intrinsic `{}` is not invocable from bytecode",
        id
    );
}

fn render(args: &[TaggedValue]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
