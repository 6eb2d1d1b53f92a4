//! Intrinsic VM - Core Library
//!
//! Public API surface: tagged values, the program builder, the interpreter
//! and the callable adapter for invoking intrinsics from host code.

pub mod bytecode;
pub mod callable;
pub mod config;
pub mod error;
pub mod intrinsic;
pub mod vm;

// Re-export commonly used types
pub use bytecode::{compile, OpCode, Program, ProgramBuilder, Register};
pub use callable::{IntoArguments, IntrinsicCallable, ProgramCache};
pub use config::VmConfig;
pub use error::{BuildFault, ExecutionFault, IvmError, IvmResult};
pub use intrinsic::{is_supported, Arity, IntrinsicId, IntrinsicRegistry};
pub use vm::value::{FALSE, NULL, TRUE, UNDEFINED};
pub use vm::{HeapObject, HeapRef, Interpreter, Invoker, TaggedValue};

#[cfg(test)]
mod tests {
	use super::*;

	fn array() -> TaggedValue {
		HeapRef::new(HeapObject::Array(vec![TaggedValue::from(1)])).into()
	}

	#[test]
	fn compile_then_invoke_is_array() {
		let vm = Interpreter::new(VmConfig::new());
		let program = compile(IntrinsicId::IsArray, 1).expect("compile failed");
		assert_eq!(vm.invoke(&program, &[array()]), Ok(TRUE));
		assert_eq!(vm.invoke(&program, &[NULL]), Ok(FALSE));
	}

	#[test]
	fn every_supported_id_compiles_for_its_minimum_arity() {
		for id in IntrinsicId::ALL {
			let arity = match id.arity() {
				Arity::Fixed(n) => n,
				Arity::Variadic { min } => min,
			};
			assert_eq!(compile(id, arity).is_ok(), is_supported(id), "{}", id);
		}
	}

	#[test]
	fn heap_results_keep_identity() {
		// A function returning its receiver hands back the very same object.
		let mut builder = ProgramBuilder::new(1);
		let this = builder.parameter(0);
		builder.load_register(this).ret();
		let function = vm::FunctionObject::new(None, std::sync::Arc::new(builder.build().expect("build failed")));
		let callee: TaggedValue = HeapRef::new(HeapObject::Function(function)).into();

		let vm = Interpreter::new(VmConfig::new());
		let receiver = array();
		let result = IntrinsicCallable::new(&vm, IntrinsicId::Call).call((callee, receiver.clone()));
		assert_eq!(result, receiver);
		assert_ne!(result, array());
	}

	#[test]
	fn nested_call_depth_is_bounded() {
		// f(self) = %Call(self, undefined, self): unbounded self-recursion.
		let mut builder = ProgramBuilder::new(2);
		let callee = builder.parameter(1);
		let window = builder.new_register();
		let receiver = builder.new_register();
		let argument = builder.new_register();
		builder
			.move_register(callee, window)
			.load_undefined()
			.store_register(receiver)
			.move_register(callee, argument)
			.call_runtime(IntrinsicId::Call, window, 3)
			.ret();
		let function = vm::FunctionObject::new(Some("f".into()), std::sync::Arc::new(builder.build().expect("build failed")));
		let f: TaggedValue = HeapRef::new(HeapObject::Function(function)).into();

		let mut config = VmConfig::new();
		config.max_call_depth = 8;
		let vm = Interpreter::new(config);
		let err = IntrinsicCallable::new(&vm, IntrinsicId::Call)
			.try_call((f.clone(), (), f))
			.unwrap_err();
		assert_eq!(err, IvmError::Execution(ExecutionFault::CallDepthExceeded(8)));
	}
}
