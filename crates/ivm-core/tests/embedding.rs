use std::sync::Arc;

use ivm_core::error::ExecResult;
use ivm_core::{
    compile, ExecutionFault, HeapObject, HeapRef, Interpreter, IntrinsicId, IntrinsicRegistry,
    Invoker, ProgramBuilder, TaggedValue, VmConfig, FALSE, TRUE, UNDEFINED,
};

fn always_true(_: &dyn Invoker, _: &[TaggedValue]) -> ExecResult<TaggedValue> {
    Ok(TRUE)
}

// Embedders can swap a native without touching compiled programs.
#[test]
fn registry_overrides_take_effect() {
    let mut registry = IntrinsicRegistry::with_defaults();
    registry.register(IntrinsicId::IsSmi, always_true);
    let vm = Interpreter::with_registry(VmConfig::new(), registry);

    let program = compile(IntrinsicId::IsSmi, 1).expect("compile failed");
    assert_eq!(vm.invoke(&program, &[FALSE]), Ok(TRUE));
}

#[test]
fn missing_native_fails_closed() {
    let mut registry = IntrinsicRegistry::with_defaults();
    registry.unregister(&IntrinsicId::IsDate);
    let vm = Interpreter::with_registry(VmConfig::new(), registry);

    let program = compile(IntrinsicId::IsDate, 1).expect("compile failed");
    assert_eq!(
        vm.invoke(&program, &[UNDEFINED]),
        Err(ExecutionFault::UnresolvedIntrinsic(IntrinsicId::IsDate))
    );
}

#[test]
fn frame_limit_is_enforced_before_execution() {
    let config = VmConfig {
        max_frame_size: 1,
        ..VmConfig::default()
    };
    let vm = Interpreter::new(config);

    // One parameter plus one scratch register.
    let program = compile(IntrinsicId::IsArray, 1).expect("compile failed");
    assert_eq!(
        vm.invoke(&program, &[UNDEFINED]),
        Err(ExecutionFault::FrameTooLarge {
            requested: 2,
            max: 1
        })
    );
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn programs_are_shareable_across_threads() {
    assert_send_sync::<ivm_core::Program>();

    let program = Arc::new(compile(IntrinsicId::IsSmi, 1).expect("compile failed"));
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let program = Arc::clone(&program);
            std::thread::spawn(move || {
                let vm = Interpreter::new(VmConfig::new());
                // Heap values stay on their thread; only the verdict crosses.
                vm.invoke(&program, &[TaggedValue::from(n)])
                    .map(|value| value == TRUE)
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked"), Ok(true));
    }
}

#[test]
fn hand_built_function_reads_receiver_property() {
    // function() { return this.x; }
    let mut builder = ProgramBuilder::new(1);
    let this = builder.parameter(0);
    builder.get_named_property(this, "x").ret();
    let function = ivm_core::vm::FunctionObject::new(
        Some("get".into()),
        Arc::new(builder.build().expect("build failed")),
    );
    let callee: TaggedValue = HeapRef::new(HeapObject::Function(function)).into();

    let mut properties = indexmap::IndexMap::new();
    properties.insert("x".to_string(), TaggedValue::from(20));
    let receiver: TaggedValue = HeapRef::new(HeapObject::Object(properties)).into();

    let vm = Interpreter::new(VmConfig::new());
    let program = compile(IntrinsicId::Call, 2).expect("compile failed");
    assert_eq!(vm.invoke(&program, &[callee, receiver]), Ok(TaggedValue::from(20)));
}
