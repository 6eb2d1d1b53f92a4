//! Built-in native implementations

use crate::error::{ExecResult, ExecutionFault};
use crate::vm::heap::HeapObject;
use crate::vm::interpreter::Invoker;
use crate::vm::value::{TaggedValue, UNDEFINED};

use super::id::IntrinsicId;

fn single(id: IntrinsicId, args: &[TaggedValue]) -> ExecResult<&TaggedValue> {
    match args {
        [value] => Ok(value),
        _ => Err(ExecutionFault::NativeFault {
            intrinsic: id,
            message: format!("expected 1 argument, got {}", args.len()),
        }),
    }
}

pub(crate) fn is_receiver(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let value = single(IntrinsicId::IsReceiver, args)?;
    Ok(value.is_receiver().into())
}

pub(crate) fn is_array(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let value = single(IntrinsicId::IsArray, args)?;
    Ok(value.is_array().into())
}

pub(crate) fn is_smi(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let value = single(IntrinsicId::IsSmi, args)?;
    Ok(value.is_smi().into())
}

pub(crate) fn is_regexp(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let value = single(IntrinsicId::IsRegExp, args)?;
    Ok(matches!(value.as_object(), Some(HeapObject::RegExp { .. })).into())
}

pub(crate) fn is_date(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let value = single(IntrinsicId::IsDate, args)?;
    Ok(matches!(value.as_object(), Some(HeapObject::Date(_))).into())
}

/// `call(callee, receiver, ...args)`. The callee's program sees the
/// receiver in its first parameter register; missing parameters read
/// `undefined` and surplus arguments are dropped.
pub(crate) fn call(invoker: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let Some((callee, rest)) = args.split_first() else {
        return Err(ExecutionFault::NativeFault {
            intrinsic: IntrinsicId::Call,
            message: "missing callee".to_string(),
        });
    };
    let function = callee
        .as_function()
        .ok_or(ExecutionFault::NotCallable(callee.type_name()))?;

    let program = function.program();
    let mut argv = Vec::with_capacity(program.parameter_count());
    argv.push(rest.first().cloned().unwrap_or(UNDEFINED));
    argv.extend(rest.iter().skip(1).cloned());
    argv.resize(program.parameter_count(), UNDEFINED);

    invoker.invoke(program, &argv)
}

pub(crate) fn abort(_: &dyn Invoker, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
    let reason = args.first().map(ToString::to_string).unwrap_or_default();
    Err(ExecutionFault::NativeFault {
        intrinsic: IntrinsicId::Abort,
        message: format!("aborted: {}", reason),
    })
}
