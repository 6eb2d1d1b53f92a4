//! Interpreter Core
//!
//! Register/accumulator interpreter. One invocation owns one frame and runs
//! it from `Ready` to `Returned` or `Faulted`; natives re-enter through the
//! [`Invoker`] capability they are handed.

use std::cell::Cell;

use tracing::{debug, instrument, trace, warn};

use crate::bytecode::{Instruction, OpCode, Program};
use crate::config::VmConfig;
use crate::error::{ExecResult, ExecutionFault};
use crate::intrinsic::{IntrinsicId, IntrinsicRegistry};

use super::frame::Frame;
use super::value::{TaggedValue, FALSE, NULL, TRUE, UNDEFINED};

/// Entry point back into the interpreter
pub trait Invoker {
    fn invoke(&self, program: &Program, args: &[TaggedValue]) -> ExecResult<TaggedValue>;
}

/// Lifecycle of a single invocation
#[derive(Debug)]
enum ExecutionState {
    Ready,
    Running,
    Returned(TaggedValue),
    Faulted(ExecutionFault),
}

/// Bytecode interpreter
#[derive(Debug)]
pub struct Interpreter {
    config: VmConfig,
    registry: IntrinsicRegistry,
    depth: Cell<usize>,
}

impl Interpreter {
    /// Create an interpreter with the built-in natives
    pub fn new(config: VmConfig) -> Self {
        Self::with_registry(config, IntrinsicRegistry::with_defaults())
    }

    pub fn with_registry(config: VmConfig, registry: IntrinsicRegistry) -> Self {
        Interpreter {
            config,
            registry,
            depth: Cell::new(0),
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn registry(&self) -> &IntrinsicRegistry {
        &self.registry
    }

    /// Run `program` with `args` bound to its parameter registers.
    ///
    /// The argument count and frame size are checked before the first
    /// instruction executes.
    #[instrument(level = "debug", skip_all, fields(params = program.parameter_count(), depth = self.depth.get()))]
    pub fn invoke(&self, program: &Program, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
        if args.len() != program.parameter_count() {
            return Err(ExecutionFault::ArgumentCountMismatch {
                expected: program.parameter_count(),
                actual: args.len(),
            });
        }
        if program.frame_size() > self.config.max_frame_size {
            return Err(ExecutionFault::FrameTooLarge {
                requested: program.frame_size(),
                max: self.config.max_frame_size,
            });
        }

        let depth = self.depth.get();
        if depth >= self.config.max_call_depth {
            return Err(ExecutionFault::CallDepthExceeded(self.config.max_call_depth));
        }
        self.depth.set(depth + 1);
        let result = self.run(program, args);
        self.depth.set(depth);
        result
    }

    /// Drive one frame to a terminal state
    fn run(&self, program: &Program, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
        let mut frame = Frame::new(program.frame_size(), args);
        let mut state = ExecutionState::Ready;

        loop {
            state = match state {
                ExecutionState::Ready => ExecutionState::Running,
                ExecutionState::Running => match self.step(program, &mut frame) {
                    Ok(Some(value)) => ExecutionState::Returned(value),
                    Ok(None) => ExecutionState::Running,
                    Err(fault) => ExecutionState::Faulted(fault),
                },
                ExecutionState::Returned(value) => {
                    debug!(result = %value, "returned");
                    return Ok(value);
                }
                ExecutionState::Faulted(fault) => {
                    warn!(pc = frame.pc, %fault, "faulted");
                    return Err(fault);
                }
            };
        }
    }

    /// Execute a single instruction; `Some` once the frame returns
    fn step(&self, program: &Program, frame: &mut Frame) -> ExecResult<Option<TaggedValue>> {
        let instruction = program
            .instruction(frame.pc)
            .ok_or(ExecutionFault::MissingReturn)?;
        trace!(pc = frame.pc, %instruction, "dispatch");
        frame.pc += 1;

        match instruction.opcode {
            OpCode::Nop => {}
            OpCode::LdaUndefined => frame.accumulator = UNDEFINED,
            OpCode::LdaNull => frame.accumulator = NULL,
            OpCode::LdaTrue => frame.accumulator = TRUE,
            OpCode::LdaFalse => frame.accumulator = FALSE,
            OpCode::LdaConstant => {
                let index = instruction.operand(0);
                let value = program
                    .constants()
                    .smi(index)
                    .ok_or(ExecutionFault::InvalidConstant(index))?;
                frame.accumulator = TaggedValue::SmallInt(value);
            }

            OpCode::Ldar => frame.accumulator = frame.load(instruction.register(0))?,
            OpCode::Star => {
                let value = frame.accumulator.clone();
                frame.store(instruction.register(0), value)?;
            }
            OpCode::Mov => {
                let value = frame.load(instruction.register(0))?;
                frame.store(instruction.register(1), value)?;
            }

            OpCode::GetNamedProperty => {
                let object = frame.load(instruction.register(0))?;
                let index = instruction.operand(1);
                let name = program
                    .constants()
                    .name(index)
                    .ok_or(ExecutionFault::InvalidConstant(index))?;
                frame.accumulator = get_named_property(&object, name)?;
            }

            OpCode::Add => {
                let lhs = frame.load(instruction.register(0))?;
                frame.accumulator = add(&lhs, &frame.accumulator)?;
            }

            OpCode::CallRuntime => {
                frame.accumulator = self.call_runtime(instruction, frame)?;
            }

            OpCode::Return => return Ok(Some(frame.accumulator.clone())),
        }
        Ok(None)
    }

    fn call_runtime(&self, instruction: &Instruction, frame: &Frame) -> ExecResult<TaggedValue> {
        let [raw_id, _, argc] = instruction.operands;
        let id = u8::try_from(raw_id)
            .ok()
            .and_then(IntrinsicId::from_u8)
            .ok_or(ExecutionFault::UnknownIntrinsic(raw_id))?;
        if !id.is_supported() {
            return Err(ExecutionFault::UnresolvedIntrinsic(id));
        }

        let args = frame.window(instruction.register(1), argc as usize)?;
        let entry = self.registry.lookup(id)?;
        if !entry.arity.accepts(args.len()) {
            return Err(ExecutionFault::NativeFault {
                intrinsic: entry.id,
                message: format!("takes {} arguments, got {}", entry.arity, args.len()),
            });
        }
        trace!(intrinsic = %entry.id, argc, "call runtime");
        (entry.native)(self, args)
    }
}

impl Invoker for Interpreter {
    fn invoke(&self, program: &Program, args: &[TaggedValue]) -> ExecResult<TaggedValue> {
        Interpreter::invoke(self, program, args)
    }
}

fn get_named_property(object: &TaggedValue, name: &str) -> ExecResult<TaggedValue> {
    match object {
        TaggedValue::Undefined | TaggedValue::Null => Err(ExecutionFault::TypeMismatch {
            expected: "object",
            found: object.type_name(),
        }),
        TaggedValue::HeapRef(heap) => Ok(heap.object().get_property(name).unwrap_or(UNDEFINED)),
        TaggedValue::SmallInt(_) | TaggedValue::Boolean(_) => Ok(UNDEFINED),
    }
}

fn add(lhs: &TaggedValue, rhs: &TaggedValue) -> ExecResult<TaggedValue> {
    match (lhs, rhs) {
        (TaggedValue::SmallInt(a), TaggedValue::SmallInt(b)) => a
            .checked_add(*b)
            .map(TaggedValue::SmallInt)
            .ok_or(ExecutionFault::NumericOverflow),
        (TaggedValue::SmallInt(_), other) | (other, _) => Err(ExecutionFault::TypeMismatch {
            expected: "smi",
            found: other.type_name(),
        }),
    }
}
