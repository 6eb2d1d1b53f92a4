//! Program Builder
//!
//! Appends instructions to a frame layout of `parameter_count` parameter
//! registers followed by scratch registers, and validates the result in
//! [`ProgramBuilder::build`].

use tracing::{debug, instrument};

use crate::error::{BuildFault, BuildResult};
use crate::intrinsic::IntrinsicId;

use super::instruction::{Instruction, Register};
use super::opcode::OpCode;
use super::program::{Constant, ConstantPool, Program, MAX_FRAME_SIZE};

/// Incremental program builder
#[derive(Debug)]
pub struct ProgramBuilder {
    parameter_count: usize,
    register_count: usize,
    instructions: Vec<Instruction>,
    constants: Vec<Constant>,
    deferred: Option<BuildFault>,
}

impl ProgramBuilder {
    pub fn new(parameter_count: usize) -> Self {
        ProgramBuilder {
            parameter_count,
            register_count: parameter_count,
            instructions: Vec::new(),
            constants: Vec::new(),
            deferred: None,
        }
    }

    /// Register bound to the `index`th argument
    pub fn parameter(&self, index: usize) -> Register {
        Register(u16::try_from(index).unwrap_or(u16::MAX))
    }

    /// Allocate a scratch register after the parameters
    pub fn new_register(&mut self) -> Register {
        let register = Register(u16::try_from(self.register_count).unwrap_or(u16::MAX));
        self.register_count += 1;
        register
    }

    pub fn register_count(&self) -> usize {
        self.register_count
    }

    pub fn load_undefined(&mut self) -> &mut Self {
        self.emit(Instruction::new(OpCode::LdaUndefined))
    }

    pub fn load_null(&mut self) -> &mut Self {
        self.emit(Instruction::new(OpCode::LdaNull))
    }

    pub fn load_boolean(&mut self, value: bool) -> &mut Self {
        let opcode = if value { OpCode::LdaTrue } else { OpCode::LdaFalse };
        self.emit(Instruction::new(opcode))
    }

    pub fn load_smi(&mut self, value: i32) -> &mut Self {
        let index = self.constant(Constant::Smi(value));
        self.emit(Instruction::with_operand(OpCode::LdaConstant, index))
    }

    /// Ldar: accumulator <- register
    pub fn load_register(&mut self, register: Register) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::Ldar, register.0))
    }

    /// Star: register <- accumulator
    pub fn store_register(&mut self, register: Register) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::Star, register.0))
    }

    pub fn move_register(&mut self, from: Register, to: Register) -> &mut Self {
        self.emit(Instruction::with_operands(OpCode::Mov, [from.0, to.0, 0]))
    }

    /// accumulator <- object[name], where the object is held in `object`
    pub fn get_named_property(&mut self, object: Register, name: &str) -> &mut Self {
        let index = self.constant(Constant::Name(name.to_string()));
        self.emit(Instruction::with_operands(
            OpCode::GetNamedProperty,
            [object.0, index, 0],
        ))
    }

    /// accumulator <- register + accumulator
    pub fn add(&mut self, register: Register) -> &mut Self {
        self.emit(Instruction::with_operand(OpCode::Add, register.0))
    }

    /// Call `id` with the `argc` registers starting at `base`; the result
    /// lands in the accumulator.
    pub fn call_runtime(&mut self, id: IntrinsicId, base: Register, argc: usize) -> &mut Self {
        let Ok(count) = u16::try_from(argc) else {
            self.defer(BuildFault::FrameTooLarge {
                requested: argc,
                max: MAX_FRAME_SIZE,
            });
            return self;
        };
        self.emit(Instruction::with_operands(
            OpCode::CallRuntime,
            [u16::from(u8::from(id)), base.0, count],
        ))
    }

    pub fn ret(&mut self) -> &mut Self {
        self.emit(Instruction::new(OpCode::Return))
    }

    /// Validate and freeze the program.
    pub fn build(self) -> BuildResult<Program> {
        if let Some(fault) = self.deferred {
            return Err(fault);
        }
        if self.register_count > MAX_FRAME_SIZE {
            return Err(BuildFault::FrameTooLarge {
                requested: self.register_count,
                max: MAX_FRAME_SIZE,
            });
        }

        let constants = ConstantPool::new(self.constants);
        for instruction in &self.instructions {
            validate(instruction, &constants, self.register_count)?;
        }
        match self.instructions.last() {
            Some(last) if last.opcode == OpCode::Return => {}
            _ => return Err(BuildFault::MissingReturn),
        }

        Ok(Program::new(
            self.instructions,
            constants,
            self.parameter_count,
            self.register_count,
        ))
    }

    fn emit(&mut self, instruction: Instruction) -> &mut Self {
        self.instructions.push(instruction);
        self
    }

    fn constant(&mut self, constant: Constant) -> u16 {
        let index = match self.constants.iter().position(|c| *c == constant) {
            Some(index) => index,
            None => {
                self.constants.push(constant);
                self.constants.len() - 1
            }
        };
        match u16::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                self.defer(BuildFault::InvalidConstant(u16::MAX));
                u16::MAX
            }
        }
    }

    fn defer(&mut self, fault: BuildFault) {
        self.deferred.get_or_insert(fault);
    }
}

fn validate(instruction: &Instruction, constants: &ConstantPool, frame_size: usize) -> BuildResult<()> {
    let check_register = |register: Register| {
        if register.index() < frame_size {
            Ok(())
        } else {
            Err(BuildFault::RegisterOutOfRange {
                register: register.0,
                frame_size,
            })
        }
    };

    match instruction.opcode {
        OpCode::Ldar | OpCode::Star | OpCode::Add => check_register(instruction.register(0)),
        OpCode::Mov => {
            check_register(instruction.register(0))?;
            check_register(instruction.register(1))
        }
        OpCode::LdaConstant => {
            let index = instruction.operand(0);
            constants.smi(index).map(|_| ()).ok_or(BuildFault::InvalidConstant(index))
        }
        OpCode::GetNamedProperty => {
            check_register(instruction.register(0))?;
            let index = instruction.operand(1);
            constants.name(index).map(|_| ()).ok_or(BuildFault::InvalidConstant(index))
        }
        OpCode::CallRuntime => {
            let [raw_id, base, argc] = instruction.operands;
            // Only `call_runtime` emits this opcode, so the id byte is always valid.
            let id = u8::try_from(raw_id)
                .ok()
                .and_then(IntrinsicId::from_u8)
                .unwrap_or(IntrinsicId::Abort);
            if !id.is_supported() {
                return Err(BuildFault::UnsupportedIntrinsic(id));
            }
            let argc = argc as usize;
            if !id.arity().accepts(argc) {
                return Err(BuildFault::ArityMismatch {
                    id,
                    expected: id.arity(),
                    actual: argc,
                });
            }
            if argc > 0 {
                check_register(Register(base))?;
                let last = base as usize + argc - 1;
                if last >= frame_size {
                    return Err(BuildFault::RegisterOutOfRange {
                        register: u16::try_from(last).unwrap_or(u16::MAX),
                        frame_size,
                    });
                }
            }
            Ok(())
        }
        OpCode::LdaUndefined
        | OpCode::LdaNull
        | OpCode::LdaTrue
        | OpCode::LdaFalse
        | OpCode::Return
        | OpCode::Nop => Ok(()),
    }
}

/// Build the program that forwards `arity` parameters to intrinsic `id`:
/// copy every parameter into a contiguous scratch window, call, return.
#[instrument(level = "debug")]
pub fn compile(id: IntrinsicId, arity: usize) -> BuildResult<Program> {
    if !id.is_supported() {
        return Err(BuildFault::UnsupportedIntrinsic(id));
    }
    if !id.arity().accepts(arity) {
        return Err(BuildFault::ArityMismatch {
            id,
            expected: id.arity(),
            actual: arity,
        });
    }

    let mut builder = ProgramBuilder::new(arity);
    let mut base = builder.parameter(arity);
    for index in 0..arity {
        let parameter = builder.parameter(index);
        let scratch = builder.new_register();
        if index == 0 {
            base = scratch;
        }
        builder.move_register(parameter, scratch);
    }
    builder.call_runtime(id, base, arity).ret();

    let program = builder.build()?;
    debug!(frame_size = program.frame_size(), "compiled intrinsic call");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_emits_one_load_per_parameter() {
        let program = compile(IntrinsicId::Call, 4).expect("compile failed");
        assert_eq!(program.parameter_count(), 4);
        assert_eq!(program.frame_size(), 8);

        let ops: Vec<OpCode> = program.instructions().iter().map(|i| i.opcode).collect();
        assert_eq!(
            ops,
            vec![
                OpCode::Mov,
                OpCode::Mov,
                OpCode::Mov,
                OpCode::Mov,
                OpCode::CallRuntime,
                OpCode::Return,
            ]
        );
        assert_eq!(program.instructions()[3].operands, [3, 7, 0]);
        assert_eq!(
            program.instructions()[4].operands,
            [u16::from(u8::from(IntrinsicId::Call)), 4, 4]
        );
    }

    #[test]
    fn unsupported_intrinsic_never_compiles() {
        for arity in 0..4 {
            assert_eq!(
                compile(IntrinsicId::Abort, arity).unwrap_err(),
                BuildFault::UnsupportedIntrinsic(IntrinsicId::Abort)
            );
        }
    }

    #[test]
    fn arity_policy_is_enforced() {
        let err = compile(IntrinsicId::IsArray, 2).unwrap_err();
        assert!(matches!(err, BuildFault::ArityMismatch { actual: 2, .. }));
        assert!(compile(IntrinsicId::Call, 1).is_err());
    }

    #[test]
    fn compile_is_repeatable() {
        let a = compile(IntrinsicId::IsReceiver, 1).expect("compile failed");
        let b = compile(IntrinsicId::IsReceiver, 1).expect("compile failed");
        assert_eq!(a.instructions(), b.instructions());
        assert_eq!(a.frame_size(), b.frame_size());
    }

    #[test]
    fn build_rejects_out_of_range_registers() {
        let mut builder = ProgramBuilder::new(1);
        builder.load_register(Register(3)).ret();
        assert_eq!(
            builder.build().unwrap_err(),
            BuildFault::RegisterOutOfRange {
                register: 3,
                frame_size: 1
            }
        );
    }

    #[test]
    fn build_rejects_call_window_past_frame() {
        let mut builder = ProgramBuilder::new(2);
        builder.call_runtime(IntrinsicId::Call, Register(1), 2).ret();
        assert!(matches!(
            builder.build(),
            Err(BuildFault::RegisterOutOfRange { register: 2, .. })
        ));
    }

    #[test]
    fn build_requires_trailing_return() {
        let mut builder = ProgramBuilder::new(0);
        builder.load_null();
        assert_eq!(builder.build().unwrap_err(), BuildFault::MissingReturn);
    }

    #[test]
    fn constants_are_interned() {
        let mut builder = ProgramBuilder::new(1);
        let this = builder.parameter(0);
        builder
            .get_named_property(this, "x")
            .get_named_property(this, "x")
            .load_smi(7)
            .ret();
        let program = builder.build().expect("build failed");
        assert_eq!(program.constants().len(), 2);
        assert_eq!(program.constants().name(0), Some("x"));
        assert_eq!(program.constants().smi(1), Some(7));
    }
}
