//! Function literal compiler.
//!
//! Lowers a function body to accumulator bytecode with the interpreted
//! calling convention: register 0 holds the receiver, registers `1..=n` the
//! parameters, scratch registers follow.

use std::collections::HashMap;

use ivm_core::{IntrinsicId, Program, ProgramBuilder, Register};

use crate::error::{FixtureError, FixtureResult};
use crate::parser::{Expr, FunctionLiteral};

const RECEIVER: Register = Register(0);

/// Compile `literal` into a program taking `1 + params.len()` arguments.
pub fn compile_function(literal: &FunctionLiteral) -> FixtureResult<Program> {
    let mut builder = ProgramBuilder::new(1 + literal.params.len());
    let mut scope = HashMap::new();
    for (index, param) in literal.params.iter().enumerate() {
        // Later duplicates shadow earlier ones.
        scope.insert(param.as_str(), builder.parameter(index + 1));
    }

    let mut compiler = FunctionCompiler {
        builder: &mut builder,
        scope,
    };
    match literal.body.as_deref() {
        Some(body) => compiler.expression(body)?,
        None => {
            compiler.builder.load_undefined();
        }
    }
    builder.ret();
    Ok(builder.build()?)
}

struct FunctionCompiler<'a> {
    builder: &'a mut ProgramBuilder,
    scope: HashMap<&'a str, Register>,
}

impl<'a> FunctionCompiler<'a> {
    /// Register already holding the value of `expr`, if any.
    fn register_of(&self, expr: &Expr) -> FixtureResult<Option<Register>> {
        match expr {
            Expr::This => Ok(Some(RECEIVER)),
            Expr::Ident(name) => self
                .scope
                .get(name.as_str())
                .copied()
                .map(Some)
                .ok_or_else(|| FixtureError::UnboundIdentifier(name.clone())),
            _ => Ok(None),
        }
    }

    /// Evaluate `expr` into a register, spilling through a scratch register
    /// when it is not already held in one.
    fn operand(&mut self, expr: &Expr) -> FixtureResult<Register> {
        if let Some(register) = self.register_of(expr)? {
            return Ok(register);
        }
        self.expression(expr)?;
        let scratch = self.builder.new_register();
        self.builder.store_register(scratch);
        Ok(scratch)
    }

    /// Evaluate `expr` into the accumulator.
    fn expression(&mut self, expr: &Expr) -> FixtureResult<()> {
        match expr {
            Expr::This | Expr::Ident(_) => {
                if let Some(register) = self.register_of(expr)? {
                    self.builder.load_register(register);
                }
            }
            Expr::Undefined => {
                self.builder.load_undefined();
            }
            Expr::Null => {
                self.builder.load_null();
            }
            Expr::Boolean(b) => {
                self.builder.load_boolean(*b);
            }
            Expr::Number(n) => {
                let smi = smi_literal(*n).ok_or_else(|| {
                    FixtureError::Unsupported(format!("non-smi literal {} in function body", n))
                })?;
                self.builder.load_smi(smi);
            }
            Expr::Member { object, property } => {
                let object = self.operand(object)?;
                self.builder.get_named_property(object, property);
            }
            Expr::Add(lhs, rhs) => {
                let lhs = self.operand(lhs)?;
                self.expression(rhs)?;
                self.builder.add(lhs);
            }
            Expr::Runtime { name, args } => {
                let id = name
                    .parse::<IntrinsicId>()
                    .map_err(|_| FixtureError::UnknownRuntime(name.clone()))?;
                let window: Vec<Register> =
                    args.iter().map(|_| self.builder.new_register()).collect();
                for (arg, register) in args.iter().zip(&window) {
                    self.expression(arg)?;
                    self.builder.store_register(*register);
                }
                let base = window.first().copied().unwrap_or(RECEIVER);
                self.builder.call_runtime(id, base, args.len());
            }
            Expr::String(_)
            | Expr::Array(_)
            | Expr::Object(_)
            | Expr::RegExp { .. }
            | Expr::New { .. }
            | Expr::Function(_) => {
                return Err(FixtureError::Unsupported(
                    "allocating literal in function body".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `n` as a small integer, when it is one.
pub(crate) fn smi_literal(n: f64) -> Option<i32> {
    if n.fract() != 0.0 || !(i32::MIN as f64..=i32::MAX as f64).contains(&n) {
        return None;
    }
    Some(n as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use ivm_core::OpCode;

    fn compile(source: &str) -> FixtureResult<Program> {
        match parse(source)? {
            Expr::Function(literal) => compile_function(&literal),
            _ => panic!("not a function: {}", source),
        }
    }

    fn opcodes(program: &Program) -> Vec<OpCode> {
        program.instructions().iter().map(|i| i.opcode).collect()
    }

    #[test]
    fn receiver_property() {
        let program = compile("(function() { return this.x; })").expect("compile failed");
        assert_eq!(program.parameter_count(), 1);
        assert_eq!(opcodes(&program), vec![OpCode::GetNamedProperty, OpCode::Return]);
    }

    #[test]
    fn sum_reuses_parameter_registers() {
        let program = compile("(function(a, b, c) { return a + b + c; })").expect("compile failed");
        assert_eq!(program.parameter_count(), 4);
        assert_eq!(
            opcodes(&program),
            vec![
                OpCode::Ldar,
                OpCode::Add,
                OpCode::Star,
                OpCode::Ldar,
                OpCode::Add,
                OpCode::Return,
            ]
        );
        assert_eq!(program.frame_size(), 5);
    }

    #[test]
    fn empty_body_returns_undefined() {
        let program = compile("(function() {})").expect("compile failed");
        assert_eq!(opcodes(&program), vec![OpCode::LdaUndefined, OpCode::Return]);
    }

    #[test]
    fn runtime_calls_use_a_fresh_window() {
        let program = compile("(function(v) { return %IsArray(v); })").expect("compile failed");
        assert_eq!(
            opcodes(&program),
            vec![OpCode::Ldar, OpCode::Star, OpCode::CallRuntime, OpCode::Return]
        );
        assert_eq!(program.instructions()[2].operands[1], 2);
    }

    #[test]
    fn errors() {
        assert_eq!(
            compile("(function() { return y; })").unwrap_err(),
            FixtureError::UnboundIdentifier("y".into())
        );
        assert_eq!(
            compile("(function() { return %Nope(); })").unwrap_err(),
            FixtureError::UnknownRuntime("Nope".into())
        );
        assert!(matches!(
            compile("(function(v) { return %Abort(v); })").unwrap_err(),
            FixtureError::Build(_)
        ));
        assert!(matches!(
            compile("(function() { return [1]; })").unwrap_err(),
            FixtureError::Unsupported(_)
        ));
    }

    #[test]
    fn smi_literals() {
        assert_eq!(smi_literal(20.0), Some(20));
        assert_eq!(smi_literal(-3.0), Some(-3));
        assert_eq!(smi_literal(1.5), None);
        assert_eq!(smi_literal(4_294_967_296.0), None);
    }
}
