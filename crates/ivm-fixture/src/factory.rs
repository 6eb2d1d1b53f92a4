//! Value factory.
//!
//! Allocates heap values for fixtures, either directly or by evaluating a
//! snippet. Function literals are compiled to bytecode; every other literal
//! is evaluated at construction time.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use ivm_core::vm::FunctionObject;
use ivm_core::{HeapObject, HeapRef, TaggedValue, FALSE, NULL, TRUE, UNDEFINED};
use tracing::debug;

use crate::compiler::{compile_function, smi_literal};
use crate::error::{FixtureError, FixtureResult};
use crate::parser::{parse, Expr};

/// Builds tagged values for tests and the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct Factory;

impl Factory {
    pub fn new() -> Self {
        Factory
    }

    pub fn undefined(&self) -> TaggedValue {
        UNDEFINED
    }

    pub fn null(&self) -> TaggedValue {
        NULL
    }

    pub fn boolean(&self, value: bool) -> TaggedValue {
        if value {
            TRUE
        } else {
            FALSE
        }
    }

    pub fn smi(&self, value: i32) -> TaggedValue {
        TaggedValue::SmallInt(value)
    }

    /// Small integer when `value` is integral and in range, heap number otherwise
    pub fn number(&self, value: f64) -> TaggedValue {
        match smi_literal(value) {
            Some(n) => TaggedValue::SmallInt(n),
            None => allocate(HeapObject::HeapNumber(value)),
        }
    }

    pub fn string(&self, value: &str) -> TaggedValue {
        allocate(HeapObject::String(value.to_string()))
    }

    pub fn array(&self, elements: Vec<TaggedValue>) -> TaggedValue {
        allocate(HeapObject::Array(elements))
    }

    pub fn object<K: Into<String>>(
        &self,
        properties: impl IntoIterator<Item = (K, TaggedValue)>,
    ) -> TaggedValue {
        let properties: IndexMap<String, TaggedValue> = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        allocate(HeapObject::Object(properties))
    }

    /// Evaluate one snippet expression into a fresh value.
    pub fn new_object(&self, script: &str) -> FixtureResult<TaggedValue> {
        let expr = parse(script)?;
        let value = self.evaluate(&expr)?;
        debug!(script, kind = value.type_name(), "constructed fixture value");
        Ok(value)
    }

    fn evaluate(&self, expr: &Expr) -> FixtureResult<TaggedValue> {
        let value = match expr {
            Expr::Number(n) => self.number(*n),
            Expr::String(s) => self.string(s),
            Expr::Boolean(b) => self.boolean(*b),
            Expr::Undefined => UNDEFINED,
            Expr::Null => NULL,
            Expr::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| self.evaluate(e))
                    .collect::<FixtureResult<Vec<_>>>()?;
                self.array(elements)
            }
            Expr::Object(properties) => {
                let properties = properties
                    .iter()
                    .map(|(key, e)| Ok((key.clone(), self.evaluate(e)?)))
                    .collect::<FixtureResult<Vec<_>>>()?;
                self.object(properties)
            }
            Expr::RegExp { source, flags } => allocate(HeapObject::RegExp {
                source: source.clone(),
                flags: flags.clone(),
            }),
            Expr::New { constructor, args } => self.construct(constructor, args)?,
            Expr::Function(literal) => {
                let program = compile_function(literal)?;
                allocate(HeapObject::Function(FunctionObject::new(
                    literal.name.clone(),
                    Arc::new(program),
                )))
            }
            Expr::Add(lhs, rhs) => {
                let (lhs, rhs) = (self.evaluate(lhs)?, self.evaluate(rhs)?);
                match (lhs.as_smi(), rhs.as_smi()) {
                    (Some(a), Some(b)) => self.number(f64::from(a) + f64::from(b)),
                    _ => {
                        return Err(FixtureError::Unsupported(format!(
                            "{} + {} outside a function body",
                            lhs.type_name(),
                            rhs.type_name()
                        )))
                    }
                }
            }
            Expr::This | Expr::Ident(_) | Expr::Member { .. } | Expr::Runtime { .. } => {
                return Err(FixtureError::Unsupported(
                    "only literals can be evaluated outside a function body".into(),
                ));
            }
        };
        Ok(value)
    }

    fn construct(&self, constructor: &str, args: &[Expr]) -> FixtureResult<TaggedValue> {
        match (constructor, args) {
            ("Date", []) => Ok(allocate(HeapObject::Date(now_millis()))),
            ("Date", [Expr::Number(ms)]) => Ok(allocate(HeapObject::Date(*ms))),
            ("Object", []) => Ok(self.object(Vec::<(String, TaggedValue)>::new())),
            ("Array", _) => {
                let elements = args
                    .iter()
                    .map(|e| self.evaluate(e))
                    .collect::<FixtureResult<Vec<_>>>()?;
                Ok(self.array(elements))
            }
            _ => Err(FixtureError::Unsupported(format!(
                "new {} with {} arguments",
                constructor,
                args.len()
            ))),
        }
    }
}

fn allocate(object: HeapObject) -> TaggedValue {
    TaggedValue::HeapRef(HeapRef::new(object))
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_become_smis_when_they_fit() {
        let factory = Factory::new();
        assert_eq!(factory.new_object("42"), Ok(TaggedValue::SmallInt(42)));
        assert_eq!(factory.new_object("-7"), Ok(TaggedValue::SmallInt(-7)));
        let boxed = factory.new_object("1.5").expect("construct failed");
        assert!(matches!(boxed.as_object(), Some(HeapObject::HeapNumber(n)) if *n == 1.5));
        assert_eq!(factory.new_object("(2 + 3)"), Ok(TaggedValue::SmallInt(5)));
    }

    #[test]
    fn object_literal_properties() {
        let value = Factory::new().new_object("({ x: 20 })").expect("construct failed");
        assert_eq!(
            value.as_object().and_then(|o| o.get_property("x")),
            Some(TaggedValue::SmallInt(20))
        );
    }

    #[test]
    fn each_construction_is_a_new_identity() {
        let factory = Factory::new();
        let a = factory.new_object("({})").expect("construct failed");
        let b = factory.new_object("({})").expect("construct failed");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn constructors() {
        let factory = Factory::new();
        let date = factory.new_object("new Date(0)").expect("construct failed");
        assert!(matches!(date.as_object(), Some(HeapObject::Date(t)) if *t == 0.0));
        assert!(factory.new_object("new Array(1, 2)").expect("construct failed").is_array());
        assert!(matches!(
            factory.new_object("new Map()"),
            Err(FixtureError::Unsupported(_))
        ));
    }

    #[test]
    fn free_variables_are_rejected() {
        assert!(matches!(
            Factory::new().new_object("x"),
            Err(FixtureError::Unsupported(_))
        ));
    }
}
