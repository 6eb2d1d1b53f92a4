//! Heap Object Model
//!
//! Objects referenced by [`TaggedValue::HeapRef`]. Objects are immutable once
//! allocated; identity is the allocation itself.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::bytecode::Program;

use super::value::TaggedValue;

/// Identity handle to a heap object
#[derive(Debug, Clone)]
pub struct HeapRef(Rc<HeapObject>);

impl HeapRef {
    /// Allocate a new object in the host object space
    pub fn new(object: HeapObject) -> Self {
        HeapRef(Rc::new(object))
    }

    pub fn object(&self) -> &HeapObject {
        &self.0
    }

    pub fn ptr_eq(&self, other: &HeapRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for HeapRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HeapRef {}

/// Heap-allocated object
#[derive(Debug)]
pub enum HeapObject {
    /// Primitive string
    String(String),

    /// Primitive number outside the small integer range
    HeapNumber(f64),

    /// Plain object with ordered named properties
    Object(IndexMap<String, TaggedValue>),

    Array(Vec<TaggedValue>),

    Function(FunctionObject),

    /// Wrapped date, milliseconds since the epoch
    Date(f64),

    RegExp { source: String, flags: String },
}

impl HeapObject {
    pub fn is_receiver(&self) -> bool {
        !matches!(self, HeapObject::String(_) | HeapObject::HeapNumber(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HeapObject::String(_) => "string",
            HeapObject::HeapNumber(_) => "number",
            HeapObject::Object(_) => "object",
            HeapObject::Array(_) => "array",
            HeapObject::Function(_) => "function",
            HeapObject::Date(_) => "date",
            HeapObject::RegExp { .. } => "regexp",
        }
    }

    /// Named property lookup; `None` when the object has no such property.
    pub fn get_property(&self, name: &str) -> Option<TaggedValue> {
        match self {
            HeapObject::Object(properties) => properties.get(name).cloned(),
            HeapObject::String(s) if name == "length" => {
                i32::try_from(s.chars().count()).ok().map(TaggedValue::SmallInt)
            }
            HeapObject::Array(elements) if name == "length" => {
                i32::try_from(elements.len()).ok().map(TaggedValue::SmallInt)
            }
            HeapObject::Function(function) if name == "length" => {
                i32::try_from(function.formal_count()).ok().map(TaggedValue::SmallInt)
            }
            HeapObject::RegExp { source, .. } if name == "source" => Some(TaggedValue::from(
                HeapRef::new(HeapObject::String(source.clone())),
            )),
            _ => None,
        }
    }
}

/// Interpreted function: register 0 receives the receiver, registers
/// `1..=formal_count` the positional parameters.
#[derive(Debug)]
pub struct FunctionObject {
    name: Option<String>,
    program: Arc<Program>,
}

impl FunctionObject {
    pub fn new(name: Option<String>, program: Arc<Program>) -> Self {
        FunctionObject { name, program }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn formal_count(&self) -> usize {
        self.program.parameter_count().saturating_sub(1)
    }
}

impl fmt::Display for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapObject::String(s) => write!(f, "{:?}", s),
            HeapObject::HeapNumber(n) => write!(f, "{}", n),
            HeapObject::Object(properties) => {
                f.write_str("{")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}: {}", key, value)?;
                }
                if !properties.is_empty() {
                    f.write_str(" ")?;
                }
                f.write_str("}")
            }
            HeapObject::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            HeapObject::Function(function) => write!(
                f,
                "function {}({} params)",
                function.name().unwrap_or(""),
                function.formal_count()
            ),
            HeapObject::Date(time) => write!(f, "Date({})", time),
            HeapObject::RegExp { source, flags } => write!(f, "/{}/{}", source, flags),
        }
    }
}
