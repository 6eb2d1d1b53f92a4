//! Runtime Value Representation
//!
//! Defines the tagged values the interpreter passes between registers,
//! natives and the host. Heap references compare by identity.

use std::fmt;

use crate::error::ValueError;

use super::heap::{FunctionObject, HeapObject, HeapRef};

/// Smallest integer representable as a small integer.
pub const SMI_MIN: i64 = i32::MIN as i64;

/// Largest integer representable as a small integer.
pub const SMI_MAX: i64 = i32::MAX as i64;

pub const UNDEFINED: TaggedValue = TaggedValue::Undefined;
pub const NULL: TaggedValue = TaggedValue::Null;
pub const TRUE: TaggedValue = TaggedValue::Boolean(true);
pub const FALSE: TaggedValue = TaggedValue::Boolean(false);

/// Runtime value
#[derive(Debug, Clone)]
pub enum TaggedValue {
    /// Integer within the 32-bit tagging range
    SmallInt(i32),

    Boolean(bool),

    Undefined,

    Null,

    /// Reference to a heap-allocated object
    HeapRef(HeapRef),
}

impl TaggedValue {
    pub fn is_smi(&self) -> bool {
        matches!(self, TaggedValue::SmallInt(_))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, TaggedValue::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TaggedValue::Null)
    }

    /// True for heap objects that can act as a receiver (not strings or
    /// boxed numbers).
    pub fn is_receiver(&self) -> bool {
        self.as_heap().is_some_and(|h| h.object().is_receiver())
    }

    pub fn is_array(&self) -> bool {
        matches!(self.as_object(), Some(HeapObject::Array(_)))
    }

    pub fn is_callable(&self) -> bool {
        self.as_function().is_some()
    }

    pub fn as_smi(&self) -> Option<i32> {
        match self {
            TaggedValue::SmallInt(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TaggedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_heap(&self) -> Option<&HeapRef> {
        match self {
            TaggedValue::HeapRef(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HeapObject> {
        self.as_heap().map(HeapRef::object)
    }

    pub fn as_function(&self) -> Option<&FunctionObject> {
        match self.as_object() {
            Some(HeapObject::Function(f)) => Some(f),
            _ => None,
        }
    }

    /// Short name of the value's kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            TaggedValue::SmallInt(_) => "smi",
            TaggedValue::Boolean(_) => "boolean",
            TaggedValue::Undefined => "undefined",
            TaggedValue::Null => "null",
            TaggedValue::HeapRef(h) => h.object().type_name(),
        }
    }
}

impl PartialEq for TaggedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TaggedValue::SmallInt(a), TaggedValue::SmallInt(b)) => a == b,
            (TaggedValue::Boolean(a), TaggedValue::Boolean(b)) => a == b,
            (TaggedValue::Undefined, TaggedValue::Undefined) => true,
            (TaggedValue::Null, TaggedValue::Null) => true,
            (TaggedValue::HeapRef(a), TaggedValue::HeapRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TaggedValue {}

impl From<i32> for TaggedValue {
    fn from(n: i32) -> Self {
        TaggedValue::SmallInt(n)
    }
}

impl TryFrom<i64> for TaggedValue {
    type Error = ValueError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        i32::try_from(n)
            .map(TaggedValue::SmallInt)
            .map_err(|_| ValueError::SmiOutOfRange(n))
    }
}

impl From<bool> for TaggedValue {
    fn from(b: bool) -> Self {
        TaggedValue::Boolean(b)
    }
}

impl From<HeapRef> for TaggedValue {
    fn from(h: HeapRef) -> Self {
        TaggedValue::HeapRef(h)
    }
}

impl From<&HeapRef> for TaggedValue {
    fn from(h: &HeapRef) -> Self {
        TaggedValue::HeapRef(h.clone())
    }
}

/// The unit value is the host's spelling of `undefined`.
impl From<()> for TaggedValue {
    fn from(_: ()) -> Self {
        TaggedValue::Undefined
    }
}

/// `None` is an explicit absence and maps to `null`.
impl<T: Into<TaggedValue>> From<Option<T>> for TaggedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(TaggedValue::Null, Into::into)
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::SmallInt(n) => write!(f, "{}", n),
            TaggedValue::Boolean(b) => write!(f, "{}", b),
            TaggedValue::Undefined => f.write_str("undefined"),
            TaggedValue::Null => f.write_str("null"),
            TaggedValue::HeapRef(h) => write!(f, "{}", h.object()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn singletons_compare_by_variant() {
        assert_eq!(UNDEFINED, TaggedValue::Undefined);
        assert_eq!(NULL, TaggedValue::from(None::<bool>));
        assert_ne!(UNDEFINED, NULL);
        assert_ne!(FALSE, TaggedValue::SmallInt(0));
        assert_eq!(TaggedValue::from(()), UNDEFINED);
    }

    #[test]
    fn heap_refs_compare_by_identity() {
        let a = HeapRef::new(HeapObject::String("x".into()));
        let b = HeapRef::new(HeapObject::String("x".into()));
        assert_eq!(TaggedValue::from(&a), TaggedValue::from(a.clone()));
        assert_ne!(TaggedValue::from(a), TaggedValue::from(b));
    }

    #[test]
    fn primitives_on_the_heap_are_not_receivers() {
        let s = TaggedValue::from(HeapRef::new(HeapObject::String("s".into())));
        let n = TaggedValue::from(HeapRef::new(HeapObject::HeapNumber(1.5)));
        assert!(!s.is_receiver());
        assert!(!n.is_receiver());
        assert!(!TaggedValue::SmallInt(42).is_receiver());
        assert!(TaggedValue::from(HeapRef::new(HeapObject::Array(vec![]))).is_receiver());
    }

    #[test]
    fn display_matches_script_spelling() {
        assert_eq!(TaggedValue::from(42).to_string(), "42");
        assert_eq!(TRUE.to_string(), "true");
        assert_eq!(UNDEFINED.to_string(), "undefined");
        assert_eq!(NULL.to_string(), "null");
    }

    proptest! {
        #[test]
        fn i64_conversion_respects_tagging_range(n in any::<i64>()) {
            let converted = TaggedValue::try_from(n);
            if (SMI_MIN..=SMI_MAX).contains(&n) {
                prop_assert_eq!(converted, Ok(TaggedValue::SmallInt(n as i32)));
            } else {
                prop_assert_eq!(converted, Err(ValueError::SmiOutOfRange(n)));
            }
        }

        #[test]
        fn smi_equality_is_payload_equality(a in any::<i32>(), b in any::<i32>()) {
            prop_assert_eq!(TaggedValue::from(a) == TaggedValue::from(b), a == b);
        }
    }
}
