//! Fixture values and a harness for exercising intrinsics.
//!
//! Values are built from a small literal dialect:
//!
//! ```
//! use ivm_core::{IntrinsicId, TaggedValue};
//! use ivm_fixture::Harness;
//!
//! let harness = Harness::new();
//! let add = harness.new_object("(function(a, b) { return a + b; })");
//! let sum = harness.invoke(IntrinsicId::Call, (add, (), 2, 3));
//! assert_eq!(sum, TaggedValue::from(5));
//! ```

pub mod compiler;
pub mod error;
pub mod factory;
pub mod harness;
pub mod lexer;
pub mod parser;

pub use compiler::compile_function;
pub use error::{FixtureError, FixtureResult};
pub use factory::Factory;
pub use harness::Harness;
pub use parser::{parse, Expr, FunctionLiteral};
