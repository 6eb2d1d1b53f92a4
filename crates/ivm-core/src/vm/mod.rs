pub mod frame;
pub mod heap;
pub mod interpreter;
pub mod value;

pub use heap::{FunctionObject, HeapObject, HeapRef};
pub use interpreter::{Interpreter, Invoker};
pub use value::TaggedValue;
