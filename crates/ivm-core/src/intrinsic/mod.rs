pub mod id;
mod natives;
pub mod registry;

pub use id::{is_supported, Arity, IntrinsicId, UnknownIntrinsic};
pub use registry::{IntrinsicEntry, IntrinsicRegistry, NativeFn};
