//! Fixture construction errors

use std::ops::Range;

use ivm_core::BuildFault;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixtureError {
    #[error("unexpected character at {span:?}")]
    Lex { span: Range<usize> },

    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("unsupported construct: {0}")]
    Unsupported(String),

    #[error("unbound identifier `{0}`")]
    UnboundIdentifier(String),

    #[error("unknown runtime function `%{0}`")]
    UnknownRuntime(String),

    #[error("function body failed to compile: {0}")]
    Build(#[from] BuildFault),
}

pub type FixtureResult<T> = Result<T, FixtureError>;
