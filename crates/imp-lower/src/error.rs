use imp_core::{DeclId, Symbol};
use thiserror::Error;

/// Problems that stop lowering of the enclosing function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error("type `{0}` is not resolved")]
    Unresolved(String),
    #[error("type `{0}` has no runtime representation")]
    NoRepresentation(String),
    #[error("struct `{0}` has no known field layout")]
    UnknownStruct(Symbol),
    #[error("'{0}' does not end with 'return'")]
    MissingReturn(Symbol),
    #[error("'{0}' does not end with a call")]
    MissingCall(Symbol),
    #[error("expression is not assignable")]
    NotAssignable,
    #[error("{0} is not declared")]
    UnknownDecl(DeclId),
}

pub type Result<T> = std::result::Result<T, LowerError>;
