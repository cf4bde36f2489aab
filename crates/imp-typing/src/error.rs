use thiserror::Error;

use crate::node::Type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("type variable {var} is already bound to {current}, cannot rebind to {requested}")]
    AlreadyBound {
        var: Type,
        current: Type,
        requested: Type,
    },
    #[error("{0} is not a type variable")]
    NotAVariable(Type),
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch { expected: Type, found: Type },
    #[error("type variable {var} occurs in {ty}")]
    Occurs { var: Type, ty: Type },
}
