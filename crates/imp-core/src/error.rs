use crate::id::{DeclId, Symbol};
use crate::span::Span;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Lowering error in '{name}' ({decl}): {message}")]
    Lowering {
        decl: DeclId,
        name: Symbol,
        span: Span,
        message: String,
    },
    #[error("Generic error: {0}")]
    Generic(String),
}

impl Error {
    pub fn lowering(decl: DeclId, name: Symbol, span: Span, message: impl Into<String>) -> Self {
        Error::Lowering {
            decl,
            name,
            span,
            message: message.into(),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Generic(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Generic(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowering_error_names_the_declaration() {
        let err = Error::lowering(DeclId(3), Symbol::new("f"), Span::new(0, 2, 5), "bad");
        assert_eq!(err.to_string(), "Lowering error in 'f' (decl#3): bad");
        assert_eq!(Error::from("oops").to_string(), "Generic error: oops");
    }
}
