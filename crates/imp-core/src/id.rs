//! Identifiers shared by every stage.
//!
//! - `DeclId`: stable handle into a module's declaration table, produced by
//!   name resolution. Expressions refer to declarations through it instead of
//!   holding a pointer, so the AST and the table can move independently.
//! - `Symbol`: a source-level name, preserved verbatim down to the backend.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("decl#{_0}")]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize)]
#[display("{name}")]
pub struct Symbol {
    pub name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}
