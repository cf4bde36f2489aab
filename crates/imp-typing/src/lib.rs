//! Interned type universe and unification.
//!
//! Every type lives in a [`TypeTable`] arena and is referred to through a
//! [`Type`] handle. Structurally equal types are interned to the same handle;
//! binding a type variable redirects every composite mentioning it so the
//! table never holds two canonical copies of one type.

mod display;
pub mod error;
pub mod node;
pub mod table;
mod unify;

pub use display::TypeDisplay;
pub use error::TypeError;
pub use node::{PrimKind, PtrMode, Type, TypeNode, TypeVarId};
pub use table::TypeTable;
