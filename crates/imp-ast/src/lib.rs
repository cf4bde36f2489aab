//! Resolved AST consumed by lowering.
//!
//! Parsing, name resolution and type inference happen elsewhere; every
//! expression here already carries its declaration references and (usually)
//! its type.

pub mod build;
pub mod decl;
pub mod expr;
pub mod item;
pub mod module;
pub mod sema;

pub use decl::{Decl, DeclKind, DeclTable};
pub use expr::*;
pub use item::*;
pub use module::Module;
pub use sema::Sema;
