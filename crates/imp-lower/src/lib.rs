//! Lowering of typed ASTs into the continuation IR.

pub mod builder;
pub mod builtins;
pub mod codegen;
pub mod error;
pub mod options;
pub mod ty;
pub mod var;

pub use builder::{Handle, IrBuilder, JumpTarget};
pub use codegen::{lower_module, lower_module_with, CodeGen, LowerOutcome};
pub use error::LowerError;
pub use options::LowerOptions;
pub use ty::TypeLowering;
pub use var::Var;
