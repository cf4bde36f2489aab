pub mod config;
pub mod diagnostics;
pub mod error;
pub mod id;
pub mod ir;
pub mod pretty;
pub mod span;

// Re-export commonly used items for convenience
pub use tracing;

pub use id::{DeclId, Symbol};

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
