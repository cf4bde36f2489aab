use imp_core::config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerOptions {
    /// Check the type table's invariants before lowering.
    pub verify_types: bool,
    /// Appended to the backend name of `main`.
    pub entry_suffix: String,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            verify_types: config::verify_types(),
            entry_suffix: config::entry_suffix().to_string(),
        }
    }
}
