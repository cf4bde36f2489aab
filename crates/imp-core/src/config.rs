use std::sync::OnceLock;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

fn bool_from_env(key: &str) -> bool {
    env_true(key).unwrap_or(false)
}

pub const DEFAULT_ENTRY_SUFFIX: &str = "_impala";

/// Run the type-table consistency check before lowering each module.
pub fn verify_types() -> bool {
    static VERIFY: OnceLock<bool> = OnceLock::new();
    *VERIFY.get_or_init(|| bool_from_env("IMP_VERIFY_TYPES"))
}

/// Suffix appended to the backend name of the program entry point.
pub fn entry_suffix() -> &'static str {
    static SUFFIX: OnceLock<String> = OnceLock::new();
    SUFFIX
        .get_or_init(|| {
            std::env::var("IMP_ENTRY_SUFFIX").unwrap_or_else(|_| DEFAULT_ENTRY_SUFFIX.to_string())
        })
        .as_str()
}
