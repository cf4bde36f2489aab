//! Function names the backend treats specially.

use imp_core::ir::Attribute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinEffect {
    /// The program entry point: renamed with the configured suffix and
    /// exported.
    Entry,
    Attributes(&'static [Attribute]),
}

pub const BUILTINS: &[(&str, BuiltinEffect)] = &[
    ("main", BuiltinEffect::Entry),
    ("nvvm", BuiltinEffect::Attributes(&[Attribute::Nvvm])),
    ("spir", BuiltinEffect::Attributes(&[Attribute::Spir])),
    ("array", BuiltinEffect::Attributes(&[Attribute::ArrayInit])),
    ("vectorized", BuiltinEffect::Attributes(&[Attribute::Vectorize])),
    (
        "wfv_get_tid",
        BuiltinEffect::Attributes(&[Attribute::VectorizeTid, Attribute::Extern]),
    ),
];

pub fn lookup(name: &str) -> Option<BuiltinEffect> {
    BUILTINS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, effect)| *effect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(lookup("main"), Some(BuiltinEffect::Entry));
        assert_eq!(
            lookup("wfv_get_tid"),
            Some(BuiltinEffect::Attributes(&[
                Attribute::VectorizeTid,
                Attribute::Extern
            ]))
        );
        assert_eq!(lookup("mainly"), None);
    }
}
