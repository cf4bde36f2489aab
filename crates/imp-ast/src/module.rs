use std::collections::HashMap;

use imp_core::DeclId;
use imp_typing::{Type, TypeTable};

use crate::decl::DeclTable;
use crate::item::{Item, ItemKind};

/// A resolved and typed compilation unit.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub items: Vec<Item>,
    pub decls: DeclTable,
    pub types: TypeTable,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field types of every struct declared anywhere in the module, keyed by
    /// the struct's declaration.
    pub fn struct_fields(&self) -> HashMap<DeclId, Vec<Type>> {
        let mut out = HashMap::new();
        collect_struct_fields(&self.items, &self.decls, &mut out);
        out
    }
}

fn collect_struct_fields(items: &[Item], decls: &DeclTable, out: &mut HashMap<DeclId, Vec<Type>>) {
    for item in items {
        match &item.kind {
            ItemKind::Struct(s) => {
                let fields = s.fields.iter().filter_map(|f| decls[*f].ty).collect();
                out.insert(s.decl, fields);
            }
            ItemKind::Mod(m) => collect_struct_fields(&m.items, decls, out),
            _ => {}
        }
    }
}
