use std::fmt;

use itertools::Itertools;

use crate::node::{PtrMode, Type, TypeNode};
use crate::table::TypeTable;

/// Renders a type through its representatives, e.g. `fn(i32, fn(i32))`.
pub struct TypeDisplay<'a> {
    table: &'a TypeTable,
    ty: Type,
}

impl TypeTable {
    pub fn display(&self, ty: Type) -> TypeDisplay<'_> {
        TypeDisplay { table: self, ty }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table;
        let show = |ty: &Type| table.display(*ty).to_string();
        match table.resolved(self.ty) {
            TypeNode::Prim(kind) => write!(f, "{kind}"),
            TypeNode::Fn(params) => write!(f, "fn({})", params.iter().map(show).join(", ")),
            TypeNode::Tuple(elems) => write!(f, "({})", elems.iter().map(show).join(", ")),
            TypeNode::Struct { name, .. } | TypeNode::Trait { name, .. } => write!(f, "{name}"),
            TypeNode::Array {
                elem,
                len: Some(len),
            } => write!(f, "[{}; {}]", show(elem), len),
            TypeNode::Array { elem, len: None } => write!(f, "[{}]", show(elem)),
            TypeNode::Ptr(PtrMode::Owned, pointee) => write!(f, "~{}", show(pointee)),
            TypeNode::Ptr(PtrMode::Borrowed, pointee) => write!(f, "&{}", show(pointee)),
            TypeNode::Ptr(PtrMode::Mutable, pointee) => write!(f, "&mut {}", show(pointee)),
            TypeNode::Var { name: Some(name), .. } => write!(f, "?{name}"),
            TypeNode::Var { id, name: None } => write!(f, "?{id}"),
            TypeNode::Unknown => write!(f, "<unknown>"),
            TypeNode::Error => write!(f, "<error>"),
            TypeNode::Never => write!(f, "!"),
            TypeNode::Bound { trait_, args } if args.is_empty() => write!(f, "{}", show(trait_)),
            TypeNode::Bound { trait_, args } => {
                write!(f, "{}<{}>", show(trait_), args.iter().map(show).join(", "))
            }
            TypeNode::Impl { bound, self_ty, .. } => {
                write!(f, "impl {} for {}", show(bound), show(self_ty))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imp_core::DeclId;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_nested_types() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let f = table.fn_returning(vec![i32_], i32_);
        let p = table.mut_ptr(i32_);
        let arr = table.array_type(i32_, Some(4));
        let tr = table.trait_type(DeclId(3), "Eq");
        let bound = table.bound(tr, vec![i32_]);
        let v = table.type_var(None);

        assert_eq!(table.display(f).to_string(), "fn(i32, fn(i32))");
        assert_eq!(table.display(p).to_string(), "&mut i32");
        assert_eq!(table.display(arr).to_string(), "[i32; 4]");
        assert_eq!(table.display(bound).to_string(), "Eq<i32>");
        assert_eq!(table.display(v).to_string(), "?T0");
    }
}
