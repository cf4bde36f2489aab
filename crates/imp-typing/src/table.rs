use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use imp_core::{DeclId, Symbol};
use itertools::Itertools;
use tracing::trace;

use crate::node::{PrimKind, PtrMode, Type, TypeNode, TypeVarId};

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) node: TypeNode,
    /// Binding of a type variable, or the rewritten copy of a composite
    /// whose children were bound after it was interned. Set at most once.
    pub(crate) repr: Option<Type>,
}

/// Arena owning every type of a compilation.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    pub(crate) entries: Vec<Entry>,
    pub(crate) canonical: HashMap<TypeNode, Type>,
    next_var: u32,
}

macro_rules! prim_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Type {
                self.prim(PrimKind::$kind)
            }
        )*
    };
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The node stored for `ty`, without following its representative.
    pub fn node(&self, ty: Type) -> &TypeNode {
        &self.entries[ty.index()].node
    }

    /// The node of `ty`'s current representative.
    pub fn resolved(&self, ty: Type) -> &TypeNode {
        self.node(self.unify(ty))
    }

    /// Returns the canonical handle for `node`, inserting it if no
    /// structurally equal type exists yet.
    pub fn intern(&mut self, node: TypeNode) -> Type {
        let node = node.map_children(|child| self.unify(child));
        if let Some(&existing) = self.canonical.get(&node) {
            return self.unify(existing);
        }
        let ty = Type(self.entries.len() as u32);
        trace!(%ty, ?node, "intern");
        self.canonical.insert(node.clone(), ty);
        self.entries.push(Entry { node, repr: None });
        ty
    }

    pub fn prim(&mut self, kind: PrimKind) -> Type {
        self.intern(TypeNode::Prim(kind))
    }

    prim_constructors! {
        type_bool => Bool,
        type_i8 => I8,
        type_i16 => I16,
        type_i32 => I32,
        type_i64 => I64,
        type_u8 => U8,
        type_u16 => U16,
        type_u32 => U32,
        type_u64 => U64,
        type_f32 => F32,
        type_f64 => F64,
    }

    pub fn unit(&mut self) -> Type {
        self.tuple_type(Vec::new())
    }

    pub fn tuple_type(&mut self, elems: Vec<Type>) -> Type {
        self.intern(TypeNode::Tuple(elems))
    }

    pub fn fn_type(&mut self, params: Vec<Type>) -> Type {
        self.intern(TypeNode::Fn(params))
    }

    /// `fn(params…, fn(ret))`: a function returning `ret` through its
    /// return continuation. A unit `ret` yields an empty continuation.
    pub fn fn_returning(&mut self, mut params: Vec<Type>, ret: Type) -> Type {
        let ret_fn = if self.is_unit(ret) {
            self.fn_type(Vec::new())
        } else {
            self.fn_type(vec![ret])
        };
        params.push(ret_fn);
        self.fn_type(params)
    }

    pub fn struct_type(&mut self, decl: DeclId, name: impl Into<Symbol>) -> Type {
        self.intern(TypeNode::Struct {
            decl,
            name: name.into(),
        })
    }

    pub fn array_type(&mut self, elem: Type, len: Option<u64>) -> Type {
        self.intern(TypeNode::Array { elem, len })
    }

    pub fn ptr_type(&mut self, mode: PtrMode, pointee: Type) -> Type {
        self.intern(TypeNode::Ptr(mode, pointee))
    }

    pub fn owned_ptr(&mut self, pointee: Type) -> Type {
        self.ptr_type(PtrMode::Owned, pointee)
    }

    pub fn borrowed_ptr(&mut self, pointee: Type) -> Type {
        self.ptr_type(PtrMode::Borrowed, pointee)
    }

    pub fn mut_ptr(&mut self, pointee: Type) -> Type {
        self.ptr_type(PtrMode::Mutable, pointee)
    }

    /// A fresh, unbound type variable. Never shared with another call.
    pub fn type_var(&mut self, name: Option<&str>) -> Type {
        let id = TypeVarId(self.next_var);
        self.next_var += 1;
        self.intern(TypeNode::Var {
            id,
            name: name.map(Symbol::from),
        })
    }

    pub fn unknown(&mut self) -> Type {
        self.intern(TypeNode::Unknown)
    }

    pub fn error(&mut self) -> Type {
        self.intern(TypeNode::Error)
    }

    pub fn never(&mut self) -> Type {
        self.intern(TypeNode::Never)
    }

    pub fn trait_type(&mut self, decl: DeclId, name: impl Into<Symbol>) -> Type {
        self.intern(TypeNode::Trait {
            decl,
            name: name.into(),
        })
    }

    pub fn bound(&mut self, trait_: Type, args: Vec<Type>) -> Type {
        self.intern(TypeNode::Bound { trait_, args })
    }

    pub fn impl_type(&mut self, item: DeclId, bound: Type, self_ty: Type) -> Type {
        self.intern(TypeNode::Impl {
            item,
            bound,
            self_ty,
        })
    }

    // ------------------------------------------------------------------
    // queries
    // ------------------------------------------------------------------

    pub fn is_error(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Error)
    }

    pub fn is_unknown(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Unknown)
    }

    /// Unknown, erroneous, or an unbound variable.
    pub fn is_unresolved(&self, ty: Type) -> bool {
        matches!(
            self.resolved(ty),
            TypeNode::Unknown | TypeNode::Error | TypeNode::Var { .. }
        )
    }

    pub fn is_fn(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Fn(_))
    }

    pub fn is_ptr(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Ptr(..))
    }

    pub fn is_bool(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Prim(PrimKind::Bool))
    }

    pub fn is_unit(&self, ty: Type) -> bool {
        matches!(self.resolved(ty), TypeNode::Tuple(elems) if elems.is_empty())
    }

    pub fn fn_params(&self, ty: Type) -> Option<&[Type]> {
        match self.resolved(ty) {
            TypeNode::Fn(params) => Some(params),
            _ => None,
        }
    }

    /// The return continuation of a function type: its last parameter when
    /// that parameter is itself a function type.
    pub fn ret_fn_type(&self, ty: Type) -> Option<Type> {
        let last = *self.fn_params(ty)?.last()?;
        self.is_fn(last).then(|| self.unify(last))
    }

    /// The single value a function returns, `None` for unit and for
    /// continuations that never return.
    pub fn return_type(&self, ty: Type) -> Option<Type> {
        let ret = self.ret_fn_type(ty)?;
        match self.fn_params(ret)? {
            [single] => Some(self.unify(*single)),
            _ => None,
        }
    }

    pub fn pointee(&self, ty: Type) -> Option<Type> {
        match self.resolved(ty) {
            TypeNode::Ptr(_, pointee) => Some(self.unify(*pointee)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // structural identity
    // ------------------------------------------------------------------

    /// Structural hash computed through representatives.
    pub fn hash_of(&self, ty: Type) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash_into(ty, &mut hasher);
        hasher.finish()
    }

    fn hash_into(&self, ty: Type, state: &mut DefaultHasher) {
        let node = self.resolved(ty);
        std::mem::discriminant(node).hash(state);
        match node {
            TypeNode::Prim(kind) => kind.hash(state),
            TypeNode::Struct { decl, name } | TypeNode::Trait { decl, name } => {
                decl.hash(state);
                name.hash(state);
            }
            TypeNode::Array { len, .. } => len.hash(state),
            TypeNode::Ptr(mode, _) => mode.hash(state),
            TypeNode::Var { id, .. } => id.hash(state),
            TypeNode::Impl { item, .. } => item.hash(state),
            _ => {}
        }
        let children = node.children();
        children.len().hash(state);
        for child in children {
            self.hash_into(child, state);
        }
    }

    /// Structural equality computed through representatives.
    pub fn equal(&self, a: Type, b: Type) -> bool {
        let (a, b) = (self.unify(a), self.unify(b));
        if a == b {
            return true;
        }
        let (na, nb) = (self.node(a), self.node(b));
        let shallow = match (na, nb) {
            (TypeNode::Prim(x), TypeNode::Prim(y)) => x == y,
            (TypeNode::Fn(_), TypeNode::Fn(_)) | (TypeNode::Tuple(_), TypeNode::Tuple(_)) => true,
            (
                TypeNode::Struct { decl: x, name: m },
                TypeNode::Struct { decl: y, name: n },
            )
            | (
                TypeNode::Trait { decl: x, name: m },
                TypeNode::Trait { decl: y, name: n },
            ) => x == y && m == n,
            (TypeNode::Array { len: x, .. }, TypeNode::Array { len: y, .. }) => x == y,
            (TypeNode::Ptr(x, _), TypeNode::Ptr(y, _)) => x == y,
            (TypeNode::Var { id: x, .. }, TypeNode::Var { id: y, .. }) => x == y,
            (TypeNode::Unknown, TypeNode::Unknown)
            | (TypeNode::Error, TypeNode::Error)
            | (TypeNode::Never, TypeNode::Never)
            | (TypeNode::Bound { .. }, TypeNode::Bound { .. }) => true,
            (TypeNode::Impl { item: x, .. }, TypeNode::Impl { item: y, .. }) => x == y,
            _ => false,
        };
        if !shallow {
            return false;
        }
        let (ca, cb) = (na.children(), nb.children());
        ca.len() == cb.len() && ca.into_iter().zip(cb).all(|(x, y)| self.equal(x, y))
    }

    /// Checks the table's internal invariants and panics on a violation:
    /// the canonical map is consistent, no two canonical entries are
    /// structurally equal, and every representative chain terminates.
    pub fn verify(&self) {
        for (node, ty) in &self.canonical {
            assert_eq!(
                &self.entries[ty.index()].node,
                node,
                "canonical map entry for {ty} points at a different node"
            );
        }

        for idx in 0..self.entries.len() {
            let mut seen = 0;
            let mut cur = Type(idx as u32);
            while let Some(next) = self.entries[cur.index()].repr {
                seen += 1;
                assert!(
                    seen <= self.entries.len(),
                    "representative chain of {} does not terminate",
                    Type(idx as u32)
                );
                cur = next;
            }
        }

        let canonical = (0..self.entries.len() as u32)
            .map(Type)
            .filter(|ty| self.entries[ty.index()].repr.is_none());
        let buckets = canonical.into_group_map_by(|ty| self.hash_of(*ty));
        for group in buckets.values() {
            for (a, b) in group.iter().tuple_combinations() {
                assert!(
                    !self.equal(*a, *b),
                    "canonical types {} and {} are structurally equal",
                    self.display(*a),
                    self.display(*b)
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_memoized() {
        let mut table = TypeTable::new();
        let a = table.type_i32();
        let b = table.prim(PrimKind::I32);
        assert_eq!(a, b);
        assert_ne!(a, table.type_u32());
    }

    #[test]
    fn type_vars_are_never_shared() {
        let mut table = TypeTable::new();
        let a = table.type_var(Some("T"));
        let b = table.type_var(Some("T"));
        assert_ne!(a, b);
        assert!(!table.equal(a, b));
    }

    #[test]
    fn return_type_follows_continuation_convention() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let unit = table.unit();
        let f = table.fn_returning(vec![i32_], i32_);
        let g = table.fn_returning(vec![], unit);
        let k = table.fn_type(vec![i32_]);

        assert_eq!(table.return_type(f), Some(i32_));
        assert_eq!(table.return_type(g), None);
        assert!(table.ret_fn_type(g).is_some());
        assert_eq!(table.ret_fn_type(k), None);
    }
}
