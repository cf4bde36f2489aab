use derive_more::Display;
use imp_core::{DeclId, Symbol};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// Handle of an interned type. Compare handles only after resolving them
/// with [`crate::TypeTable::unify`]; a handle may have been redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("ty#{_0}")]
pub struct Type(pub(crate) u32);

impl Type {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("T{_0}")]
pub struct TypeVarId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PrimKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl PrimKind {
    pub fn is_int(self) -> bool {
        !matches!(self, PrimKind::Bool | PrimKind::F32 | PrimKind::F64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimKind::F32 | PrimKind::F64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PtrMode {
    Owned,
    Borrowed,
    Mutable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Prim(PrimKind),
    /// Parameters only. A trailing function-typed parameter is the return
    /// continuation; without one the function never returns.
    Fn(Vec<Type>),
    Tuple(Vec<Type>),
    Struct {
        decl: DeclId,
        name: Symbol,
    },
    Array {
        elem: Type,
        len: Option<u64>,
    },
    Ptr(PtrMode, Type),
    Var {
        id: TypeVarId,
        name: Option<Symbol>,
    },
    Unknown,
    Error,
    Never,
    Trait {
        decl: DeclId,
        name: Symbol,
    },
    Bound {
        trait_: Type,
        args: Vec<Type>,
    },
    Impl {
        item: DeclId,
        bound: Type,
        self_ty: Type,
    },
}

impl TypeNode {
    pub fn children(&self) -> Vec<Type> {
        match self {
            TypeNode::Fn(elems) | TypeNode::Tuple(elems) => elems.clone(),
            TypeNode::Array { elem, .. } => vec![*elem],
            TypeNode::Ptr(_, pointee) => vec![*pointee],
            TypeNode::Bound { trait_, args } => {
                std::iter::once(*trait_).chain(args.iter().copied()).collect()
            }
            TypeNode::Impl { bound, self_ty, .. } => vec![*bound, *self_ty],
            TypeNode::Prim(_)
            | TypeNode::Struct { .. }
            | TypeNode::Var { .. }
            | TypeNode::Unknown
            | TypeNode::Error
            | TypeNode::Never
            | TypeNode::Trait { .. } => Vec::new(),
        }
    }

    /// Rebuilds the node with each child passed through `f`.
    pub fn map_children(&self, mut f: impl FnMut(Type) -> Type) -> TypeNode {
        match self {
            TypeNode::Fn(elems) => TypeNode::Fn(elems.iter().map(|t| f(*t)).collect()),
            TypeNode::Tuple(elems) => TypeNode::Tuple(elems.iter().map(|t| f(*t)).collect()),
            TypeNode::Array { elem, len } => TypeNode::Array {
                elem: f(*elem),
                len: *len,
            },
            TypeNode::Ptr(mode, pointee) => TypeNode::Ptr(*mode, f(*pointee)),
            TypeNode::Bound { trait_, args } => TypeNode::Bound {
                trait_: f(*trait_),
                args: args.iter().map(|t| f(*t)).collect(),
            },
            TypeNode::Impl {
                item,
                bound,
                self_ty,
            } => TypeNode::Impl {
                item: *item,
                bound: f(*bound),
                self_ty: f(*self_ty),
            },
            other => other.clone(),
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self, TypeNode::Var { .. })
    }

    pub fn is_composite(&self) -> bool {
        !self.children().is_empty()
    }
}
