use std::cell::Cell;
use std::ops::Index;

use imp_core::span::Span;
use imp_core::{DeclId, Symbol};
use imp_typing::Type;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeclKind {
    Local,
    Param,
    Fn,
    Static,
    Struct,
    Field,
    Trait,
    Impl,
    Mod,
    ForeignMod,
    Typedef,
}

/// A named entity produced by resolution.
///
/// `address_taken` and `written` are one-way flags raised while the
/// semantic predicates inspect uses of the declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: Symbol,
    pub kind: DeclKind,
    pub ty: Option<Type>,
    pub mutable: bool,
    pub span: Span,
    address_taken: Cell<bool>,
    written: Cell<bool>,
}

impl Decl {
    pub fn new(name: impl Into<Symbol>, kind: DeclKind, ty: Option<Type>) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            mutable: false,
            span: Span::null(),
            address_taken: Cell::new(false),
            written: Cell::new(false),
        }
    }

    pub fn with_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Locals and parameters: the declarations that own function-scoped
    /// storage.
    pub fn is_local(&self) -> bool {
        matches!(self.kind, DeclKind::Local | DeclKind::Param)
    }

    pub fn is_address_taken(&self) -> bool {
        self.address_taken.get()
    }

    pub fn mark_address_taken(&self) {
        self.address_taken.set(true);
    }

    pub fn is_written(&self) -> bool {
        self.written.get()
    }

    pub fn mark_written(&self) {
        self.written.set(true);
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeclTable {
    decls: Vec<Decl>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclId(idx as u32), decl))
    }
}

impl Index<DeclId> for DeclTable {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }
}
