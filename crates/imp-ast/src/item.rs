use derive_more::From;
use imp_core::span::Span;
use imp_core::DeclId;
use imp_typing::Type;

use crate::expr::Expr;

#[derive(Debug, Clone, PartialEq, From)]
pub enum Stmt {
    Expr(Expr),
    Let(StmtLet),
    Item(Box<Item>),
}

impl Stmt {
    pub fn for_each_expr(&self, f: &mut dyn FnMut(&Expr)) {
        match self {
            Stmt::Expr(expr) => f(expr),
            Stmt::Let(let_) => {
                if let Some(init) = &let_.init {
                    f(init);
                }
            }
            Stmt::Item(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtLet {
    pub local: DeclId,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            span: Span::null(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Fn(FnDecl),
    Struct(StructDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    Mod(ModDecl),
    ForeignMod(ForeignMod),
    Static(StaticItem),
    Typedef(Typedef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub decl: DeclId,
    pub params: Vec<DeclId>,
    pub body: Expr,
    pub is_extern: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub decl: DeclId,
    /// Field declarations in declared order.
    pub fields: Vec<DeclId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraitDecl {
    pub decl: DeclId,
    pub methods: Vec<DeclId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplDecl {
    pub decl: DeclId,
    pub trait_: Option<Type>,
    pub self_ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModDecl {
    pub decl: DeclId,
    pub items: Vec<Item>,
}

/// `extern "abi" { fn ...; }`: bodiless function declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignMod {
    pub abi: Option<String>,
    pub fns: Vec<DeclId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticItem {
    pub decl: DeclId,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub decl: DeclId,
    pub ty: Type,
}
