use imp_core::span::Span;
use imp_core::{DeclId, Symbol};
use imp_typing::Type;
use strum_macros::{Display, EnumString};

use crate::item::Stmt;

pub type BExpr = Box<Expr>;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Filled in by inference; `None` is treated like the unknown type.
    pub ty: Option<Type>,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Option<Type>) -> Self {
        Self {
            kind,
            ty,
            span: Span::null(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Visits the direct subexpressions, including those of statements in a
    /// block. Items nested in blocks are not entered.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Expr)) {
        match &self.kind {
            ExprKind::Literal(_)
            | ExprKind::Str(_)
            | ExprKind::Char(_)
            | ExprKind::Path(_)
            | ExprKind::Break
            | ExprKind::Continue => {}
            ExprKind::Field(field) => f(&field.base),
            ExprKind::Map(map) => {
                f(&map.lhs);
                map.args.iter().for_each(|arg| f(arg));
            }
            ExprKind::Prefix(prefix) => f(&prefix.operand),
            ExprKind::Postfix(postfix) => f(&postfix.operand),
            ExprKind::Infix(infix) => {
                f(&infix.lhs);
                f(&infix.rhs);
            }
            ExprKind::Cast(cast) => f(&cast.src),
            ExprKind::Tuple(elems) => elems.iter().for_each(|elem| f(elem)),
            ExprKind::If(if_) => {
                f(&if_.cond);
                f(&if_.then);
                if let Some(else_) = &if_.else_ {
                    f(else_);
                }
            }
            ExprKind::While(while_) => {
                f(&while_.cond);
                f(&while_.body);
            }
            ExprKind::For(for_) => {
                if let Some(init) = &for_.init {
                    init.for_each_expr(f);
                }
                for part in [&for_.cond, &for_.step].into_iter().flatten() {
                    f(part);
                }
                f(&for_.body);
            }
            ExprKind::Block(block) => {
                for stmt in &block.stmts {
                    stmt.for_each_expr(f);
                }
                if let Some(expr) = &block.expr {
                    f(expr);
                }
            }
            ExprKind::Return(value) => {
                if let Some(value) = value {
                    f(value);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Lit),
    Str(String),
    Char(char),
    Path(ExprPath),
    Field(ExprField),
    /// `lhs(args)`: a call when `lhs` is function-typed, indexing otherwise.
    Map(ExprMap),
    Prefix(ExprPrefix),
    Postfix(ExprPostfix),
    Infix(ExprInfix),
    /// Conversion to the expression's own type.
    Cast(ExprCast),
    Tuple(Vec<Expr>),
    If(ExprIf),
    While(ExprWhile),
    For(ExprFor),
    Block(ExprBlock),
    Return(Option<BExpr>),
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lit {
    Bool(bool),
    Int(i128),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprPath {
    pub decl: DeclId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprField {
    pub base: BExpr,
    pub name: Symbol,
    /// Position of the field in its aggregate, resolved by inference.
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprMap {
    pub lhs: BExpr,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PrefixOp {
    #[strum(serialize = "++")]
    Inc,
    #[strum(serialize = "--")]
    Dec,
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "!")]
    Not,
    /// Owned allocation, `~e`.
    #[strum(serialize = "~")]
    Tilde,
    #[strum(serialize = "*")]
    Deref,
    #[strum(serialize = "&")]
    AddrOf,
    #[strum(serialize = "&mut")]
    AddrOfMut,
    #[strum(serialize = "@")]
    Run,
    #[strum(serialize = "$")]
    Hlt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprPrefix {
    pub op: PrefixOp,
    pub operand: BExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum PostfixOp {
    #[strum(serialize = "++")]
    Inc,
    #[strum(serialize = "--")]
    Dec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprPostfix {
    pub op: PostfixOp,
    pub operand: BExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum InfixOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Rem,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,
    #[strum(serialize = "<<")]
    Shl,
    #[strum(serialize = ">>")]
    Shr,
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "&&")]
    AndAnd,
    #[strum(serialize = "||")]
    OrOr,
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = "+=")]
    AddAssign,
    #[strum(serialize = "-=")]
    SubAssign,
    #[strum(serialize = "*=")]
    MulAssign,
    #[strum(serialize = "/=")]
    DivAssign,
    #[strum(serialize = "%=")]
    RemAssign,
    #[strum(serialize = "&=")]
    AndAssign,
    #[strum(serialize = "|=")]
    OrAssign,
    #[strum(serialize = "^=")]
    XorAssign,
    #[strum(serialize = "<<=")]
    ShlAssign,
    #[strum(serialize = ">>=")]
    ShrAssign,
}

impl InfixOp {
    pub fn is_assign(self) -> bool {
        self == InfixOp::Assign || self.separate_assign().is_some()
    }

    /// `a op= b` → `op`.
    pub fn separate_assign(self) -> Option<InfixOp> {
        Some(match self {
            InfixOp::AddAssign => InfixOp::Add,
            InfixOp::SubAssign => InfixOp::Sub,
            InfixOp::MulAssign => InfixOp::Mul,
            InfixOp::DivAssign => InfixOp::Div,
            InfixOp::RemAssign => InfixOp::Rem,
            InfixOp::AndAssign => InfixOp::And,
            InfixOp::OrAssign => InfixOp::Or,
            InfixOp::XorAssign => InfixOp::Xor,
            InfixOp::ShlAssign => InfixOp::Shl,
            InfixOp::ShrAssign => InfixOp::Shr,
            _ => return None,
        })
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, InfixOp::AndAnd | InfixOp::OrOr)
    }

    pub fn is_cmp(self) -> bool {
        matches!(
            self,
            InfixOp::Eq | InfixOp::Ne | InfixOp::Lt | InfixOp::Le | InfixOp::Gt | InfixOp::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInfix {
    pub op: InfixOp,
    pub lhs: BExpr,
    pub rhs: BExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprCast {
    pub src: BExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIf {
    pub cond: BExpr,
    pub then: BExpr,
    pub else_: Option<BExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprWhile {
    pub cond: BExpr,
    pub body: BExpr,
}

/// `for (init; cond; step) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ExprFor {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<BExpr>,
    pub step: Option<BExpr>,
    pub body: BExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBlock {
    pub stmts: Vec<Stmt>,
    pub expr: Option<BExpr>,
}

impl ExprBlock {
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty() && self.expr.is_none()
    }
}
