//! Per-node semantic queries used by lowering.

use imp_typing::{Type, TypeNode, TypeTable};
use tracing::trace;

use crate::decl::DeclTable;
use crate::expr::{Expr, ExprKind, PrefixOp};

/// Read-only view over the tables the predicates consult.
#[derive(Clone, Copy)]
pub struct Sema<'a> {
    pub decls: &'a DeclTable,
    pub types: &'a TypeTable,
}

impl<'a> Sema<'a> {
    pub fn new(decls: &'a DeclTable, types: &'a TypeTable) -> Self {
        Self { decls, types }
    }

    fn resolved(&self, ty: Option<Type>) -> Option<&'a TypeNode> {
        ty.map(|ty| self.types.resolved(ty))
    }

    fn is_ptr(&self, expr: &Expr) -> bool {
        matches!(self.resolved(expr.ty), Some(TypeNode::Ptr(..)))
    }

    fn is_fn(&self, expr: &Expr) -> bool {
        matches!(self.resolved(expr.ty), Some(TypeNode::Fn(_)))
    }

    /// Whether `expr` denotes an assignable location.
    ///
    /// A path marks its declaration as written.
    pub fn is_lvalue(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Str(_) | ExprKind::Char(_) => true,
            ExprKind::Path(path) => match self.decls.get(path.decl) {
                Some(decl) => {
                    decl.mark_written();
                    decl.mutable
                }
                None => false,
            },
            ExprKind::Field(field) => self.is_ptr(&field.base) || self.is_lvalue(&field.base),
            ExprKind::Map(map) => match self.resolved(map.lhs.ty) {
                None | Some(TypeNode::Unknown | TypeNode::Error | TypeNode::Var { .. }) => true,
                Some(TypeNode::Array { .. } | TypeNode::Tuple(_) | TypeNode::Ptr(..)) => {
                    self.is_lvalue(&map.lhs)
                }
                Some(_) => false,
            },
            ExprKind::Prefix(prefix) => prefix.op == PrefixOp::Deref,
            ExprKind::Cast(cast) => self.is_lvalue(&cast.src),
            _ => false,
        }
    }

    /// Whether evaluating `expr` can be observed beyond producing its value.
    pub fn has_side_effect(&self, expr: &Expr) -> bool {
        match &expr.kind {
            ExprKind::Literal(_) | ExprKind::Str(_) | ExprKind::Char(_) | ExprKind::Path(_) => {
                false
            }
            ExprKind::Prefix(prefix) => match prefix.op {
                PrefixOp::Inc | PrefixOp::Dec | PrefixOp::Tilde | PrefixOp::Run | PrefixOp::Hlt => {
                    true
                }
                _ => self.has_side_effect(&prefix.operand),
            },
            ExprKind::Postfix(_) => true,
            ExprKind::Infix(infix) => {
                infix.op.is_assign()
                    || self.has_side_effect(&infix.lhs)
                    || self.has_side_effect(&infix.rhs)
            }
            ExprKind::Map(map) => {
                self.is_fn(&map.lhs)
                    || self.has_side_effect(&map.lhs)
                    || map.args.iter().any(|arg| self.has_side_effect(arg))
            }
            ExprKind::Field(field) => self.has_side_effect(&field.base),
            ExprKind::Cast(cast) => self.has_side_effect(&cast.src),
            ExprKind::Tuple(elems) => elems.iter().any(|elem| self.has_side_effect(elem)),
            ExprKind::Block(block) => {
                !block.stmts.is_empty()
                    || block
                        .expr
                        .as_ref()
                        .is_some_and(|expr| self.has_side_effect(expr))
            }
            ExprKind::If(if_) => {
                self.has_side_effect(&if_.cond)
                    || self.has_side_effect(&if_.then)
                    || if_
                        .else_
                        .as_ref()
                        .is_some_and(|else_| self.has_side_effect(else_))
            }
            ExprKind::While(_)
            | ExprKind::For(_)
            | ExprKind::Return(_)
            | ExprKind::Break
            | ExprKind::Continue => true,
        }
    }

    /// Requests addressable storage for the location `expr` denotes.
    pub fn take_address(&self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Path(path) => {
                if let Some(decl) = self.decls.get(path.decl).filter(|d| d.is_local()) {
                    trace!(name = %decl.name, "address taken");
                    decl.mark_address_taken();
                }
            }
            ExprKind::Field(field) => self.take_address(&field.base),
            ExprKind::Map(map) => self.take_address(&map.lhs),
            _ => {}
        }
    }

    /// Runs [`Sema::take_address`] on the operand of every `&e`/`&mut e`
    /// inside `body`.
    pub fn collect_address_taken(&self, body: &Expr) {
        if let ExprKind::Prefix(prefix) = &body.kind {
            if matches!(prefix.op, PrefixOp::AddrOf | PrefixOp::AddrOfMut) {
                self.take_address(&prefix.operand);
            }
        }
        body.for_each_child(&mut |child| self.collect_address_taken(child));
    }
}
