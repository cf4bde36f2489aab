//! Programmatic construction of typed ASTs.
//!
//! The builder fills in the types inference would have produced for the
//! shapes it knows; callers can always override `Expr::ty` afterwards.

use imp_core::{DeclId, Symbol};
use imp_typing::{Type, TypeNode, TypeTable};

use crate::decl::{Decl, DeclKind};
use crate::expr::*;
use crate::item::*;
use crate::module::Module;

#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Module {
        self.module
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn types(&mut self) -> &mut TypeTable {
        &mut self.module.types
    }

    pub fn decl(&mut self, decl: Decl) -> DeclId {
        self.module.decls.add(decl)
    }

    pub fn local(&mut self, name: &str, ty: Type, mutable: bool) -> DeclId {
        self.decl(Decl::new(name, DeclKind::Local, Some(ty)).with_mutable(mutable))
    }

    pub fn param(&mut self, name: &str, ty: Type, mutable: bool) -> DeclId {
        self.decl(Decl::new(name, DeclKind::Param, Some(ty)).with_mutable(mutable))
    }

    pub fn push_item(&mut self, item: Item) {
        self.module.items.push(item);
    }

    // ------------------------------------------------------------------
    // items
    // ------------------------------------------------------------------

    /// Declares a function and its parameters. `ret: None` declares a
    /// continuation, which has no return slot and never returns.
    pub fn fn_decl(
        &mut self,
        name: &str,
        params: &[(&str, Type, bool)],
        ret: Option<Type>,
    ) -> (DeclId, Vec<DeclId>) {
        let param_tys: Vec<Type> = params.iter().map(|(_, ty, _)| *ty).collect();
        let ty = match ret {
            Some(ret) => self.module.types.fn_returning(param_tys, ret),
            None => self.module.types.fn_type(param_tys),
        };
        let decl = self.decl(Decl::new(name, DeclKind::Fn, Some(ty)));
        let params = params
            .iter()
            .map(|(name, ty, mutable)| self.param(name, *ty, *mutable))
            .collect();
        (decl, params)
    }

    pub fn fn_item(&mut self, decl: DeclId, params: Vec<DeclId>, body: Expr) -> Item {
        Item::new(ItemKind::Fn(FnDecl {
            decl,
            params,
            body,
            is_extern: false,
        }))
    }

    /// Declares a function, builds its body and appends it to the module.
    pub fn function(
        &mut self,
        name: &str,
        params: &[(&str, Type, bool)],
        ret: Option<Type>,
        body: impl FnOnce(&mut Self, &[DeclId]) -> Expr,
    ) -> DeclId {
        let (decl, params) = self.fn_decl(name, params, ret);
        let body = body(self, &params);
        let item = self.fn_item(decl, params, body);
        self.push_item(item);
        decl
    }

    /// Declares bodiless foreign functions inside one `extern` block.
    pub fn foreign_mod(
        &mut self,
        abi: Option<&str>,
        fns: &[(&str, Vec<Type>, Option<Type>)],
    ) -> Vec<DeclId> {
        let mut decls = Vec::new();
        for (name, params, ret) in fns {
            let ty = match ret {
                Some(ret) => self.module.types.fn_returning(params.clone(), *ret),
                None => self.module.types.fn_type(params.clone()),
            };
            decls.push(self.decl(Decl::new(*name, DeclKind::Fn, Some(ty))));
        }
        self.push_item(Item::new(ItemKind::ForeignMod(ForeignMod {
            abi: abi.map(str::to_string),
            fns: decls.clone(),
        })));
        decls
    }

    pub fn struct_decl(&mut self, name: &str, fields: &[(&str, Type)]) -> (DeclId, Type) {
        let decl = self.decl(Decl::new(name, DeclKind::Struct, None));
        let ty = self.module.types.struct_type(decl, name);
        let fields = fields
            .iter()
            .map(|(name, ty)| self.decl(Decl::new(*name, DeclKind::Field, Some(*ty))))
            .collect();
        self.push_item(Item::new(ItemKind::Struct(StructDecl { decl, fields })));
        (decl, ty)
    }

    // ------------------------------------------------------------------
    // expressions
    // ------------------------------------------------------------------

    fn unit(&mut self) -> Type {
        self.module.types.unit()
    }

    pub fn lit(&mut self, lit: Lit, ty: Type) -> Expr {
        Expr::new(ExprKind::Literal(lit), Some(ty))
    }

    pub fn int(&mut self, value: i128) -> Expr {
        let ty = self.module.types.type_i32();
        self.lit(Lit::Int(value), ty)
    }

    pub fn bool(&mut self, value: bool) -> Expr {
        let ty = self.module.types.type_bool();
        self.lit(Lit::Bool(value), ty)
    }

    pub fn path(&self, decl: DeclId) -> Expr {
        let ty = self.module.decls.get(decl).and_then(|d| d.ty);
        Expr::new(ExprKind::Path(ExprPath { decl }), ty)
    }

    pub fn prefix(&mut self, op: PrefixOp, operand: Expr) -> Expr {
        let types = &mut self.module.types;
        let ty = operand.ty.map(|ty| match op {
            PrefixOp::Deref => types.pointee(ty).unwrap_or_else(|| types.error()),
            PrefixOp::AddrOf => types.borrowed_ptr(ty),
            PrefixOp::AddrOfMut => types.mut_ptr(ty),
            PrefixOp::Tilde => types.owned_ptr(ty),
            _ => ty,
        });
        Expr::new(
            ExprKind::Prefix(ExprPrefix {
                op,
                operand: Box::new(operand),
            }),
            ty,
        )
    }

    pub fn postfix(&mut self, op: PostfixOp, operand: Expr) -> Expr {
        let ty = operand.ty;
        Expr::new(
            ExprKind::Postfix(ExprPostfix {
                op,
                operand: Box::new(operand),
            }),
            ty,
        )
    }

    pub fn infix(&mut self, op: InfixOp, lhs: Expr, rhs: Expr) -> Expr {
        let ty = if op.is_assign() {
            Some(self.unit())
        } else if op.is_cmp() || op.is_short_circuit() {
            Some(self.module.types.type_bool())
        } else {
            lhs.ty
        };
        Expr::new(
            ExprKind::Infix(ExprInfix {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
            ty,
        )
    }

    pub fn assign(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.infix(InfixOp::Assign, lhs, rhs)
    }

    /// A call; the result is the callee's return value, or unit.
    pub fn call(&mut self, callee: Expr, args: Vec<Expr>) -> Expr {
        let ty = match callee.ty {
            Some(fn_ty) => match self.module.types.return_type(fn_ty) {
                Some(ret) => Some(ret),
                None if self.module.types.ret_fn_type(fn_ty).is_some() => Some(self.unit()),
                None => Some(self.module.types.never()),
            },
            None => None,
        };
        Expr::new(
            ExprKind::Map(ExprMap {
                lhs: Box::new(callee),
                args,
            }),
            ty,
        )
    }

    pub fn index(&mut self, lhs: Expr, index: Expr) -> Expr {
        let types = &self.module.types;
        let elem = |node: &TypeNode| match node {
            TypeNode::Array { elem, .. } => Some(*elem),
            _ => None,
        };
        let ty = lhs.ty.and_then(|ty| match types.resolved(ty) {
            TypeNode::Array { elem, .. } => Some(*elem),
            TypeNode::Ptr(_, pointee) => elem(types.resolved(*pointee)).or(Some(*pointee)),
            TypeNode::Tuple(elems) => match index.kind {
                ExprKind::Literal(Lit::Int(i)) => elems.get(i as usize).copied(),
                _ => None,
            },
            _ => None,
        });
        Expr::new(
            ExprKind::Map(ExprMap {
                lhs: Box::new(lhs),
                args: vec![index],
            }),
            ty,
        )
    }

    pub fn field(&mut self, base: Expr, name: &str, index: u32, ty: Type) -> Expr {
        Expr::new(
            ExprKind::Field(ExprField {
                base: Box::new(base),
                name: Symbol::from(name),
                index,
            }),
            Some(ty),
        )
    }

    pub fn cast(&mut self, src: Expr, ty: Type) -> Expr {
        Expr::new(
            ExprKind::Cast(ExprCast { src: Box::new(src) }),
            Some(ty),
        )
    }

    pub fn tuple(&mut self, elems: Vec<Expr>) -> Expr {
        let tys: Option<Vec<Type>> = elems.iter().map(|e| e.ty).collect();
        let ty = tys.map(|tys| self.module.types.tuple_type(tys));
        Expr::new(ExprKind::Tuple(elems), ty)
    }

    pub fn if_(&mut self, cond: Expr, then: Expr, else_: Option<Expr>) -> Expr {
        let ty = match &else_ {
            Some(_) => then.ty,
            None => Some(self.unit()),
        };
        Expr::new(
            ExprKind::If(ExprIf {
                cond: Box::new(cond),
                then: Box::new(then),
                else_: else_.map(Box::new),
            }),
            ty,
        )
    }

    pub fn while_(&mut self, cond: Expr, body: Expr) -> Expr {
        let ty = self.unit();
        Expr::new(
            ExprKind::While(ExprWhile {
                cond: Box::new(cond),
                body: Box::new(body),
            }),
            Some(ty),
        )
    }

    pub fn for_(
        &mut self,
        init: Option<Stmt>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Expr,
    ) -> Expr {
        let ty = self.unit();
        Expr::new(
            ExprKind::For(ExprFor {
                init: init.map(Box::new),
                cond: cond.map(Box::new),
                step: step.map(Box::new),
                body: Box::new(body),
            }),
            Some(ty),
        )
    }

    pub fn block(&mut self, stmts: Vec<Stmt>, expr: Option<Expr>) -> Expr {
        let ty = match &expr {
            Some(expr) => expr.ty,
            None => Some(self.unit()),
        };
        Expr::new(
            ExprKind::Block(ExprBlock {
                stmts,
                expr: expr.map(Box::new),
            }),
            ty,
        )
    }

    pub fn ret(&mut self, value: Option<Expr>) -> Expr {
        let ty = self.module.types.never();
        Expr::new(ExprKind::Return(value.map(Box::new)), Some(ty))
    }

    pub fn break_(&mut self) -> Expr {
        let ty = self.module.types.never();
        Expr::new(ExprKind::Break, Some(ty))
    }

    pub fn continue_(&mut self) -> Expr {
        let ty = self.module.types.never();
        Expr::new(ExprKind::Continue, Some(ty))
    }

    pub fn str(&mut self, value: &str) -> Expr {
        let u8_ = self.module.types.type_u8();
        let arr = self.module.types.array_type(u8_, None);
        Expr::new(ExprKind::Str(value.to_string()), Some(arr))
    }

    // ------------------------------------------------------------------
    // statements
    // ------------------------------------------------------------------

    pub fn let_(&mut self, local: DeclId, init: Option<Expr>) -> Stmt {
        StmtLet { local, init }.into()
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        expr.into()
    }
}
