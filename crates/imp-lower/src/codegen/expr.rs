use imp_ast::{
    DeclKind, Expr, ExprBlock, ExprFor, ExprIf, ExprInfix, ExprKind, ExprMap, ExprWhile, InfixOp,
    Lit, PostfixOp, PrefixOp,
};
use imp_core::ir::{BinOp, DefId, EvalMarker, Literal, Ty};
use imp_typing::{Type, TypeNode};
use tracing::trace;

use super::{CodeGen, LoopTargets};
use crate::builder::JumpTarget;
use crate::error::{LowerError, Result};
use crate::var::Var;

fn binop(op: InfixOp) -> Option<BinOp> {
    Some(match op {
        InfixOp::Add => BinOp::Add,
        InfixOp::Sub => BinOp::Sub,
        InfixOp::Mul => BinOp::Mul,
        InfixOp::Div => BinOp::Div,
        InfixOp::Rem => BinOp::Rem,
        InfixOp::And => BinOp::And,
        InfixOp::Or => BinOp::Or,
        InfixOp::Xor => BinOp::Xor,
        InfixOp::Shl => BinOp::Shl,
        InfixOp::Shr => BinOp::Shr,
        InfixOp::Eq => BinOp::Eq,
        InfixOp::Ne => BinOp::Ne,
        InfixOp::Lt => BinOp::Lt,
        InfixOp::Le => BinOp::Le,
        InfixOp::Gt => BinOp::Gt,
        InfixOp::Ge => BinOp::Ge,
        _ => return None,
    })
}

impl<'a, 'w> CodeGen<'a, 'w> {
    /// Backend type of the value `expr` produces; `None` for unit, never
    /// and untyped expressions.
    fn value_ty(&mut self, expr: &Expr) -> Result<Option<Ty>> {
        let types = &self.module.types;
        match expr.ty {
            Some(ty) if types.is_unit(ty) || matches!(types.resolved(ty), TypeNode::Never) => {
                Ok(None)
            }
            Some(ty) => self.types.lower(ty).map(Some),
            None => Ok(None),
        }
    }

    fn is_error_typed(&self, expr: &Expr) -> bool {
        expr.ty.is_some_and(|ty| self.module.types.is_error(ty))
    }

    fn is_fn_typed(&self, ty: Option<Type>) -> bool {
        ty.is_some_and(|ty| self.module.types.is_fn(ty))
    }

    /// Lowers `expr` to a value.
    pub(crate) fn remit(&mut self, expr: &Expr) -> Result<DefId> {
        if !self.ir.is_reachable() || self.is_error_typed(expr) {
            return Ok(self.dead_value());
        }
        match &expr.kind {
            ExprKind::Literal(lit) => self.emit_literal(expr, *lit),
            ExprKind::Str(value) => Ok(self.ir.world.literal_str(value.clone())),
            ExprKind::Char(c) => {
                let ty = self.value_ty(expr)?.unwrap_or(Ty::U32);
                Ok(self.ir.world.literal_int(ty, u32::from(*c) as i128))
            }
            ExprKind::Path(path) => {
                let module = self.module;
                let Some(decl) = module.decls.get(path.decl) else {
                    return Err(LowerError::UnknownDecl(path.decl));
                };
                match decl.kind {
                    DeclKind::Fn => {
                        let cont = self.fn_head(path.decl)?;
                        Ok(self.ir.world.cont(cont).def)
                    }
                    DeclKind::Local | DeclKind::Param => {
                        let var = self.var(path.decl)?;
                        Ok(var.load(&mut self.ir))
                    }
                    kind => {
                        self.emit_error(
                            expr.span,
                            format!("{} '{}' cannot be used as a value", kind, decl.name),
                        );
                        Ok(self.dead_value())
                    }
                }
            }
            ExprKind::Map(map) if self.is_fn_typed(map.lhs.ty) => self.emit_call(expr, map),
            ExprKind::Field(_) | ExprKind::Map(_) => {
                let var = self.lemit(expr)?;
                Ok(var.load(&mut self.ir))
            }
            ExprKind::Prefix(prefix) => match prefix.op {
                PrefixOp::Inc | PrefixOp::Dec => {
                    if !self.check_assignable(&prefix.operand) {
                        return Ok(self.dead_value());
                    }
                    let var = self.lemit(&prefix.operand)?;
                    let old = var.load(&mut self.ir);
                    let ty = self.ir.world.ty(old).clone();
                    let one = self.ir.world.one(ty);
                    let op = if prefix.op == PrefixOp::Inc {
                        BinOp::Add
                    } else {
                        BinOp::Sub
                    };
                    let new = self.ir.world.binop(op, old, one);
                    self.store(expr, &var, new);
                    Ok(new)
                }
                PrefixOp::Add => self.remit(&prefix.operand),
                PrefixOp::Sub => {
                    let value = self.remit(&prefix.operand)?;
                    Ok(self.ir.world.arithop_minus(value))
                }
                PrefixOp::Not => {
                    let value = self.remit(&prefix.operand)?;
                    Ok(self.ir.world.arithop_not(value))
                }
                PrefixOp::Deref => {
                    let var = self.lemit(expr)?;
                    Ok(var.load(&mut self.ir))
                }
                PrefixOp::AddrOf | PrefixOp::AddrOfMut => {
                    let var = self.lemit(&prefix.operand)?;
                    match var.address(&mut self.ir) {
                        Some(ptr) => Ok(ptr),
                        None => {
                            self.emit_error(expr.span, "cannot take the address of this expression");
                            Ok(self.dead_value())
                        }
                    }
                }
                PrefixOp::Tilde => {
                    self.emit_error(expr.span, "owned allocation with '~' is not supported");
                    Ok(self.dead_value())
                }
                PrefixOp::Run | PrefixOp::Hlt => {
                    let value = self.remit(&prefix.operand)?;
                    let marker = if prefix.op == PrefixOp::Run {
                        EvalMarker::Run
                    } else {
                        EvalMarker::Hlt
                    };
                    Ok(self.ir.world.eval(marker, value))
                }
            },
            ExprKind::Postfix(postfix) => {
                if !self.check_assignable(&postfix.operand) {
                    return Ok(self.dead_value());
                }
                let var = self.lemit(&postfix.operand)?;
                let old = var.load(&mut self.ir);
                let ty = self.ir.world.ty(old).clone();
                let one = self.ir.world.one(ty);
                let op = match postfix.op {
                    PostfixOp::Inc => BinOp::Add,
                    PostfixOp::Dec => BinOp::Sub,
                };
                let new = self.ir.world.binop(op, old, one);
                self.store(expr, &var, new);
                Ok(old)
            }
            ExprKind::Infix(infix) => self.emit_infix(expr, infix),
            ExprKind::Cast(cast) => {
                let value = self.remit(&cast.src)?;
                match self.value_ty(expr)? {
                    Some(ty) => Ok(self.ir.world.cast(value, ty)),
                    None => Ok(value),
                }
            }
            ExprKind::Tuple(elems) => {
                let mut defs = Vec::with_capacity(elems.len());
                for elem in elems {
                    defs.push(self.remit(elem)?);
                }
                Ok(self.ir.world.tuple(defs))
            }
            ExprKind::If(if_) => self.emit_if(expr, if_),
            ExprKind::While(while_) => self.emit_while(while_),
            ExprKind::For(for_) => self.emit_for(for_),
            ExprKind::Block(block) => self.emit_block(block),
            ExprKind::Return(value) => {
                let ret = self.fn_ctx.as_ref().and_then(|ctx| ctx.ret_param);
                let Some(ret) = ret else {
                    self.emit_error(expr.span, "'return' outside of a returning function");
                    return Ok(self.dead_value());
                };
                let mut args = Vec::new();
                if let Some(value) = value {
                    let def = self.remit(value)?;
                    if self.value_ty(value)?.is_some() {
                        args.push(def);
                    }
                }
                self.ir.tail_call(ret, args);
                Ok(self.dead_value())
            }
            ExprKind::Break | ExprKind::Continue => {
                let is_break = matches!(expr.kind, ExprKind::Break);
                match self.loops.last_mut() {
                    Some(targets) => {
                        let target = if is_break {
                            &mut targets.break_
                        } else {
                            &mut targets.continue_
                        };
                        self.ir.jump(target);
                    }
                    None => {
                        let keyword = if is_break { "break" } else { "continue" };
                        self.emit_error(expr.span, format!("'{keyword}' outside of a loop"));
                    }
                }
                Ok(self.dead_value())
            }
        }
    }

    fn emit_literal(&mut self, expr: &Expr, lit: Lit) -> Result<DefId> {
        Ok(match lit {
            Lit::Bool(value) => self.ir.world.literal_bool(value),
            Lit::Int(value) => {
                let ty = self.value_ty(expr)?.unwrap_or(Ty::I32);
                self.ir.world.literal_int(ty, value)
            }
            Lit::Float(value) => {
                let ty = self.value_ty(expr)?.unwrap_or(Ty::F64);
                self.ir.world.literal(Literal::Float(value.to_bits()), ty)
            }
        })
    }

    /// Reports `target` unless it may be written. Marks assigned locals as
    /// written. Error-typed targets were reported when they were typed.
    fn check_assignable(&mut self, target: &Expr) -> bool {
        if self.is_error_typed(target) {
            return false;
        }
        if self.sema.is_lvalue(target) {
            return true;
        }
        self.emit_error(target.span, LowerError::NotAssignable.to_string());
        false
    }

    fn store(&mut self, expr: &Expr, var: &Var, value: DefId) {
        if let Err(err) = var.store(&mut self.ir, value) {
            self.emit_error(expr.span, err.to_string());
        }
    }

    /// Lowers `expr` to the storage it denotes. Expressions without a
    /// location yield their value.
    pub(crate) fn lemit(&mut self, expr: &Expr) -> Result<Var> {
        if !self.ir.is_reachable() || self.is_error_typed(expr) {
            return Ok(Var::Rvalue(self.dead_value()));
        }
        match &expr.kind {
            ExprKind::Path(path) => {
                let module = self.module;
                match module.decls.get(path.decl) {
                    Some(decl) if decl.is_local() => self.var(path.decl),
                    _ => Ok(Var::Rvalue(self.remit(expr)?)),
                }
            }
            ExprKind::Field(field) => {
                let index = self.ir.world.literal_int(Ty::U32, field.index as i128);
                let base = self.aggregate_base(&field.base)?;
                Ok(Var::Element {
                    base: Box::new(base),
                    index,
                })
            }
            ExprKind::Map(map) if !self.is_fn_typed(map.lhs.ty) => {
                let [arg] = map.args.as_slice() else {
                    self.emit_error(expr.span, "indexing takes exactly one index");
                    return Ok(Var::Rvalue(self.dead_value()));
                };
                let base = self.aggregate_base(&map.lhs)?;
                let index = self.remit(arg)?;
                Ok(Var::Element {
                    base: Box::new(base),
                    index,
                })
            }
            ExprKind::Prefix(prefix) if prefix.op == PrefixOp::Deref => {
                let ptr = self.remit(&prefix.operand)?;
                Ok(Var::Address { ptr })
            }
            ExprKind::Cast(cast) if cast.src.ty == expr.ty => self.lemit(&cast.src),
            _ => Ok(Var::Rvalue(self.remit(expr)?)),
        }
    }

    /// Storage of an aggregate being projected; pointers are dereferenced
    /// implicitly.
    fn aggregate_base(&mut self, base: &Expr) -> Result<Var> {
        if base.ty.is_some_and(|ty| self.module.types.is_ptr(ty)) {
            let ptr = self.remit(base)?;
            return Ok(Var::Address { ptr });
        }
        self.lemit(base)
    }

    /// Calls return through a fresh continuation; calls to continuations
    /// never return and end the current block.
    fn emit_call(&mut self, expr: &Expr, map: &ExprMap) -> Result<DefId> {
        let callee = self.remit(&map.lhs)?;
        let mut args = Vec::with_capacity(map.args.len());
        for arg in &map.args {
            args.push(self.remit(arg)?);
        }
        let returns = map
            .lhs
            .ty
            .is_some_and(|ty| self.module.types.ret_fn_type(ty).is_some());
        if !returns {
            self.ir.tail_call(callee, args);
            return Ok(self.dead_value());
        }
        let results: Vec<Ty> = self.value_ty(expr)?.into_iter().collect();
        let defs = self.ir.mem_call(callee, args, &results);
        match defs.first() {
            Some(def) => Ok(*def),
            None => Ok(self.unit_value()),
        }
    }

    fn emit_infix(&mut self, expr: &Expr, infix: &ExprInfix) -> Result<DefId> {
        if infix.op.is_short_circuit() {
            return self.emit_short_circuit(infix);
        }
        if infix.op.is_assign() {
            if !self.check_assignable(&infix.lhs) {
                return Ok(self.unit_value());
            }
            let var = self.lemit(&infix.lhs)?;
            let mut value = self.remit(&infix.rhs)?;
            if let Some(op) = infix.op.separate_assign().and_then(binop) {
                let old = var.load(&mut self.ir);
                value = self.ir.world.binop(op, old, value);
            }
            self.store(expr, &var, value);
            return Ok(self.unit_value());
        }
        let lhs = self.remit(&infix.lhs)?;
        let rhs = self.remit(&infix.rhs)?;
        match binop(infix.op) {
            Some(op) => Ok(self.ir.world.binop(op, lhs, rhs)),
            None => {
                self.emit_error(expr.span, format!("unsupported operator '{}'", infix.op));
                Ok(self.dead_value())
            }
        }
    }

    /// `a && b` / `a || b`: only the branch that needs `b` evaluates it;
    /// both sides meet at an exit target that merges the result.
    fn emit_short_circuit(&mut self, infix: &ExprInfix) -> Result<DefId> {
        let is_or = infix.op == InfixOp::OrOr;
        let (mut t, mut f, mut x) = if is_or {
            (
                JumpTarget::new("l_or_true"),
                JumpTarget::new("l_or_false"),
                JumpTarget::new("l_or_exit"),
            )
        } else {
            (
                JumpTarget::new("l_and_true"),
                JumpTarget::new("l_and_false"),
                JumpTarget::new("l_and_exit"),
            )
        };
        let result = self.ir.new_temp();
        self.emit_branch(&infix.lhs, &mut t, &mut f)?;

        if self.ir.enter(&mut t).is_some() {
            let value = if is_or {
                self.ir.world.literal_bool(true)
            } else {
                self.remit(&infix.rhs)?
            };
            self.ir.set_value(result, value);
            self.ir.jump(&mut x);
        }
        if self.ir.enter(&mut f).is_some() {
            let value = if is_or {
                self.remit(&infix.rhs)?
            } else {
                self.ir.world.literal_bool(false)
            };
            self.ir.set_value(result, value);
            self.ir.jump(&mut x);
        }
        if self.ir.enter(&mut x).is_some() {
            let name = if is_or { "l_or" } else { "l_and" };
            return Ok(self.ir.get_value(result, &Ty::Bool, name));
        }
        Ok(self.dead_value())
    }

    /// Lowers a condition straight into control flow. Negation swaps the
    /// targets and connectives branch again instead of building a value.
    pub(crate) fn emit_branch(
        &mut self,
        cond: &Expr,
        t: &mut JumpTarget,
        f: &mut JumpTarget,
    ) -> Result<()> {
        match &cond.kind {
            ExprKind::Prefix(prefix) if prefix.op == PrefixOp::Not && self.is_bool(&prefix.operand) => {
                self.emit_branch(&prefix.operand, f, t)
            }
            ExprKind::Infix(infix) if infix.op.is_short_circuit() => {
                let is_or = infix.op == InfixOp::OrOr;
                let mut extra = JumpTarget::new(if is_or { "l_or_extra" } else { "l_and_extra" });
                if is_or {
                    self.emit_branch(&infix.lhs, t, &mut extra)?;
                } else {
                    self.emit_branch(&infix.lhs, &mut extra, f)?;
                }
                if self.ir.enter(&mut extra).is_some() {
                    self.emit_branch(&infix.rhs, t, f)?;
                }
                Ok(())
            }
            _ => {
                let value = self.remit(cond)?;
                self.ir.branch(value, t, f);
                Ok(())
            }
        }
    }

    fn is_bool(&self, expr: &Expr) -> bool {
        expr.ty.is_some_and(|ty| self.module.types.is_bool(ty))
    }

    fn emit_if(&mut self, expr: &Expr, if_: &ExprIf) -> Result<DefId> {
        let mut t = JumpTarget::new("if_then");
        let mut f = JumpTarget::new("if_else");
        let mut x = JumpTarget::new("next");
        let result_ty = self.value_ty(expr)?;
        let result = self.ir.new_temp();

        self.emit_branch(&if_.cond, &mut t, &mut f)?;

        if self.ir.enter(&mut t).is_some() {
            let value = self.remit(&if_.then)?;
            self.ir.set_value(result, value);
            self.ir.jump(&mut x);
        }
        if self.ir.enter(&mut f).is_some() {
            let value = match &if_.else_ {
                Some(else_) => self.remit(else_)?,
                None => self.unit_value(),
            };
            self.ir.set_value(result, value);
            self.ir.jump(&mut x);
        }
        if self.ir.enter(&mut x).is_none() {
            return Ok(self.dead_value());
        }
        match result_ty {
            Some(ty) => Ok(self.ir.get_value(result, &ty, "if")),
            None => Ok(self.unit_value()),
        }
    }

    /// Runs `body` with `targets` as the innermost `break`/`continue`
    /// destinations and hands them back afterwards.
    fn in_loop<T>(
        &mut self,
        targets: LoopTargets,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> (Result<T>, LoopTargets) {
        let depth = self.loops.len();
        self.loops.push(targets);
        let result = body(self);
        let targets = self.loops.swap_remove(depth);
        self.loops.truncate(depth);
        (result, targets)
    }

    fn emit_while(&mut self, while_: &ExprWhile) -> Result<DefId> {
        let mut head = JumpTarget::new("while_head");
        let mut body = JumpTarget::new("while_body");
        let mut exit = JumpTarget::new("while_exit");

        self.ir.jump(&mut head);
        if self.ir.enter_unsealed(&mut head).is_none() {
            return Ok(self.dead_value());
        }
        self.emit_branch(&while_.cond, &mut body, &mut exit)?;

        let targets = LoopTargets {
            break_: exit,
            continue_: head,
        };
        let (result, targets) = self.in_loop(targets, |cg| {
            if cg.ir.enter(&mut body).is_some() {
                cg.remit(&while_.body)?;
            }
            Ok(())
        });
        result?;
        let LoopTargets {
            break_: mut exit,
            continue_: mut head,
        } = targets;

        self.ir.jump(&mut head);
        self.ir.seal_target(&head);
        trace!(head = ?head.cont(), "while loop closed");
        self.ir.enter(&mut exit);
        Ok(self.unit_value())
    }

    fn emit_for(&mut self, for_: &ExprFor) -> Result<DefId> {
        if let Some(init) = &for_.init {
            self.emit_stmt(init)?;
            if !self.ir.is_reachable() {
                return Ok(self.dead_value());
            }
        }
        let mut head = JumpTarget::new("for_head");
        let mut body = JumpTarget::new("for_body");
        let mut exit = JumpTarget::new("for_exit");

        self.ir.jump(&mut head);
        if self.ir.enter_unsealed(&mut head).is_none() {
            return Ok(self.dead_value());
        }
        match &for_.cond {
            Some(cond) => self.emit_branch(cond, &mut body, &mut exit)?,
            None => self.ir.jump(&mut body),
        }

        let targets = LoopTargets {
            break_: exit,
            continue_: JumpTarget::new("for_step"),
        };
        let (result, targets) = self.in_loop(targets, |cg| {
            if cg.ir.enter(&mut body).is_some() {
                cg.remit(&for_.body)?;
            }
            Ok(())
        });
        result?;
        let LoopTargets {
            break_: mut exit,
            continue_: mut step,
        } = targets;

        self.ir.jump(&mut step);
        if self.ir.enter(&mut step).is_some() {
            if let Some(step) = &for_.step {
                self.remit(step)?;
            }
            self.ir.jump(&mut head);
        }
        self.ir.seal_target(&head);
        self.ir.enter(&mut exit);
        Ok(self.unit_value())
    }

    fn emit_block(&mut self, block: &ExprBlock) -> Result<DefId> {
        for stmt in &block.stmts {
            if !self.ir.is_reachable() {
                trace!("skipping unreachable statements");
                break;
            }
            self.emit_stmt(stmt)?;
        }
        match &block.expr {
            Some(expr) => self.remit(expr),
            None => Ok(self.unit_value()),
        }
    }
}
