//! AST → continuation IR.
//!
//! Expressions lower either to a value (`remit`) or to a [`Var`] describing
//! their storage (`lemit`). Control flow goes through [`JumpTarget`]s; once
//! the current block has been terminated the builder has no insertion point
//! and emission becomes a no-op until a reachable target is entered.

mod expr;
mod stmt;

use std::collections::{HashMap, HashSet};

use imp_ast::{FnDecl, Item, ItemKind, Module, Sema};
use imp_core::diagnostics::{Diagnostic, DiagnosticManager};
use imp_core::ir::{Attribute, ContId, DefId, Ty, World};
use imp_core::span::Span;
use imp_core::{DeclId, Symbol};
use itertools::Itertools;
use tracing::{debug, trace};

use crate::builder::{IrBuilder, JumpTarget};
use crate::builtins::{self, BuiltinEffect};
use crate::error::{LowerError, Result};
use crate::options::LowerOptions;
use crate::ty::TypeLowering;
use crate::var::Var;

const DIAGNOSTIC_CONTEXT: &str = "ast→ir";

/// Result of lowering one module.
#[derive(Debug)]
pub struct LowerOutcome {
    pub success: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Storage chosen for every local that was lowered.
    pub storage: HashMap<DeclId, Var>,
    /// The continuation of every function that got a head.
    pub functions: HashMap<DeclId, ContId>,
}

impl LowerOutcome {
    pub fn into_result(self) -> imp_core::Result<Self> {
        if self.success {
            return Ok(self);
        }
        let messages = self
            .diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.as_str())
            .join("; ");
        Err(imp_core::Error::Generic(messages))
    }
}

struct FnCtx {
    frame: DefId,
    ret_param: Option<DefId>,
}

struct LoopTargets {
    break_: JumpTarget,
    continue_: JumpTarget,
}

pub struct CodeGen<'a, 'w> {
    ir: IrBuilder<'w>,
    module: &'a Module,
    sema: Sema<'a>,
    types: TypeLowering<'a>,
    options: LowerOptions,
    diagnostics: DiagnosticManager,
    success: bool,
    functions: HashMap<DeclId, ContId>,
    failed_heads: HashSet<DeclId>,
    storage: HashMap<DeclId, Var>,
    fn_ctx: Option<FnCtx>,
    loops: Vec<LoopTargets>,
    next_slot: u32,
    dead_value: Option<DefId>,
}

impl<'a, 'w> CodeGen<'a, 'w> {
    pub fn new(world: &'w mut World, module: &'a Module) -> Self {
        Self::with_options(world, module, LowerOptions::default())
    }

    pub fn with_options(world: &'w mut World, module: &'a Module, options: LowerOptions) -> Self {
        Self {
            ir: IrBuilder::new(world),
            module,
            sema: Sema::new(&module.decls, &module.types),
            types: TypeLowering::new(&module.types, module.struct_fields()),
            options,
            diagnostics: DiagnosticManager::new(),
            success: true,
            functions: HashMap::new(),
            failed_heads: HashSet::new(),
            storage: HashMap::new(),
            fn_ctx: None,
            loops: Vec::new(),
            next_slot: 0,
            dead_value: None,
        }
    }

    /// Lowers every item: all function heads first so that bodies can refer
    /// to functions declared later, then the bodies.
    pub fn lower_module(&mut self) {
        if self.options.verify_types {
            self.module.types.verify();
        }
        let module = self.module;
        for item in &module.items {
            match &item.kind {
                ItemKind::Fn(f) => self.declare_fn(f.decl),
                ItemKind::ForeignMod(foreign) => {
                    for decl in &foreign.fns {
                        self.declare_fn(*decl);
                        if let Some(cont) = self.functions.get(decl) {
                            self.ir.world.set_attribute(*cont, Attribute::Extern);
                        }
                    }
                }
                _ => {}
            }
        }
        for item in &module.items {
            self.lower_item(item);
        }
    }

    pub fn finish(self) -> LowerOutcome {
        LowerOutcome {
            success: self.success,
            diagnostics: self.diagnostics.into_diagnostics(),
            storage: self.storage,
            functions: self.functions,
        }
    }

    pub(crate) fn lower_item(&mut self, item: &Item) {
        match &item.kind {
            ItemKind::Fn(f) => self.lower_fn(f),
            ItemKind::Struct(_)
            | ItemKind::Trait(_)
            | ItemKind::Impl(_)
            | ItemKind::Mod(_)
            | ItemKind::ForeignMod(_)
            | ItemKind::Static(_)
            | ItemKind::Typedef(_) => trace!(?item.span, "item has no IR"),
        }
    }

    // ------------------------------------------------------------------
    // diagnostics
    // ------------------------------------------------------------------

    pub(crate) fn emit_error(&mut self, span: Span, message: impl Into<String>) {
        self.success = false;
        self.diagnostics.add_diagnostic(
            Diagnostic::error(message.into())
                .with_source_context(DIAGNOSTIC_CONTEXT)
                .with_span(span),
        );
    }

    fn fn_error(&mut self, decl: DeclId, err: LowerError) {
        let (name, span) = match self.module.decls.get(decl) {
            Some(d) => (d.name.clone(), d.span),
            None => (Symbol::new(decl.to_string()), Span::null()),
        };
        let error = imp_core::Error::lowering(decl, name, span, err.to_string());
        self.emit_error(span, error.to_string());
    }

    // ------------------------------------------------------------------
    // functions
    // ------------------------------------------------------------------

    fn declare_fn(&mut self, decl: DeclId) {
        if let Err(err) = self.fn_head(decl) {
            if self.failed_heads.insert(decl) {
                self.fn_error(decl, err);
            }
        }
    }

    /// The continuation of function `decl`, created on first use.
    pub(crate) fn fn_head(&mut self, decl_id: DeclId) -> Result<ContId> {
        if let Some(cont) = self.functions.get(&decl_id) {
            return Ok(*cont);
        }
        let module = self.module;
        let decl = module
            .decls
            .get(decl_id)
            .ok_or(LowerError::UnknownDecl(decl_id))?;
        let ty = decl
            .ty
            .ok_or_else(|| LowerError::Unresolved(decl.name.to_string()))?;
        let fn_ty = self.types.lower(ty)?;
        let cont = self.ir.world.continuation(&fn_ty, decl.name.as_str());

        match builtins::lookup(decl.name.as_str()) {
            Some(BuiltinEffect::Entry) => {
                let name = format!("{}{}", decl.name, self.options.entry_suffix);
                self.ir.world.rename(cont, name);
                self.ir.world.set_attribute(cont, Attribute::Extern);
            }
            Some(BuiltinEffect::Attributes(attributes)) => {
                for attribute in attributes {
                    self.ir.world.set_attribute(cont, *attribute);
                }
            }
            None => {}
        }

        self.functions.insert(decl_id, cont);
        Ok(cont)
    }

    fn lower_fn(&mut self, f: &FnDecl) {
        let cont = match self.fn_head(f.decl) {
            Ok(cont) => cont,
            Err(err) => {
                if self.failed_heads.insert(f.decl) {
                    self.fn_error(f.decl, err);
                }
                return;
            }
        };
        if f.is_extern {
            self.ir.world.set_attribute(cont, Attribute::Extern);
        }

        let saved_bb = self.ir.cur_bb();
        let saved_fn = self.ir.cur_fn();
        let saved_ctx = self.fn_ctx.take();
        let saved_loops = std::mem::take(&mut self.loops);
        self.ir.world.set_parent(cont, saved_fn);

        debug!(name = %self.ir.world.cont(cont).name, "lowering function");
        if let Err(err) = self.lower_fn_body(f, cont) {
            self.ir.trap();
            self.fn_error(f.decl, err);
        }

        self.ir.set_cur_bb(saved_bb);
        self.ir.set_cur_fn(saved_fn);
        self.fn_ctx = saved_ctx;
        self.loops = saved_loops;
    }

    fn lower_fn_body(&mut self, f: &FnDecl, cont: ContId) -> Result<()> {
        let module = self.module;
        let decl = module
            .decls
            .get(f.decl)
            .ok_or(LowerError::UnknownDecl(f.decl))?;
        let fn_ty = decl
            .ty
            .ok_or_else(|| LowerError::Unresolved(decl.name.to_string()))?;
        let types = &module.types;

        self.ir.enter_function(cont);
        let mem = self.ir.world.param(cont, 0);
        self.ir.world.set_name(mem, "mem");
        self.ir.set_mem(mem);
        let frame = self.ir.world.enter(mem);

        let ret_param = types
            .ret_fn_type(fn_ty)
            .and_then(|_| self.ir.world.params(cont).last().copied());
        self.fn_ctx = Some(FnCtx { frame, ret_param });

        self.sema.collect_address_taken(&f.body);
        for (idx, param) in f.params.iter().enumerate() {
            let def = self.ir.world.param(cont, idx + 1);
            if let Some(p) = module.decls.get(*param) {
                self.ir.world.set_name(def, p.name.as_str());
            }
            let var = self.var(*param)?;
            var.store(&mut self.ir, def)?;
        }

        let value = self.remit(&f.body)?;
        if !self.ir.is_reachable() {
            return Ok(());
        }
        let Some(ret) = ret_param else {
            return Err(LowerError::MissingCall(decl.name.clone()));
        };
        match types.return_type(fn_ty) {
            None => self.ir.tail_call(ret, Vec::new()),
            Some(_) => {
                let body_is_unit = f.body.ty.is_some_and(|ty| types.is_unit(ty));
                if body_is_unit {
                    return Err(LowerError::MissingReturn(decl.name.clone()));
                }
                self.ir.tail_call(ret, vec![value]);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // storage
    // ------------------------------------------------------------------

    /// Storage for a local, created once on first use: a frame slot when
    /// its address is taken, an SSA value otherwise.
    pub(crate) fn var(&mut self, decl_id: DeclId) -> Result<Var> {
        if let Some(var) = self.storage.get(&decl_id) {
            return Ok(var.clone());
        }
        let module = self.module;
        let decl = module
            .decls
            .get(decl_id)
            .ok_or(LowerError::UnknownDecl(decl_id))?;
        let ty = decl
            .ty
            .ok_or_else(|| LowerError::Unresolved(decl.name.to_string()))?;
        let ty = self.types.lower(ty)?;
        let name = decl.name.to_string();

        let var = match (&self.fn_ctx, decl.is_address_taken()) {
            (Some(ctx), true) => {
                let handle = self.next_slot;
                self.next_slot += 1;
                let ptr = self.ir.world.slot(ty, ctx.frame, handle, &name);
                Var::Address { ptr }
            }
            _ => Var::Value {
                handle: crate::builder::Handle::Decl(decl_id),
                ty,
                name,
            },
        };
        self.storage.insert(decl_id, var.clone());
        Ok(var)
    }

    /// Placeholder for values of code that can never run.
    pub(crate) fn dead_value(&mut self) -> DefId {
        match self.dead_value {
            Some(def) => def,
            None => {
                let def = self.ir.world.bottom(Ty::Bottom);
                self.dead_value = Some(def);
                def
            }
        }
    }

    pub(crate) fn unit_value(&mut self) -> DefId {
        self.ir.world.tuple(Vec::new())
    }
}

/// Lowers `module` into `world` and reports whether it succeeded.
pub fn lower_module(world: &mut World, module: &Module) -> bool {
    lower_module_with(world, module, LowerOptions::default()).success
}

pub fn lower_module_with(world: &mut World, module: &Module, options: LowerOptions) -> LowerOutcome {
    let mut cg = CodeGen::with_options(world, module, options);
    cg.lower_module();
    cg.finish()
}
