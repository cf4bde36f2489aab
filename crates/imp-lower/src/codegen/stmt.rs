use imp_ast::Stmt;
use tracing::trace;

use super::CodeGen;
use crate::error::Result;

impl<'a, 'w> CodeGen<'a, 'w> {
    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Let(let_) => {
                let var = self.var(let_.local)?;
                if let Some(init) = &let_.init {
                    let value = self.remit(init)?;
                    if self.ir.world.def(value).name.is_none() {
                        if let Some(decl) = self.module.decls.get(let_.local) {
                            self.ir.world.set_name(value, decl.name.as_str());
                        }
                    }
                    if let Err(err) = var.store(&mut self.ir, value) {
                        self.emit_error(init.span, err.to_string());
                    }
                }
            }
            Stmt::Expr(expr) => {
                if self.sema.has_side_effect(expr) {
                    self.remit(expr)?;
                } else {
                    trace!(span = ?expr.span, "dropping expression without effect");
                }
            }
            Stmt::Item(item) => self.lower_item(item),
        }
        Ok(())
    }
}
