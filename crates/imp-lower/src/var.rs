use imp_core::ir::{DefId, Ty};
use tracing::warn;

use crate::builder::{Handle, IrBuilder};
use crate::error::{LowerError, Result};

/// Storage behind an lvalue, or the value of an rvalue.
#[derive(Debug, Clone, PartialEq)]
pub enum Var {
    /// SSA value tracked by the builder under `handle`.
    Value { handle: Handle, ty: Ty, name: String },
    /// Addressable memory; every access threads the memory token.
    Address { ptr: DefId },
    /// An element of an aggregate stored in `base`.
    Element { base: Box<Var>, index: DefId },
    /// A computed value with no location behind it.
    Rvalue(DefId),
}

impl Var {
    pub fn load(&self, ir: &mut IrBuilder<'_>) -> DefId {
        match self {
            Var::Value { handle, ty, name } => ir.get_value(*handle, ty, name),
            Var::Address { ptr } => {
                let mem = ir.get_mem();
                let loaded = ir.world.load(mem, *ptr);
                let mem = ir.world.extract_at(loaded, 0);
                ir.set_mem(mem);
                ir.world.extract_at(loaded, 1)
            }
            Var::Element { base, index } => match base.as_ref() {
                Var::Address { ptr } => {
                    let ptr = ir.world.lea(*ptr, *index);
                    Var::Address { ptr }.load(ir)
                }
                base => {
                    let aggregate = base.load(ir);
                    ir.world.extract(aggregate, *index)
                }
            },
            Var::Rvalue(def) => *def,
        }
    }

    pub fn store(&self, ir: &mut IrBuilder<'_>, value: DefId) -> Result<()> {
        match self {
            Var::Value { handle, .. } => ir.set_value(*handle, value),
            Var::Address { ptr } => {
                let mem = ir.get_mem();
                let mem = ir.world.store(mem, *ptr, value);
                ir.set_mem(mem);
            }
            Var::Element { base, index } => match base.as_ref() {
                Var::Address { ptr } => {
                    let ptr = ir.world.lea(*ptr, *index);
                    Var::Address { ptr }.store(ir, value)?;
                }
                base => {
                    let aggregate = base.load(ir);
                    let updated = ir.world.insert(aggregate, *index, value);
                    base.store(ir, updated)?;
                }
            },
            Var::Rvalue(_) => {
                warn!(var = ?self, "store to a value without storage");
                return Err(LowerError::NotAssignable);
            }
        }
        Ok(())
    }

    /// The address of the storage, if it lives in memory.
    pub fn address(&self, ir: &mut IrBuilder<'_>) -> Option<DefId> {
        match self {
            Var::Address { ptr } => Some(*ptr),
            Var::Element { base, index } => {
                let ptr = base.address(ir)?;
                Some(ir.world.lea(ptr, *index))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imp_core::ir::{DefKind, World};

    #[test]
    fn address_access_threads_the_memory_token() {
        let mut world = World::new();
        let f = world.continuation(&Ty::Fn(vec![Ty::Mem, Ty::Fn(vec![Ty::Mem])]), "f");
        let mem0 = world.param(f, 0);
        let mut ir = IrBuilder::new(&mut world);
        ir.enter_function(f);
        ir.set_mem(mem0);

        let frame = ir.world.enter(mem0);
        let slot = ir.world.slot(Ty::I32, frame, 0, "x");
        let var = Var::Address { ptr: slot };
        let five = ir.world.literal_int(Ty::I32, 5);
        var.store(&mut ir, five).expect("store");
        let after_store = ir.get_mem();
        let _ = var.load(&mut ir);
        let after_load = ir.get_mem();

        match &ir.world.def(after_store).kind {
            DefKind::Store { mem, .. } => assert_eq!(*mem, mem0),
            other => panic!("expected store, got {other:?}"),
        }
        match &ir.world.def(after_load).kind {
            DefKind::Extract { aggregate, .. } => assert!(matches!(
                ir.world.def(*aggregate).kind,
                DefKind::Load { mem, .. } if mem == after_store
            )),
            other => panic!("expected extract of load, got {other:?}"),
        }
    }

    #[test]
    fn storing_to_an_rvalue_is_rejected() {
        let mut world = World::new();
        let mut ir = IrBuilder::new(&mut world);
        let one = ir.world.literal_int(Ty::I32, 1);
        assert_eq!(
            Var::Rvalue(one).store(&mut ir, one),
            Err(LowerError::NotAssignable)
        );
    }
}
