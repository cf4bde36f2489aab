//! Continuation builder with deferred jump targets and on-the-fly SSA.
//!
//! Values that flow across blocks are tracked per block under a [`Handle`]
//! and turned into continuation parameters lazily when a read reaches a
//! join. Blocks whose predecessor set is still open are *unsealed*; reads
//! there create placeholder parameters that are completed on sealing.

use std::collections::HashMap;

use imp_core::ir::{ContId, DefId, Literal, Ty, World};
use imp_core::DeclId;
use tracing::{trace, warn};

/// Key under which a block tracks a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// The memory token.
    Mem,
    /// A local kept in registers.
    Decl(DeclId),
    /// A value merged at a join, e.g. the result of an `if`.
    Temp(u32),
}

#[derive(Debug, Default)]
struct BlockState {
    values: HashMap<Handle, DefId>,
    preds: Vec<ContId>,
    sealed: bool,
    incomplete: Vec<(Handle, DefId)>,
}

/// A control-flow merge point that is materialized only when needed.
///
/// The first predecessor becomes the target itself (`first`): entering the
/// target then simply continues in that block. A second predecessor splits
/// it off into a fresh block both jump to.
#[derive(Debug, Clone)]
pub struct JumpTarget {
    name: String,
    cont: Option<ContId>,
    first: bool,
}

impl JumpTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cont: None,
            first: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The block the target currently resolves to, if anything jumped to it.
    pub fn cont(&self) -> Option<ContId> {
        self.cont
    }
}

pub struct IrBuilder<'w> {
    pub world: &'w mut World,
    cur_bb: Option<ContId>,
    cur_fn: Option<ContId>,
    blocks: HashMap<ContId, BlockState>,
    next_temp: u32,
}

impl<'w> IrBuilder<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self {
            world,
            cur_bb: None,
            cur_fn: None,
            blocks: HashMap::new(),
            next_temp: 0,
        }
    }

    pub fn cur_bb(&self) -> Option<ContId> {
        self.cur_bb
    }

    pub fn set_cur_bb(&mut self, bb: Option<ContId>) {
        self.cur_bb = bb;
    }

    /// The function whose body is being emitted.
    pub fn cur_fn(&self) -> Option<ContId> {
        self.cur_fn
    }

    pub fn set_cur_fn(&mut self, cont: Option<ContId>) {
        self.cur_fn = cont;
    }

    pub fn is_reachable(&self) -> bool {
        self.cur_bb.is_some()
    }

    pub fn new_temp(&mut self) -> Handle {
        self.next_temp += 1;
        Handle::Temp(self.next_temp)
    }

    fn block(&mut self, bb: ContId) -> &mut BlockState {
        self.blocks.entry(bb).or_default()
    }

    fn add_pred(&mut self, bb: ContId, pred: ContId) {
        self.block(bb).preds.push(pred);
    }

    pub fn preds(&self, bb: ContId) -> &[ContId] {
        self.blocks
            .get(&bb)
            .map(|state| state.preds.as_slice())
            .unwrap_or(&[])
    }

    /// Starts emitting into a function continuation. It has no predecessors
    /// inside the function and is sealed right away.
    pub fn enter_function(&mut self, cont: ContId) {
        self.block(cont).sealed = true;
        self.cur_bb = Some(cont);
        self.cur_fn = Some(cont);
    }

    fn basicblock(&mut self, name: &str) -> ContId {
        let bb = self.world.basicblock(name);
        self.world.set_parent(bb, self.cur_fn);
        self.blocks.insert(bb, BlockState::default());
        bb
    }

    // ------------------------------------------------------------------
    // values
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, handle: Handle, def: DefId) {
        if let Some(bb) = self.cur_bb {
            self.block(bb).values.insert(handle, def);
        }
    }

    pub fn get_value(&mut self, handle: Handle, ty: &Ty, name: &str) -> DefId {
        match self.cur_bb {
            Some(bb) => self.read(bb, handle, ty, name),
            None => self.world.bottom(ty.clone()),
        }
    }

    pub fn get_mem(&mut self) -> DefId {
        self.get_value(Handle::Mem, &Ty::Mem, "mem")
    }

    pub fn set_mem(&mut self, mem: DefId) {
        self.set_value(Handle::Mem, mem);
    }

    fn read(&mut self, bb: ContId, handle: Handle, ty: &Ty, name: &str) -> DefId {
        if let Some(def) = self.block(bb).values.get(&handle) {
            return *def;
        }
        let (sealed, preds) = {
            let state = self.block(bb);
            (state.sealed, state.preds.clone())
        };
        let def = if !sealed {
            let param = self.world.append_param(bb, ty.clone(), Some(name));
            trace!(?bb, ?handle, "incomplete param");
            self.block(bb).incomplete.push((handle, param));
            param
        } else {
            match preds.as_slice() {
                [] => {
                    warn!(?bb, ?handle, name, "reading undefined value");
                    self.world.bottom(ty.clone())
                }
                [pred] => self.read(*pred, handle, ty, name),
                _ => {
                    let param = self.world.append_param(bb, ty.clone(), Some(name));
                    self.block(bb).values.insert(handle, param);
                    self.fill_param(bb, handle, param, ty, name)
                }
            }
        };
        self.block(bb).values.insert(handle, def);
        def
    }

    /// Passes the value of `handle` from every predecessor into `param`,
    /// then drops the parameter again if it merges a single value.
    fn fill_param(&mut self, bb: ContId, handle: Handle, param: DefId, ty: &Ty, name: &str) -> DefId {
        trace!(?bb, ?handle, "fill param");
        let preds = self.block(bb).preds.clone();
        let mut incoming = Vec::with_capacity(preds.len());
        for pred in preds {
            let value = self.read(pred, handle, ty, name);
            self.world.push_jump_arg(pred, value);
            incoming.push(value);
        }
        self.try_remove_trivial(bb, param, &incoming, ty)
    }

    fn try_remove_trivial(&mut self, bb: ContId, param: DefId, incoming: &[DefId], ty: &Ty) -> DefId {
        let mut same = None;
        for value in incoming {
            if *value == param || Some(*value) == same {
                continue;
            }
            if same.is_some() {
                return param;
            }
            same = Some(*value);
        }
        let replacement = match same {
            Some(value) => value,
            None => self.world.bottom(ty.clone()),
        };
        let Some(index) = self.world.params(bb).iter().position(|p| *p == param) else {
            return param;
        };
        trace!(?bb, ?param, ?replacement, "remove trivial param");
        self.world.replace_all_uses(param, replacement);
        self.world.remove_param(bb, index);
        for state in self.blocks.values_mut() {
            for value in state.values.values_mut() {
                if *value == param {
                    *value = replacement;
                }
            }
            for (_, value) in state.incomplete.iter_mut() {
                if *value == param {
                    *value = replacement;
                }
            }
        }
        replacement
    }

    pub fn seal(&mut self, bb: ContId) {
        let state = self.block(bb);
        if state.sealed {
            return;
        }
        state.sealed = true;
        let incomplete = std::mem::take(&mut state.incomplete);
        for (handle, param) in incomplete {
            if self.world.params(bb).contains(&param) {
                let ty = self.world.ty(param).clone();
                let name = self.world.def(param).name.clone().unwrap_or_default();
                self.fill_param(bb, handle, param, &ty, &name);
            }
        }
    }

    // ------------------------------------------------------------------
    // control flow
    // ------------------------------------------------------------------

    fn untangle(&mut self, target: &mut JumpTarget) -> Option<ContId> {
        let cont = target.cont?;
        if !target.first {
            return Some(cont);
        }
        let bb = self.basicblock(&target.name);
        let dest = self.world.cont(bb).def;
        self.world.jump(cont, dest, Vec::new());
        self.add_pred(bb, cont);
        target.first = false;
        target.cont = Some(bb);
        Some(bb)
    }

    fn jump_from(&mut self, from: ContId, target: &mut JumpTarget) {
        match self.untangle(target) {
            None => {
                target.cont = Some(from);
                target.first = true;
            }
            Some(dest) => {
                let callee = self.world.cont(dest).def;
                self.world.jump(from, callee, Vec::new());
                self.add_pred(dest, from);
            }
        }
    }

    /// Ends the current block with a jump to `target`.
    pub fn jump(&mut self, target: &mut JumpTarget) {
        if let Some(bb) = self.cur_bb.take() {
            self.jump_from(bb, target);
        }
    }

    /// A fresh single-predecessor block that forwards to `target`; branch
    /// edges always go through one so joins only see plain jumps.
    fn branch_to(&mut self, target: &mut JumpTarget) -> ContId {
        let name = match target.cont {
            Some(_) => format!("{}_crit", target.name),
            None => target.name.clone(),
        };
        let bb = self.basicblock(&name);
        self.jump_from(bb, target);
        bb
    }

    /// Ends the current block with a two-way branch. A literal condition
    /// becomes a plain jump and leaves the other target without an edge.
    pub fn branch(&mut self, cond: DefId, t: &mut JumpTarget, f: &mut JumpTarget) {
        let Some(bb) = self.cur_bb else {
            return;
        };
        if let Some(&Literal::Bool(value)) = self.world.as_literal(cond) {
            let taken = if value { t } else { f };
            self.jump(taken);
            return;
        }
        let tl = self.branch_to(t);
        let fl = self.branch_to(f);
        self.world.branch(bb, cond, tl, fl);
        for succ in [tl, fl] {
            self.add_pred(succ, bb);
            self.seal(succ);
        }
        self.cur_bb = None;
    }

    /// Continues emitting at `target`, sealing it when it was split off
    /// into its own block. Returns `None` when nothing reaches the target.
    pub fn enter(&mut self, target: &mut JumpTarget) -> Option<ContId> {
        if let Some(cont) = target.cont {
            if !target.first {
                self.seal(cont);
            }
        }
        self.cur_bb = target.cont;
        self.cur_bb
    }

    /// Like [`IrBuilder::enter`] but leaves the block open for predecessors
    /// that are not emitted yet, such as a loop's back edge. Returns `None`
    /// and stays dead when nothing jumped to the target.
    pub fn enter_unsealed(&mut self, target: &mut JumpTarget) -> Option<ContId> {
        let bb = self.untangle(target)?;
        self.cur_bb = Some(bb);
        Some(bb)
    }

    pub fn seal_target(&mut self, target: &JumpTarget) {
        if let Some(cont) = target.cont {
            self.seal(cont);
        }
    }

    /// Calls `callee` with the current memory token and a return
    /// continuation; emission resumes inside that continuation with the
    /// token it receives. Returns the call's results.
    pub fn mem_call(&mut self, callee: DefId, args: Vec<DefId>, results: &[Ty]) -> Vec<DefId> {
        let Some(bb) = self.cur_bb else {
            return results.iter().map(|ty| self.world.bottom(ty.clone())).collect();
        };
        let mem = self.get_mem();
        let mut params = vec![Ty::Mem];
        params.extend(results.iter().cloned());
        let name = format!("{}_cont", self.world.cont(bb).name);
        let next = self.world.return_continuation(&params, &name);
        self.world.set_parent(next, self.cur_fn);

        let mut call_args = Vec::with_capacity(args.len() + 2);
        call_args.push(mem);
        call_args.extend(args);
        call_args.push(self.world.cont(next).def);
        self.world.jump(bb, callee, call_args);

        self.blocks.insert(
            next,
            BlockState {
                preds: vec![bb],
                sealed: true,
                ..BlockState::default()
            },
        );
        self.cur_bb = Some(next);
        let params = self.world.params(next).to_vec();
        self.set_mem(params[0]);
        params[1..].to_vec()
    }

    /// Jumps to `callee` with the current memory token prepended. Control
    /// does not come back, so the current point becomes unreachable.
    pub fn tail_call(&mut self, callee: DefId, args: Vec<DefId>) {
        let Some(bb) = self.cur_bb else {
            return;
        };
        let mem = self.get_mem();
        let mut call_args = vec![mem];
        call_args.extend(args);
        self.world.jump(bb, callee, call_args);
        self.cur_bb = None;
    }

    /// Terminates the current block with a trap.
    pub fn trap(&mut self) {
        if let Some(bb) = self.cur_bb.take() {
            self.world.trap(bb);
        }
    }
}
