//! Backend IR: a graph of continuations and values.
//!
//! There are no mutable basic-block lists here. Control flow is expressed by
//! continuations that end in exactly one terminator (a jump carrying
//! arguments, a two-way branch, or a trap). Values form a graph; effects are
//! ordered by threading the `Mem` token through loads, stores and calls.

pub mod pretty;
pub mod ty;

pub use ty::Ty;

use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContId(pub u32);

impl DefId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ContId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int(i128),
    /// IEEE-754 bits, widened to 64 bits.
    Float(u64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    pub fn is_cmp(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }
}

/// Partial-evaluation markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EvalMarker {
    Run,
    Hlt,
}

/// Backend attributes attached to continuations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    Extern,
    Nvvm,
    Spir,
    ArrayInit,
    Vectorize,
    VectorizeTid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefKind {
    Literal(Literal),
    Bottom,
    Param { cont: ContId, index: usize },
    Continuation(ContId),
    BinOp { op: BinOp, lhs: DefId, rhs: DefId },
    Cast { value: DefId },
    Tuple(Vec<DefId>),
    Extract { aggregate: DefId, index: DefId },
    Insert { aggregate: DefId, index: DefId, value: DefId },
    /// Opens the addressable frame of a function.
    Enter { mem: DefId },
    Slot { frame: DefId, handle: u32 },
    Lea { ptr: DefId, index: DefId },
    /// Yields `(mem, value)`.
    Load { mem: DefId, ptr: DefId },
    /// Yields the next `mem`.
    Store { mem: DefId, ptr: DefId, value: DefId },
    Eval { marker: EvalMarker, value: DefId },
}

impl DefKind {
    pub fn operands(&self) -> Vec<DefId> {
        match self {
            DefKind::Literal(_)
            | DefKind::Bottom
            | DefKind::Param { .. }
            | DefKind::Continuation(_) => Vec::new(),
            DefKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            DefKind::Cast { value } => vec![*value],
            DefKind::Tuple(elems) => elems.clone(),
            DefKind::Extract { aggregate, index } => vec![*aggregate, *index],
            DefKind::Insert {
                aggregate,
                index,
                value,
            } => vec![*aggregate, *index, *value],
            DefKind::Enter { mem } => vec![*mem],
            DefKind::Slot { frame, .. } => vec![*frame],
            DefKind::Lea { ptr, index } => vec![*ptr, *index],
            DefKind::Load { mem, ptr } => vec![*mem, *ptr],
            DefKind::Store { mem, ptr, value } => vec![*mem, *ptr, *value],
            DefKind::Eval { value, .. } => vec![*value],
        }
    }

    fn operands_mut(&mut self) -> Vec<&mut DefId> {
        match self {
            DefKind::Literal(_)
            | DefKind::Bottom
            | DefKind::Param { .. }
            | DefKind::Continuation(_) => Vec::new(),
            DefKind::BinOp { lhs, rhs, .. } => vec![lhs, rhs],
            DefKind::Cast { value } => vec![value],
            DefKind::Tuple(elems) => elems.iter_mut().collect(),
            DefKind::Extract { aggregate, index } => vec![aggregate, index],
            DefKind::Insert {
                aggregate,
                index,
                value,
            } => vec![aggregate, index, value],
            DefKind::Enter { mem } => vec![mem],
            DefKind::Slot { frame, .. } => vec![frame],
            DefKind::Lea { ptr, index } => vec![ptr, index],
            DefKind::Load { mem, ptr } => vec![mem, ptr],
            DefKind::Store { mem, ptr, value } => vec![mem, ptr, value],
            DefKind::Eval { value, .. } => vec![value],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Def {
    pub kind: DefKind,
    pub ty: Ty,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    Jump { callee: DefId, args: Vec<DefId> },
    Branch { cond: DefId, then_: ContId, else_: ContId },
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationKind {
    /// A top-level function: `(mem, params…, return continuation)`.
    Function,
    /// A join point inside a function; parameters are merged values.
    BasicBlock,
    /// The continuation a call returns into: `(mem, results…)`.
    Return,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    pub name: String,
    pub kind: ContinuationKind,
    pub params: Vec<DefId>,
    pub terminator: Option<Terminator>,
    pub attributes: BTreeSet<Attribute>,
    pub parent: Option<ContId>,
    /// The continuation as a first-class value.
    pub def: DefId,
}

impl Continuation {
    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    defs: Vec<Def>,
    continuations: Vec<Continuation>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn def(&self, id: DefId) -> &Def {
        &self.defs[id.index()]
    }

    pub fn defs(&self) -> impl Iterator<Item = (DefId, &Def)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(idx, def)| (DefId(idx as u32), def))
    }

    pub fn ty(&self, id: DefId) -> &Ty {
        &self.def(id).ty
    }

    pub fn cont(&self, id: ContId) -> &Continuation {
        &self.continuations[id.index()]
    }

    pub fn continuations(&self) -> impl Iterator<Item = (ContId, &Continuation)> {
        self.continuations
            .iter()
            .enumerate()
            .map(|(idx, cont)| (ContId(idx as u32), cont))
    }

    pub fn find_continuation(&self, name: &str) -> Option<ContId> {
        self.continuations()
            .find(|(_, cont)| cont.name == name)
            .map(|(id, _)| id)
    }

    pub fn as_continuation(&self, def: DefId) -> Option<ContId> {
        match self.def(def).kind {
            DefKind::Continuation(cont) => Some(cont),
            _ => None,
        }
    }

    pub fn as_literal(&self, def: DefId) -> Option<&Literal> {
        match &self.def(def).kind {
            DefKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    fn push_def(&mut self, kind: DefKind, ty: Ty) -> DefId {
        let id = DefId(self.defs.len() as u32);
        self.defs.push(Def {
            kind,
            ty,
            name: None,
        });
        id
    }

    pub fn set_name(&mut self, def: DefId, name: impl Into<String>) {
        self.defs[def.index()].name = Some(name.into());
    }

    // ------------------------------------------------------------------
    // continuations
    // ------------------------------------------------------------------

    fn new_continuation(&mut self, params: &[Ty], name: &str, kind: ContinuationKind) -> ContId {
        let id = ContId(self.continuations.len() as u32);
        let def = self.push_def(DefKind::Continuation(id), Ty::Fn(params.to_vec()));
        self.continuations.push(Continuation {
            name: name.to_string(),
            kind,
            params: Vec::new(),
            terminator: None,
            attributes: BTreeSet::new(),
            parent: None,
            def,
        });
        for (index, ty) in params.iter().enumerate() {
            let param = self.push_def(DefKind::Param { cont: id, index }, ty.clone());
            self.continuations[id.index()].params.push(param);
        }
        id
    }

    /// Creates a function continuation for the signature `fn_ty`.
    pub fn continuation(&mut self, fn_ty: &Ty, name: &str) -> ContId {
        let params = fn_ty.fn_params().map(<[Ty]>::to_vec).unwrap_or_default();
        self.new_continuation(&params, name, ContinuationKind::Function)
    }

    /// Creates the continuation a call returns into.
    pub fn return_continuation(&mut self, params: &[Ty], name: &str) -> ContId {
        self.new_continuation(params, name, ContinuationKind::Return)
    }

    pub fn basicblock(&mut self, name: &str) -> ContId {
        self.new_continuation(&[], name, ContinuationKind::BasicBlock)
    }

    pub fn param(&self, cont: ContId, index: usize) -> DefId {
        self.cont(cont).params[index]
    }

    pub fn params(&self, cont: ContId) -> &[DefId] {
        &self.cont(cont).params
    }

    fn refresh_signature(&mut self, cont: ContId) {
        let tys = self
            .cont(cont)
            .params
            .iter()
            .map(|p| self.ty(*p).clone())
            .collect();
        let def = self.cont(cont).def;
        self.defs[def.index()].ty = Ty::Fn(tys);
    }

    pub fn append_param(&mut self, cont: ContId, ty: Ty, name: Option<&str>) -> DefId {
        let index = self.cont(cont).params.len();
        let param = self.push_def(DefKind::Param { cont, index }, ty);
        if let Some(name) = name {
            self.set_name(param, name);
        }
        self.continuations[cont.index()].params.push(param);
        self.refresh_signature(cont);
        param
    }

    /// Drops parameter `index` of `cont` together with the matching argument
    /// of every jump into it.
    pub fn remove_param(&mut self, cont: ContId, index: usize) {
        self.continuations[cont.index()].params.remove(index);
        let remaining = self.cont(cont).params[index..].to_vec();
        for (offset, param) in remaining.into_iter().enumerate() {
            self.defs[param.index()].kind = DefKind::Param {
                cont,
                index: index + offset,
            };
        }
        self.refresh_signature(cont);

        let target = self.cont(cont).def;
        for other in &mut self.continuations {
            if let Some(Terminator::Jump { callee, args }) = &mut other.terminator {
                if *callee == target && index < args.len() {
                    args.remove(index);
                }
            }
        }
    }

    pub fn set_parent(&mut self, cont: ContId, parent: Option<ContId>) {
        self.continuations[cont.index()].parent = parent;
    }

    pub fn set_attribute(&mut self, cont: ContId, attribute: Attribute) {
        self.continuations[cont.index()].attributes.insert(attribute);
    }

    pub fn rename(&mut self, cont: ContId, name: impl Into<String>) {
        self.continuations[cont.index()].name = name.into();
    }

    pub fn jump(&mut self, from: ContId, callee: DefId, args: Vec<DefId>) {
        debug_assert!(self.cont(from).terminator.is_none());
        self.continuations[from.index()].terminator = Some(Terminator::Jump { callee, args });
    }

    pub fn branch(&mut self, from: ContId, cond: DefId, then_: ContId, else_: ContId) {
        debug_assert!(self.cont(from).terminator.is_none());
        self.continuations[from.index()].terminator =
            Some(Terminator::Branch { cond, then_, else_ });
    }

    pub fn trap(&mut self, from: ContId) {
        self.continuations[from.index()].terminator = Some(Terminator::Unreachable);
    }

    /// Appends an argument to the jump terminating `from`.
    pub fn push_jump_arg(&mut self, from: ContId, value: DefId) {
        if let Some(Terminator::Jump { args, .. }) =
            &mut self.continuations[from.index()].terminator
        {
            args.push(value);
        }
    }

    pub fn jump_args(&self, from: ContId) -> Option<&[DefId]> {
        match &self.cont(from).terminator {
            Some(Terminator::Jump { args, .. }) => Some(args),
            _ => None,
        }
    }

    /// Continuations control can flow to from `cont` without entering
    /// another function: branch targets, jumped-to blocks, and return
    /// continuations handed to a callee.
    pub fn successors(&self, cont: ContId) -> Vec<ContId> {
        let local = |def: &DefId| {
            self.as_continuation(*def)
                .filter(|c| self.cont(*c).kind != ContinuationKind::Function)
        };
        match &self.cont(cont).terminator {
            Some(Terminator::Branch { then_, else_, .. }) => vec![*then_, *else_],
            Some(Terminator::Jump { callee, args }) => std::iter::once(callee)
                .chain(args.iter())
                .filter_map(local)
                .collect(),
            Some(Terminator::Unreachable) | None => Vec::new(),
        }
    }

    /// Rewrites every use of `old` (operands and terminator arguments) to `new`.
    pub fn replace_all_uses(&mut self, old: DefId, new: DefId) {
        for def in &mut self.defs {
            for operand in def.kind.operands_mut() {
                if *operand == old {
                    *operand = new;
                }
            }
        }
        for cont in &mut self.continuations {
            match &mut cont.terminator {
                Some(Terminator::Jump { callee, args }) => {
                    if *callee == old {
                        *callee = new;
                    }
                    for arg in args.iter_mut().filter(|arg| **arg == old) {
                        *arg = new;
                    }
                }
                Some(Terminator::Branch { cond, .. }) if *cond == old => *cond = new,
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // values
    // ------------------------------------------------------------------

    pub fn literal(&mut self, literal: Literal, ty: Ty) -> DefId {
        self.push_def(DefKind::Literal(literal), ty)
    }

    pub fn literal_bool(&mut self, value: bool) -> DefId {
        self.literal(Literal::Bool(value), Ty::Bool)
    }

    pub fn literal_int(&mut self, ty: Ty, value: i128) -> DefId {
        let value = normalize_int(&ty, value);
        self.literal(Literal::Int(value), ty)
    }

    pub fn literal_str(&mut self, value: impl Into<String>) -> DefId {
        let ty = Ty::Ptr(Box::new(Ty::Array {
            elem: Box::new(Ty::U8),
            len: None,
        }));
        self.literal(Literal::Str(value.into()), ty)
    }

    pub fn zero(&mut self, ty: Ty) -> DefId {
        match ty {
            Ty::Bool => self.literal_bool(false),
            Ty::F32 | Ty::F64 => self.literal(Literal::Float(0f64.to_bits()), ty),
            ty => self.literal_int(ty, 0),
        }
    }

    pub fn one(&mut self, ty: Ty) -> DefId {
        match ty {
            Ty::Bool => self.literal_bool(true),
            Ty::F32 | Ty::F64 => self.literal(Literal::Float(1f64.to_bits()), ty),
            ty => self.literal_int(ty, 1),
        }
    }

    pub fn all_ones(&mut self, ty: Ty) -> DefId {
        match ty {
            Ty::Bool => self.literal_bool(true),
            ty => self.literal_int(ty, -1),
        }
    }

    pub fn bottom(&mut self, ty: Ty) -> DefId {
        self.push_def(DefKind::Bottom, ty)
    }

    /// Binary operation; folds when both operands are literals.
    pub fn binop(&mut self, op: BinOp, lhs: DefId, rhs: DefId) -> DefId {
        let ty = self.ty(lhs).clone();
        if let (Some(a), Some(b)) = (self.as_literal(lhs), self.as_literal(rhs)) {
            if let Some(folded) = fold_binop(op, &ty, a, b) {
                let result_ty = if op.is_cmp() { Ty::Bool } else { ty };
                return self.literal(folded, result_ty);
            }
        }
        let result_ty = if op.is_cmp() { Ty::Bool } else { ty };
        self.push_def(DefKind::BinOp { op, lhs, rhs }, result_ty)
    }

    pub fn arithop_minus(&mut self, def: DefId) -> DefId {
        let zero = self.zero(self.ty(def).clone());
        self.binop(BinOp::Sub, zero, def)
    }

    pub fn arithop_not(&mut self, def: DefId) -> DefId {
        let ones = self.all_ones(self.ty(def).clone());
        self.binop(BinOp::Xor, def, ones)
    }

    pub fn cast(&mut self, value: DefId, ty: Ty) -> DefId {
        if self.ty(value) == &ty {
            return value;
        }
        self.push_def(DefKind::Cast { value }, ty)
    }

    pub fn tuple(&mut self, elems: Vec<DefId>) -> DefId {
        let ty = Ty::Tuple(elems.iter().map(|e| self.ty(*e).clone()).collect());
        self.push_def(DefKind::Tuple(elems), ty)
    }

    fn literal_index(&self, index: DefId) -> Option<u64> {
        match self.as_literal(index) {
            Some(Literal::Int(i)) if *i >= 0 => Some(*i as u64),
            _ => None,
        }
    }

    pub fn extract(&mut self, aggregate: DefId, index: DefId) -> DefId {
        let at = self.literal_index(index);
        if let (DefKind::Tuple(elems), Some(at)) = (&self.def(aggregate).kind, at) {
            if let Some(elem) = elems.get(at as usize) {
                return *elem;
            }
        }
        let ty = self.ty(aggregate).element(at).unwrap_or(Ty::Bottom);
        self.push_def(DefKind::Extract { aggregate, index }, ty)
    }

    pub fn extract_at(&mut self, aggregate: DefId, index: u64) -> DefId {
        let index = self.literal_int(Ty::U32, index as i128);
        self.extract(aggregate, index)
    }

    pub fn insert(&mut self, aggregate: DefId, index: DefId, value: DefId) -> DefId {
        let ty = self.ty(aggregate).clone();
        self.push_def(
            DefKind::Insert {
                aggregate,
                index,
                value,
            },
            ty,
        )
    }

    pub fn enter(&mut self, mem: DefId) -> DefId {
        self.push_def(DefKind::Enter { mem }, Ty::Frame)
    }

    pub fn slot(&mut self, ty: Ty, frame: DefId, handle: u32, name: &str) -> DefId {
        let slot = self.push_def(DefKind::Slot { frame, handle }, Ty::Ptr(Box::new(ty)));
        self.set_name(slot, name);
        slot
    }

    pub fn lea(&mut self, ptr: DefId, index: DefId) -> DefId {
        let at = self.literal_index(index);
        let elem = self
            .ty(ptr)
            .pointee()
            .and_then(|pointee| pointee.element(at))
            .unwrap_or(Ty::Bottom);
        self.push_def(DefKind::Lea { ptr, index }, Ty::Ptr(Box::new(elem)))
    }

    pub fn load(&mut self, mem: DefId, ptr: DefId) -> DefId {
        let value_ty = self.ty(ptr).pointee().cloned().unwrap_or(Ty::Bottom);
        self.push_def(DefKind::Load { mem, ptr }, Ty::Tuple(vec![Ty::Mem, value_ty]))
    }

    pub fn store(&mut self, mem: DefId, ptr: DefId, value: DefId) -> DefId {
        self.push_def(DefKind::Store { mem, ptr, value }, Ty::Mem)
    }

    pub fn eval(&mut self, marker: EvalMarker, value: DefId) -> DefId {
        let ty = self.ty(value).clone();
        self.push_def(DefKind::Eval { marker, value }, ty)
    }
}

/// Wraps `value` into the range of the integer type `ty`.
fn normalize_int(ty: &Ty, value: i128) -> i128 {
    let Some(width) = ty.bit_width().filter(|_| ty.is_int()) else {
        return value;
    };
    let mask = (1i128 << width) - 1;
    let bits = value & mask;
    if ty.is_signed() && bits >> (width - 1) == 1 {
        bits - (1i128 << width)
    } else {
        bits
    }
}

fn fold_binop(op: BinOp, ty: &Ty, lhs: &Literal, rhs: &Literal) -> Option<Literal> {
    match (lhs, rhs) {
        (Literal::Int(a), Literal::Int(b)) if ty.is_int() => {
            let (a, b) = (*a, *b);
            let width = ty.bit_width()? as i128;
            let value = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div if b != 0 => a / b,
                BinOp::Rem if b != 0 => a % b,
                BinOp::And => a & b,
                BinOp::Or => a | b,
                BinOp::Xor => a ^ b,
                BinOp::Shl if (0..width).contains(&b) => a << b,
                BinOp::Shr if (0..width).contains(&b) => {
                    if ty.is_signed() {
                        a >> b
                    } else {
                        (a & ((1i128 << width) - 1)) >> b
                    }
                }
                BinOp::Eq => return Some(Literal::Bool(a == b)),
                BinOp::Ne => return Some(Literal::Bool(a != b)),
                BinOp::Lt => return Some(Literal::Bool(a < b)),
                BinOp::Le => return Some(Literal::Bool(a <= b)),
                BinOp::Gt => return Some(Literal::Bool(a > b)),
                BinOp::Ge => return Some(Literal::Bool(a >= b)),
                _ => return None,
            };
            Some(Literal::Int(normalize_int(ty, value)))
        }
        (Literal::Bool(a), Literal::Bool(b)) => Some(Literal::Bool(match op {
            BinOp::And => a & b,
            BinOp::Or => a | b,
            BinOp::Xor | BinOp::Ne => a ^ b,
            BinOp::Eq => a == b,
            _ => return None,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_integer_arithmetic_with_wrapping() {
        let mut world = World::new();
        let a = world.literal_int(Ty::U8, 250);
        let b = world.literal_int(Ty::U8, 10);
        let sum = world.binop(BinOp::Add, a, b);
        assert_eq!(world.as_literal(sum), Some(&Literal::Int(4)));

        let x = world.literal_int(Ty::I8, 127);
        let y = world.literal_int(Ty::I8, 1);
        let wrapped = world.binop(BinOp::Add, x, y);
        assert_eq!(world.as_literal(wrapped), Some(&Literal::Int(-128)));
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let mut world = World::new();
        let a = world.literal_int(Ty::I32, 1);
        let zero = world.literal_int(Ty::I32, 0);
        let div = world.binop(BinOp::Div, a, zero);
        assert!(matches!(world.def(div).kind, DefKind::BinOp { op: BinOp::Div, .. }));
    }

    #[test]
    fn comparisons_produce_bool() {
        let mut world = World::new();
        let param_cont = world.continuation(&Ty::Fn(vec![Ty::Mem, Ty::I32]), "f");
        let x = world.param(param_cont, 1);
        let one = world.literal_int(Ty::I32, 1);
        let cmp = world.binop(BinOp::Lt, x, one);
        assert_eq!(world.ty(cmp), &Ty::Bool);
    }

    #[test]
    fn removing_a_param_drops_matching_jump_args() {
        let mut world = World::new();
        let pred = world.basicblock("pred");
        let join = world.basicblock("join");
        let first = world.append_param(join, Ty::I32, None);
        let second = world.append_param(join, Ty::Bool, None);
        let one = world.literal_int(Ty::I32, 1);
        let yes = world.literal_bool(true);
        let target = world.cont(join).def;
        world.jump(pred, target, vec![one, yes]);

        world.remove_param(join, 0);

        assert_eq!(world.params(join), &[second]);
        assert_eq!(world.def(second).kind, DefKind::Param { cont: join, index: 0 });
        assert_eq!(world.jump_args(pred), Some(&[yes][..]));
        assert_eq!(world.ty(target), &Ty::Fn(vec![Ty::Bool]));
        assert_ne!(first, second);
    }

    #[test]
    fn extract_of_tuple_literal_index_is_forwarded() {
        let mut world = World::new();
        let a = world.literal_int(Ty::I32, 7);
        let b = world.literal_bool(false);
        let tuple = world.tuple(vec![a, b]);
        assert_eq!(world.extract_at(tuple, 1), b);
    }
}
