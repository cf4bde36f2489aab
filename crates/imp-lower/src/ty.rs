use std::collections::{HashMap, HashSet};

use imp_core::ir::Ty;
use imp_core::DeclId;
use imp_typing::{PrimKind, Type, TypeNode, TypeTable};

use crate::error::{LowerError, Result};

pub fn prim_ty(kind: PrimKind) -> Ty {
    match kind {
        PrimKind::Bool => Ty::Bool,
        PrimKind::I8 => Ty::I8,
        PrimKind::I16 => Ty::I16,
        PrimKind::I32 => Ty::I32,
        PrimKind::I64 => Ty::I64,
        PrimKind::U8 => Ty::U8,
        PrimKind::U16 => Ty::U16,
        PrimKind::U32 => Ty::U32,
        PrimKind::U64 => Ty::U64,
        PrimKind::F32 => Ty::F32,
        PrimKind::F64 => Ty::F64,
    }
}

/// Maps surface types to backend types.
///
/// Function types gain a leading `mem` parameter; their trailing return
/// continuation is lowered the same way, so it receives `(mem, results…)`.
/// A struct that reaches itself through a pointer is cut with an opaque
/// reference to its name.
pub struct TypeLowering<'a> {
    types: &'a TypeTable,
    struct_fields: HashMap<DeclId, Vec<Type>>,
    cache: HashMap<Type, Ty>,
    in_progress: HashSet<DeclId>,
}

impl<'a> TypeLowering<'a> {
    pub fn new(types: &'a TypeTable, struct_fields: HashMap<DeclId, Vec<Type>>) -> Self {
        Self {
            types,
            struct_fields,
            cache: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn lower(&mut self, ty: Type) -> Result<Ty> {
        let types = self.types;
        let ty = types.unify(ty);
        if let Some(cached) = self.cache.get(&ty) {
            return Ok(cached.clone());
        }
        let lowered = match types.node(ty) {
            TypeNode::Prim(kind) => prim_ty(*kind),
            TypeNode::Fn(params) => {
                let mut lowered = vec![Ty::Mem];
                lowered.extend(self.lower_all(params)?);
                Ty::Fn(lowered)
            }
            TypeNode::Tuple(elems) => Ty::Tuple(self.lower_all(elems)?),
            TypeNode::Struct { decl, name } => {
                if self.in_progress.contains(decl) {
                    return Ok(Ty::Opaque(name.to_string()));
                }
                let fields = self
                    .struct_fields
                    .get(decl)
                    .cloned()
                    .ok_or_else(|| LowerError::UnknownStruct(name.clone()))?;
                self.in_progress.insert(*decl);
                let fields = self.lower_all(&fields);
                self.in_progress.remove(decl);
                Ty::Struct {
                    name: name.to_string(),
                    fields: fields?,
                }
            }
            TypeNode::Array { elem, len } => Ty::Array {
                elem: Box::new(self.lower(*elem)?),
                len: *len,
            },
            TypeNode::Ptr(_, pointee) => Ty::Ptr(Box::new(self.lower(*pointee)?)),
            TypeNode::Never => Ty::Bottom,
            TypeNode::Trait { .. } | TypeNode::Bound { .. } | TypeNode::Impl { .. } => {
                return Err(LowerError::NoRepresentation(
                    types.display(ty).to_string(),
                ))
            }
            TypeNode::Var { .. } | TypeNode::Unknown | TypeNode::Error => {
                return Err(LowerError::Unresolved(types.display(ty).to_string()))
            }
        };
        if self.in_progress.is_empty() {
            self.cache.insert(ty, lowered.clone());
        }
        Ok(lowered)
    }

    fn lower_all(&mut self, tys: &[Type]) -> Result<Vec<Ty>> {
        tys.iter().map(|ty| self.lower(*ty)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn function_types_gain_a_leading_mem() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let bool_ = table.type_bool();
        let f = table.fn_returning(vec![i32_, bool_], i32_);

        let mut lowering = TypeLowering::new(&table, HashMap::new());
        assert_eq!(
            lowering.lower(f),
            Ok(Ty::Fn(vec![
                Ty::Mem,
                Ty::I32,
                Ty::Bool,
                Ty::Fn(vec![Ty::Mem, Ty::I32]),
            ]))
        );
    }

    #[test]
    fn struct_fields_keep_declared_order_and_cut_cycles() {
        let mut table = TypeTable::new();
        let node = DeclId(0);
        let node_ty = table.struct_type(node, "Node");
        let next = table.owned_ptr(node_ty);
        let u8_ = table.type_u8();
        let f64_ = table.type_f64();
        let fields = HashMap::from([(node, vec![u8_, f64_, next])]);

        let mut lowering = TypeLowering::new(&table, fields);
        assert_eq!(
            lowering.lower(node_ty),
            Ok(Ty::Struct {
                name: "Node".to_string(),
                fields: vec![Ty::U8, Ty::F64, Ty::Ptr(Box::new(Ty::Opaque("Node".to_string())))],
            })
        );
    }

    #[test]
    fn pointer_modes_share_a_representation() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let owned = table.owned_ptr(i32_);
        let mutable = table.mut_ptr(i32_);

        let mut lowering = TypeLowering::new(&table, HashMap::new());
        assert_eq!(lowering.lower(owned), lowering.lower(mutable));
    }

    #[test]
    fn unresolved_types_are_rejected() {
        let mut table = TypeTable::new();
        let var = table.type_var(None);
        let err = table.error();

        let mut lowering = TypeLowering::new(&table, HashMap::new());
        assert!(matches!(lowering.lower(var), Err(LowerError::Unresolved(_))));
        assert!(matches!(lowering.lower(err), Err(LowerError::Unresolved(_))));
    }
}
