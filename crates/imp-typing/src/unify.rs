use tracing::trace;

use crate::error::TypeError;
use crate::node::{Type, TypeNode};
use crate::table::TypeTable;

impl TypeTable {
    /// Follows `ty`'s representative chain to the current canonical type.
    /// Chains are walked, not compressed.
    pub fn unify(&self, ty: Type) -> Type {
        let mut cur = ty;
        while let Some(next) = self.entries[cur.index()].repr {
            cur = next;
        }
        cur
    }

    /// Binds the type variable `var` to `target`.
    ///
    /// Rebinding to the same representative is a no-op; rebinding to a
    /// different one fails with [`TypeError::AlreadyBound`].
    pub fn bind(&mut self, var: Type, target: Type) -> Result<(), TypeError> {
        let target = self.unify(target);
        if !self.node(var).is_var() {
            return Err(TypeError::NotAVariable(var));
        }
        if self.entries[var.index()].repr.is_some() {
            let current = self.unify(var);
            return if current == target {
                Ok(())
            } else {
                Err(TypeError::AlreadyBound {
                    var,
                    current,
                    requested: target,
                })
            };
        }
        if target == var {
            return Ok(());
        }
        if self.occurs(var, target) {
            return Err(TypeError::Occurs { var, ty: target });
        }
        trace!(%var, %target, "bind");
        self.entries[var.index()].repr = Some(target);
        self.redirect_stale();
        Ok(())
    }

    /// Re-interns every canonical composite that mentions a rebound child
    /// and records the rewritten copy as its representative. Children are
    /// always interned before their parents, so one forward sweep suffices.
    fn redirect_stale(&mut self) {
        let mut idx = 0;
        while idx < self.entries.len() {
            let entry = &self.entries[idx];
            if entry.repr.is_none() && entry.node.is_composite() {
                let node = entry.node.clone();
                let rewritten = node.map_children(|child| self.unify(child));
                if rewritten != node {
                    let new = self.intern(rewritten);
                    let old = Type(idx as u32);
                    if new != old {
                        trace!(%old, %new, "redirect");
                        self.entries[idx].repr = Some(new);
                    }
                }
            }
            idx += 1;
        }
    }

    fn occurs(&self, var: Type, ty: Type) -> bool {
        let ty = self.unify(ty);
        ty == var
            || self
                .node(ty)
                .children()
                .into_iter()
                .any(|child| self.occurs(var, child))
    }

    /// Structurally unifies `a` and `b`, binding variables on either side.
    ///
    /// `Error` unifies with anything and absorbs the result; `Unknown` is a
    /// wildcard. Returns the representative of the unified type.
    pub fn unify_with(&mut self, a: Type, b: Type) -> Result<Type, TypeError> {
        let (a, b) = (self.unify(a), self.unify(b));
        if a == b {
            return Ok(a);
        }
        let mismatch = TypeError::Mismatch {
            expected: a,
            found: b,
        };
        match (self.node(a).clone(), self.node(b).clone()) {
            (TypeNode::Error, _) | (_, TypeNode::Error) => Ok(self.error()),
            (TypeNode::Unknown, _) => Ok(b),
            (_, TypeNode::Unknown) => Ok(a),
            (TypeNode::Var { .. }, _) => {
                self.bind(a, b)?;
                Ok(self.unify(b))
            }
            (_, TypeNode::Var { .. }) => {
                self.bind(b, a)?;
                Ok(self.unify(a))
            }
            (TypeNode::Fn(xs), TypeNode::Fn(ys)) | (TypeNode::Tuple(xs), TypeNode::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(mismatch);
                }
                self.unify_all(&xs, &ys)?;
                Ok(self.unify(a))
            }
            (TypeNode::Array { elem: x, len: lx }, TypeNode::Array { elem: y, len: ly }) => {
                if lx != ly {
                    return Err(mismatch);
                }
                self.unify_with(x, y)?;
                Ok(self.unify(a))
            }
            (TypeNode::Ptr(mx, x), TypeNode::Ptr(my, y)) => {
                if mx != my {
                    return Err(mismatch);
                }
                self.unify_with(x, y)?;
                Ok(self.unify(a))
            }
            (
                TypeNode::Bound {
                    trait_: tx,
                    args: xs,
                },
                TypeNode::Bound {
                    trait_: ty,
                    args: ys,
                },
            ) => {
                if tx != ty || xs.len() != ys.len() {
                    return Err(mismatch);
                }
                self.unify_all(&xs, &ys)?;
                Ok(self.unify(a))
            }
            (
                TypeNode::Impl {
                    item: ix,
                    bound: bx,
                    self_ty: sx,
                },
                TypeNode::Impl {
                    item: iy,
                    bound: by,
                    self_ty: sy,
                },
            ) => {
                if ix != iy {
                    return Err(mismatch);
                }
                self.unify_with(bx, by)?;
                self.unify_with(sx, sy)?;
                Ok(self.unify(a))
            }
            _ => Err(mismatch),
        }
    }

    fn unify_all(&mut self, xs: &[Type], ys: &[Type]) -> Result<(), TypeError> {
        for (x, y) in xs.iter().zip(ys) {
            self.unify_with(*x, *y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn binding_redirects_composites_mentioning_the_var() {
        let mut table = TypeTable::new();
        let t = table.type_var(Some("T"));
        let f_t = table.fn_type(vec![t]);
        let i32_ = table.type_i32();

        table.bind(t, i32_).expect("bind");

        let f_i32 = table.fn_type(vec![i32_]);
        assert_eq!(table.unify(f_t), f_i32);
        assert_eq!(table.unify(t), i32_);
        table.verify();
    }

    #[test]
    fn occurs_check_rejects_infinite_types() {
        let mut table = TypeTable::new();
        let t = table.type_var(None);
        let ptr = table.owned_ptr(t);
        assert_eq!(
            table.bind(t, ptr),
            Err(TypeError::Occurs { var: t, ty: ptr })
        );
    }

    #[test]
    fn unify_with_binds_through_structure() {
        let mut table = TypeTable::new();
        let a = table.type_var(Some("A"));
        let b = table.type_var(Some("B"));
        let i32_ = table.type_i32();
        let bool_ = table.type_bool();
        let lhs = table.tuple_type(vec![a, bool_]);
        let rhs = table.tuple_type(vec![i32_, b]);

        let unified = table.unify_with(lhs, rhs).expect("unify");

        let expected = table.tuple_type(vec![i32_, bool_]);
        assert_eq!(unified, expected);
        assert_eq!(table.unify(a), i32_);
        assert_eq!(table.unify(b), bool_);
    }

    #[test]
    fn error_absorbs_and_unknown_is_a_wildcard() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let err = table.error();
        let unknown = table.unknown();
        assert_eq!(table.unify_with(err, i32_), Ok(err));
        assert_eq!(table.unify_with(unknown, i32_), Ok(i32_));
    }

    #[test]
    fn pointer_modes_must_agree() {
        let mut table = TypeTable::new();
        let i32_ = table.type_i32();
        let owned = table.owned_ptr(i32_);
        let borrowed = table.borrowed_ptr(i32_);
        assert!(matches!(
            table.unify_with(owned, borrowed),
            Err(TypeError::Mismatch { .. })
        ));
    }
}
