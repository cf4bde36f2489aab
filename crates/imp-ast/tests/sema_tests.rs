use imp_ast::build::ModuleBuilder;
use imp_ast::{Decl, DeclKind, Expr, ExprKind, InfixOp, PostfixOp, PrefixOp, Sema};
use pretty_assertions::assert_eq;

fn sema(b: &ModuleBuilder) -> Sema<'_> {
    let module = b.module();
    Sema::new(&module.decls, &module.types)
}

#[test]
fn string_and_char_literals_are_lvalues() {
    let mut b = ModuleBuilder::new();
    let s = b.str("hi");
    let c = Expr::new(ExprKind::Char('x'), None);
    assert!(sema(&b).is_lvalue(&s));
    assert!(sema(&b).is_lvalue(&c));
}

#[test]
fn path_is_lvalue_iff_mutable_and_marks_written() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let x = b.local("x", i32_, true);
    let y = b.local("y", i32_, false);
    let (px, py) = (b.path(x), b.path(y));

    assert!(sema(&b).is_lvalue(&px));
    assert!(!sema(&b).is_lvalue(&py));
    assert!(b.module().decls[x].is_written());
    assert!(b.module().decls[y].is_written());
}

#[test]
fn field_of_pointer_is_lvalue_even_when_base_is_not() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let (_, point) = b.struct_decl("Point", &[("x", i32_), ("y", i32_)]);
    let ptr = b.types().borrowed_ptr(point);
    let p = b.local("p", ptr, false);
    let s = b.local("s", point, false);
    let m = b.local("m", point, true);

    let through_ptr = {
        let base = b.path(p);
        b.field(base, "x", 0, i32_)
    };
    let immutable = {
        let base = b.path(s);
        b.field(base, "x", 0, i32_)
    };
    let mutable = {
        let base = b.path(m);
        b.field(base, "y", 1, i32_)
    };

    assert!(sema(&b).is_lvalue(&through_ptr));
    assert!(!sema(&b).is_lvalue(&immutable));
    assert!(sema(&b).is_lvalue(&mutable));
}

#[test]
fn index_follows_base_for_aggregates_and_is_conservative_when_untyped() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let arr_ty = b.types().array_type(i32_, Some(4));
    let a = b.local("a", arr_ty, true);
    let frozen = b.local("f", arr_ty, false);
    let n = b.local("n", i32_, true);

    let mut_index = {
        let (base, idx) = (b.path(a), b.int(0));
        b.index(base, idx)
    };
    let frozen_index = {
        let (base, idx) = (b.path(frozen), b.int(0));
        b.index(base, idx)
    };
    let scalar_index = {
        let (base, idx) = (b.path(n), b.int(0));
        b.index(base, idx)
    };
    let untyped = {
        let (mut base, idx) = (b.path(n), b.int(0));
        base.ty = None;
        b.index(base, idx)
    };
    let error_typed = {
        let (mut base, idx) = (b.path(n), b.int(0));
        base.ty = Some(b.types().error());
        b.index(base, idx)
    };

    let sema = sema(&b);
    assert!(sema.is_lvalue(&mut_index));
    assert!(!sema.is_lvalue(&frozen_index));
    assert!(!sema.is_lvalue(&scalar_index));
    assert!(sema.is_lvalue(&untyped));
    assert!(sema.is_lvalue(&error_typed));
}

#[test]
fn deref_is_always_an_lvalue_and_cast_follows_source() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let i64_ = b.types().type_i64();
    let ptr = b.types().borrowed_ptr(i32_);
    let p = b.local("p", ptr, false);
    let x = b.local("x", i32_, true);

    let deref = {
        let base = b.path(p);
        b.prefix(PrefixOp::Deref, base)
    };
    let cast_mut = {
        let src = b.path(x);
        b.cast(src, i64_)
    };
    let cast_lit = {
        let src = b.int(3);
        b.cast(src, i64_)
    };

    let sema = sema(&b);
    assert!(sema.is_lvalue(&deref));
    assert!(sema.is_lvalue(&cast_mut));
    assert!(!sema.is_lvalue(&cast_lit));
}

#[test]
fn other_expressions_are_not_lvalues() {
    let mut b = ModuleBuilder::new();
    let lhs = b.int(1);
    let rhs = b.int(2);
    let sum = b.infix(InfixOp::Add, lhs, rhs);
    let lit = b.bool(true);
    let neg = {
        let one = b.int(1);
        b.prefix(PrefixOp::Sub, one)
    };

    let sema = sema(&b);
    assert!(!sema.is_lvalue(&sum));
    assert!(!sema.is_lvalue(&lit));
    assert!(!sema.is_lvalue(&neg));
}

#[test]
fn side_effects_follow_operator_and_shape() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let x = b.local("x", i32_, true);
    let (f, _) = b.fn_decl("f", &[], Some(i32_));

    let inc = {
        let p = b.path(x);
        b.prefix(PrefixOp::Inc, p)
    };
    let post = {
        let p = b.path(x);
        b.postfix(PostfixOp::Dec, p)
    };
    let assign = {
        let (l, r) = (b.path(x), b.int(1));
        b.infix(InfixOp::AddAssign, l, r)
    };
    let pure_sum = {
        let (l, r) = (b.path(x), b.int(1));
        b.infix(InfixOp::Add, l, r)
    };
    let call = {
        let callee = b.path(f);
        b.call(callee, vec![])
    };
    let empty_block = b.block(vec![], None);
    let pure_block = {
        let value = b.int(4);
        b.block(vec![], Some(value))
    };
    let stmt_block = {
        let value = b.int(4);
        let stmt = b.expr_stmt(value);
        b.block(vec![stmt], None)
    };
    let pure_if = {
        let (c, t, e) = (b.bool(true), b.int(1), b.int(2));
        b.if_(c, t, Some(e))
    };
    let loop_ = {
        let (c, body) = (b.bool(false), b.block(vec![], None));
        b.while_(c, body)
    };

    let sema = sema(&b);
    let effects: Vec<bool> = [
        &inc,
        &post,
        &assign,
        &pure_sum,
        &call,
        &empty_block,
        &pure_block,
        &stmt_block,
        &pure_if,
        &loop_,
    ]
    .iter()
    .map(|e| sema.has_side_effect(e))
    .collect();
    assert_eq!(
        effects,
        vec![true, true, true, false, true, false, false, true, false, true]
    );
}

#[test]
fn take_address_marks_locals_through_field_and_index_bases() {
    let mut b = ModuleBuilder::new();
    let i32_ = b.types().type_i32();
    let arr_ty = b.types().array_type(i32_, Some(2));
    let a = b.local("a", arr_ty, true);
    let s = b.decl(Decl::new("S", DeclKind::Static, Some(i32_)));

    let elem = {
        let (base, idx) = (b.path(a), b.int(1));
        b.index(base, idx)
    };
    let addr = b.prefix(PrefixOp::AddrOf, elem);
    let static_addr = {
        let p = b.path(s);
        b.prefix(PrefixOp::AddrOf, p)
    };
    let body = {
        let (s1, s2) = (b.expr_stmt(addr), b.expr_stmt(static_addr));
        b.block(vec![s1, s2], None)
    };

    sema(&b).collect_address_taken(&body);

    assert!(b.module().decls[a].is_address_taken());
    assert!(!b.module().decls[s].is_address_taken());
}
