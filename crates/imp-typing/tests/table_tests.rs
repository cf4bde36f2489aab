use imp_core::DeclId;
use imp_typing::{TypeError, TypeNode, TypeTable};
use pretty_assertions::assert_eq;

#[test]
fn interning_is_idempotent_for_independently_built_types() {
    let mut table = TypeTable::new();

    let build = |table: &mut TypeTable| {
        let i32_ = table.type_i32();
        let bool_ = table.type_bool();
        let point = table.struct_type(DeclId(1), "Point");
        let ptr = table.borrowed_ptr(point);
        let tuple = table.tuple_type(vec![i32_, bool_, ptr]);
        table.fn_returning(vec![tuple], i32_)
    };

    let a = build(&mut table);
    let size = table.len();
    let b = build(&mut table);

    assert_eq!(a, b);
    assert_eq!(table.len(), size);
    table.verify();
}

#[test]
fn bound_variable_resolves_monotonically() {
    let mut table = TypeTable::new();
    let t = table.type_var(Some("T"));
    let i32_ = table.type_i32();
    let u8_ = table.type_u8();

    table.bind(t, i32_).expect("first bind");
    for _ in 0..3 {
        assert_eq!(table.unify(t), i32_);
    }

    assert_eq!(table.bind(t, i32_), Ok(()));
    assert_eq!(
        table.bind(t, u8_),
        Err(TypeError::AlreadyBound {
            var: t,
            current: i32_,
            requested: u8_,
        })
    );
    assert_eq!(table.unify(t), i32_);
}

#[test]
fn chains_of_variables_resolve_to_the_final_representative() {
    let mut table = TypeTable::new();
    let a = table.type_var(Some("A"));
    let b = table.type_var(Some("B"));
    let c = table.type_var(Some("C"));
    let f64_ = table.type_f64();

    table.bind(a, b).expect("a -> b");
    table.bind(b, c).expect("b -> c");
    table.bind(c, f64_).expect("c -> f64");

    assert_eq!(table.unify(a), f64_);
    assert!(matches!(table.resolved(a), TypeNode::Prim(_)));
    table.verify();
}

#[test]
fn binding_to_self_through_a_chain_is_a_no_op() {
    let mut table = TypeTable::new();
    let a = table.type_var(None);
    let b = table.type_var(None);
    table.bind(a, b).expect("a -> b");
    assert_eq!(table.bind(b, a), Ok(()));
    assert_eq!(table.unify(a), b);
    table.verify();
}

#[test]
fn redirected_composites_leave_one_canonical_copy() {
    let mut table = TypeTable::new();
    let t = table.type_var(Some("T"));
    let i32_ = table.type_i32();
    let pre = table.owned_ptr(t);
    let pre_arr = table.array_type(pre, None);
    let post_ptr = table.owned_ptr(i32_);
    let post_arr = table.array_type(post_ptr, None);

    table.bind(t, i32_).expect("bind");

    assert_eq!(table.unify(pre_arr), post_arr);
    assert!(table.equal(pre, post_ptr));
    assert_eq!(table.hash_of(pre_arr), table.hash_of(post_arr));
    table.verify();
}

#[test]
fn structurally_different_types_are_not_equal() {
    let mut table = TypeTable::new();
    let i32_ = table.type_i32();
    let owned = table.owned_ptr(i32_);
    let borrowed = table.borrowed_ptr(i32_);
    assert!(!table.equal(owned, borrowed));

    let trait_ = table.trait_type(DeclId(7), "Iter");
    let bound = table.bound(trait_, vec![i32_]);
    let impl_a = table.impl_type(DeclId(8), bound, owned);
    let impl_b = table.impl_type(DeclId(8), bound, borrowed);
    assert!(!table.equal(impl_a, impl_b));
    table.verify();
}

#[test]
fn nominal_identity_agrees_with_interning() {
    let mut table = TypeTable::new();
    let point = table.struct_type(DeclId(1), "Point");
    assert_eq!(table.struct_type(DeclId(1), "Point"), point);
    assert_eq!(table.hash_of(point), table.hash_of(point));

    // A second name for the same declaration interns to a separate type;
    // structural equality must not contradict that.
    let renamed = table.struct_type(DeclId(1), "Pt");
    assert!(renamed != point);
    assert!(!table.equal(point, renamed));
    assert!(table.hash_of(point) != table.hash_of(renamed));

    let iter = table.trait_type(DeclId(2), "Iter");
    let alias = table.trait_type(DeclId(2), "Iterator");
    assert!(!table.equal(iter, alias));
    assert_eq!(table.trait_type(DeclId(2), "Iter"), iter);
    table.verify();
}

#[test]
fn unknown_error_and_never_are_singletons() {
    let mut table = TypeTable::new();
    assert_eq!(table.unknown(), table.unknown());
    assert_eq!(table.error(), table.error());
    assert_eq!(table.never(), table.never());
    let (error, unknown) = (table.error(), table.unknown());
    assert!(table.is_error(error) && table.is_unknown(unknown));
}
