use imp_core::ir::{Attribute, BinOp, ContinuationKind, DefKind, Literal, Terminator, Ty, World};
use imp_core::pretty::{pretty, PrettyOptions};
use pretty_assertions::assert_eq;

fn ret_ty(results: Vec<Ty>) -> Ty {
    let mut params = vec![Ty::Mem];
    params.extend(results);
    Ty::Fn(params)
}

#[test]
fn function_signature_carries_mem_and_return_continuation() {
    let mut world = World::new();
    let fn_ty = Ty::Fn(vec![Ty::Mem, Ty::I32, ret_ty(vec![Ty::I32])]);
    let f = world.continuation(&fn_ty, "f");

    let cont = world.cont(f);
    assert_eq!(cont.kind, ContinuationKind::Function);
    assert_eq!(cont.params.len(), 3);
    assert_eq!(world.ty(world.param(f, 0)), &Ty::Mem);
    assert_eq!(world.ty(cont.def), &fn_ty);
}

#[test]
fn replace_all_uses_rewrites_terminators_and_operands() {
    let mut world = World::new();
    let fn_ty = Ty::Fn(vec![Ty::Mem, Ty::I32, ret_ty(vec![Ty::I32])]);
    let f = world.continuation(&fn_ty, "f");
    let mem = world.param(f, 0);
    let x = world.param(f, 1);
    let ret = world.param(f, 2);
    let one = world.literal_int(Ty::I32, 1);
    let sum = world.binop(BinOp::Add, x, one);
    world.jump(f, ret, vec![mem, x]);

    let seven = world.literal_int(Ty::I32, 7);
    world.replace_all_uses(x, seven);

    assert_eq!(world.jump_args(f), Some(&[mem, seven][..]));
    match &world.def(sum).kind {
        DefKind::BinOp { lhs, .. } => assert_eq!(*lhs, seven),
        other => panic!("expected binop, got {other:?}"),
    }
}

#[test]
fn successors_follow_blocks_but_not_callees() {
    let mut world = World::new();
    let callee_ty = Ty::Fn(vec![Ty::Mem, ret_ty(vec![])]);
    let callee = world.continuation(&callee_ty, "callee");
    let caller = world.continuation(&Ty::Fn(vec![Ty::Mem, ret_ty(vec![])]), "caller");
    let back = world.return_continuation(&[Ty::Mem], "caller_cont");
    let mem = world.param(caller, 0);
    let callee_def = world.cont(callee).def;
    let back_def = world.cont(back).def;
    world.jump(caller, callee_def, vec![mem, back_def]);

    assert_eq!(world.successors(caller), vec![back]);

    let then_ = world.basicblock("then");
    let else_ = world.basicblock("else");
    let cond = world.literal_bool(true);
    let b = world.basicblock("b");
    world.branch(b, cond, then_, else_);
    assert_eq!(world.successors(b), vec![then_, else_]);
}

#[test]
fn printer_renders_continuations_with_attributes() {
    let mut world = World::new();
    let fn_ty = Ty::Fn(vec![Ty::Mem, ret_ty(vec![Ty::I32])]);
    let f = world.continuation(&fn_ty, "main_impala");
    world.set_attribute(f, Attribute::Extern);
    let mem = world.param(f, 0);
    let ret = world.param(f, 1);
    let one = world.literal_int(Ty::I32, 1);
    let two = world.literal_int(Ty::I32, 2);
    let three = world.binop(BinOp::Add, one, two);
    assert_eq!(world.as_literal(three), Some(&Literal::Int(3)));
    world.jump(f, ret, vec![mem, three]);

    let text = pretty(&world, PrettyOptions::default()).to_string();
    let expected = format!(
        "fn main_impala(%{m}: mem, %{r}: fn(mem, i32)) [extern] {{\n    jump %{r}(%{m}, 3)\n}}\n",
        m = mem.0,
        r = ret.0
    );
    assert_eq!(text, expected);
}

#[test]
fn printer_schedules_memory_operations_before_terminator() {
    let mut world = World::new();
    let fn_ty = Ty::Fn(vec![Ty::Mem, ret_ty(vec![])]);
    let f = world.continuation(&fn_ty, "f");
    let mem = world.param(f, 0);
    let ret = world.param(f, 1);
    let frame = world.enter(mem);
    let slot = world.slot(Ty::I32, frame, 0, "x");
    let value = world.literal_int(Ty::I32, 5);
    let mem2 = world.store(mem, slot, value);
    world.jump(f, ret, vec![mem2]);

    let text = pretty(
        &world,
        PrettyOptions {
            show_types: false,
            ..PrettyOptions::default()
        },
    )
    .to_string();
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    assert_eq!(lines[1], format!("%{} = enter %{}", frame.0, mem.0));
    assert_eq!(lines[2], format!("%{} = slot %{}, #0", slot.0, frame.0));
    assert!(lines[3].starts_with(&format!("%{} = store", mem2.0)));
    assert!(matches!(
        world.cont(f).terminator,
        Some(Terminator::Jump { .. })
    ));
}
