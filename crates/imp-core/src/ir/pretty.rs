use std::collections::HashSet;
use std::fmt::{self, Formatter};

use itertools::Itertools;

use super::{ContId, Def, DefId, DefKind, Literal, Terminator, World};
use crate::pretty::{escape_string, PrettyCtx, PrettyPrintable};

impl PrettyPrintable for World {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        let mut printed = HashSet::new();
        for (idx, (id, _)) in self.continuations().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            fmt_continuation(self, id, &mut printed, f, ctx)?;
        }
        Ok(())
    }
}

fn fmt_continuation(
    world: &World,
    id: ContId,
    printed: &mut HashSet<DefId>,
    f: &mut Formatter<'_>,
    ctx: &mut PrettyCtx<'_>,
) -> fmt::Result {
    let cont = world.cont(id);
    let params = cont
        .params
        .iter()
        .map(|p| format!("{}: {}", operand(world, *p), world.ty(*p)))
        .join(", ");
    let mut header = format!("fn {}({})", cont.name, params);
    if !cont.attributes.is_empty() {
        header.push_str(&format!(" [{}]", cont.attributes.iter().join(", ")));
    }
    header.push_str(" {");
    ctx.writeln(f, header)?;

    let roots: Vec<DefId> = match &cont.terminator {
        Some(Terminator::Jump { callee, args }) => {
            std::iter::once(*callee).chain(args.iter().copied()).collect()
        }
        Some(Terminator::Branch { cond, .. }) => vec![*cond],
        Some(Terminator::Unreachable) | None => Vec::new(),
    };
    let mut schedule = Vec::new();
    for root in roots {
        collect_schedule(world, root, printed, &mut schedule);
    }

    ctx.with_indent(|ctx| {
        for def in &schedule {
            let line = fmt_def(world, *def, world.def(*def));
            if ctx.options.show_types {
                ctx.writeln(f, format!("%{}: {} = {}", def.0, world.ty(*def), line))?;
            } else {
                ctx.writeln(f, format!("%{} = {}", def.0, line))?;
            }
        }
        let term = match &cont.terminator {
            Some(Terminator::Jump { callee, args }) => format!(
                "jump {}({})",
                operand(world, *callee),
                args.iter().map(|a| operand(world, *a)).join(", ")
            ),
            Some(Terminator::Branch { cond, then_, else_ }) => format!(
                "branch {}, @{}, @{}",
                operand(world, *cond),
                world.cont(*then_).name,
                world.cont(*else_).name
            ),
            Some(Terminator::Unreachable) => "unreachable".to_string(),
            None => "<empty>".to_string(),
        };
        ctx.writeln(f, term)
    })?;
    ctx.writeln(f, "}")
}

fn is_inline(def: &Def) -> bool {
    matches!(
        def.kind,
        DefKind::Literal(_) | DefKind::Bottom | DefKind::Param { .. } | DefKind::Continuation(_)
    )
}

fn collect_schedule(
    world: &World,
    root: DefId,
    printed: &mut HashSet<DefId>,
    out: &mut Vec<DefId>,
) {
    let def = world.def(root);
    if is_inline(def) || !printed.insert(root) {
        return;
    }
    for operand in def.kind.operands() {
        collect_schedule(world, operand, printed, out);
    }
    out.push(root);
}

fn operand(world: &World, id: DefId) -> String {
    let def = world.def(id);
    match &def.kind {
        DefKind::Literal(lit) => fmt_literal(lit),
        DefKind::Bottom => "⊥".to_string(),
        DefKind::Continuation(cont) => format!("@{}", world.cont(*cont).name),
        _ => match &def.name {
            Some(name) => format!("%{}.{}", id.0, name),
            None => format!("%{}", id.0),
        },
    }
}

fn fmt_literal(lit: &Literal) -> String {
    match lit {
        Literal::Bool(b) => b.to_string(),
        Literal::Int(i) => i.to_string(),
        Literal::Float(bits) => format!("{:?}", f64::from_bits(*bits)),
        Literal::Str(s) => format!("\"{}\"", escape_string(s)),
    }
}

fn fmt_def(world: &World, id: DefId, def: &Def) -> String {
    let op = |d: &DefId| operand(world, *d);
    match &def.kind {
        DefKind::BinOp { op: bin, lhs, rhs } => format!("{} {}, {}", bin, op(lhs), op(rhs)),
        DefKind::Cast { value } => format!("cast {}", op(value)),
        DefKind::Tuple(elems) => format!("({})", elems.iter().map(op).join(", ")),
        DefKind::Extract { aggregate, index } => {
            format!("extract {}, {}", op(aggregate), op(index))
        }
        DefKind::Insert {
            aggregate,
            index,
            value,
        } => format!("insert {}, {}, {}", op(aggregate), op(index), op(value)),
        DefKind::Enter { mem } => format!("enter {}", op(mem)),
        DefKind::Slot { frame, handle } => format!("slot {}, #{}", op(frame), handle),
        DefKind::Lea { ptr, index } => format!("lea {}, {}", op(ptr), op(index)),
        DefKind::Load { mem, ptr } => format!("load {}, {}", op(mem), op(ptr)),
        DefKind::Store { mem, ptr, value } => {
            format!("store {}, {}, {}", op(mem), op(ptr), op(value))
        }
        DefKind::Eval { marker, value } => format!("{} {}", marker, op(value)),
        DefKind::Literal(_)
        | DefKind::Bottom
        | DefKind::Param { .. }
        | DefKind::Continuation(_) => operand(world, id),
    }
}
