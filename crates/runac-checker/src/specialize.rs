//! The numeric literal specializer.
//!
//! After type checking, literal-derived expressions may still carry the
//! width-unresolved `anyint`/`anyfloat` sentinels. One pass over each
//! function propagates concrete widths from context: the other side of a
//! comparison or arithmetic node, the matching call parameter, or the
//! function's return type. Anything still unresolved afterwards is an
//! error, and running the pass twice changes nothing.

use runac_ast::{Expr, ExprKind, Module, Step};
use runac_common::{Diagnostic, TypeId, codes};
use runac_types::{Type, TypeStore};

pub fn specialize(module: &mut Module, store: &TypeStore) -> Result<(), Diagnostic> {
    for (_, fun) in &mut module.code {
        let rtype = fun.rtype();
        for block in fun.flow.blocks.values_mut() {
            for step in &mut block.steps {
                spec_step(step, store, rtype)?;
            }
        }
        for block in fun.flow.blocks.values_mut() {
            for step in &mut block.steps {
                verify_step(step, store)?;
            }
        }
    }
    Ok(())
}

fn spec_step(step: &mut Step, store: &TypeStore, rtype: TypeId) -> Result<(), Diagnostic> {
    match step {
        Step::Expr(e) | Step::CondBranch { cond: e, .. } | Step::Yield { value: e, .. } => {
            spec_expr(e, store)
        }
        Step::Assign { left, right } => {
            spec_expr(right, store)?;
            // `x = 2` has no width context; the leftover sentinel is
            // reported by the verification pass below.
            if let Some(lt) = left.ty {
                if !store.is_unresolved(lt) {
                    force(right, lt, store)?;
                }
            }
            Ok(())
        }
        Step::Return { value, .. } => {
            if let Some(v) = value {
                spec_expr(v, store)?;
                force(v, rtype, store)?;
            }
            Ok(())
        }
        Step::LoopSetup { source, .. } => spec_expr(source, store),
        Step::Branch { .. } | Step::LoopHeader { .. } => Ok(()),
    }
}

fn spec_expr(e: &mut Expr, store: &TypeStore) -> Result<(), Diagnostic> {
    let own = e.ty;
    match &mut e.kind {
        ExprKind::Compare { left, right, .. } => {
            spec_expr(left, store)?;
            spec_expr(right, store)?;
            if store.is_unresolved(left.ty()) && !store.is_unresolved(right.ty()) {
                force(left, right.ty(), store)?;
            } else if store.is_unresolved(right.ty()) && !store.is_unresolved(left.ty()) {
                force(right, left.ty(), store)?;
            }
            Ok(())
        }
        ExprKind::Binary { left, right, .. } => {
            spec_expr(left, store)?;
            spec_expr(right, store)?;
            let own = own.expect("checked expression");
            if !store.is_unresolved(own) {
                force(left, own, store)?;
                force(right, own, store)?;
            } else if !store.is_unresolved(left.ty()) {
                force(right, left.ty(), store)?;
            } else if !store.is_unresolved(right.ty()) {
                force(left, right.ty(), store)?;
            }
            Ok(())
        }
        ExprKind::Call { args, fun, .. } => {
            for arg in args.iter_mut() {
                spec_expr(arg, store)?;
            }
            if let Some(fun) = fun {
                let params = match store.get_type(fun.ty) {
                    Type::Function(f) => f.params.clone(),
                    _ => Vec::new(),
                };
                for (arg, &param) in args.iter_mut().zip(params.iter()) {
                    if store.is_unresolved(arg.ty()) {
                        force(arg, param, store)?;
                    }
                }
            }
            Ok(())
        }
        ExprKind::Ternary {
            cond,
            then_val,
            else_val,
        } => {
            spec_expr(cond, store)?;
            spec_expr(then_val, store)?;
            spec_expr(else_val, store)?;
            Ok(())
        }
        ExprKind::And { left, right }
        | ExprKind::Or { left, right }
        | ExprKind::Is { left, right } => {
            spec_expr(left, store)?;
            spec_expr(right, store)?;
            Ok(())
        }
        ExprKind::Not(v) | ExprKind::As { value: v, .. } => spec_expr(v, store),
        ExprKind::Attrib { obj, .. } => spec_expr(obj, store),
        ExprKind::Elem { obj, key } => {
            spec_expr(obj, store)?;
            spec_expr(key, store)
        }
        ExprKind::Tuple(values) => {
            for v in values.iter_mut() {
                spec_expr(v, store)?;
            }
            Ok(())
        }
        ExprKind::Phi { left, right } => {
            spec_expr(&mut left.1, store)?;
            spec_expr(&mut right.1, store)
        }
        ExprKind::NoneVal
        | ExprKind::Bool(_)
        | ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Name(_)
        | ExprKind::Init => Ok(()),
    }
}

/// Resolve `e` to the concrete numeric type `dst`, recursing through the
/// composite shapes a literal can hide in. Unsigned contexts reject
/// negative literals.
fn force(e: &mut Expr, dst: TypeId, store: &TypeStore) -> Result<(), Diagnostic> {
    if !store.is_unresolved(e.ty()) {
        return Ok(());
    }
    let core = store.unwrap(dst);
    match (store.get_type(e.ty()), store.get_type(core)) {
        (Type::AnyInt, Type::Int { signed, .. }) => {
            if let ExprKind::Int(v) = e.kind {
                if !signed && v < 0 {
                    return Err(Diagnostic::error(
                        e.span,
                        codes::UNRESOLVED_NUMERIC,
                        format!("negative literal cannot take type '{}'", store.name(core)),
                    ));
                }
            }
        }
        (Type::AnyFloat, Type::Float { .. }) => {}
        _ => {
            return Err(Diagnostic::error(
                e.span,
                codes::UNRESOLVED_NUMERIC,
                format!(
                    "literal of type '{}' cannot take type '{}'",
                    store.name(e.ty()),
                    store.name(core)
                ),
            ));
        }
    }
    e.ty = Some(core);
    match &mut e.kind {
        ExprKind::Binary { left, right, .. } => {
            force(left, core, store)?;
            force(right, core, store)?;
        }
        ExprKind::Ternary {
            then_val, else_val, ..
        } => {
            force(then_val, core, store)?;
            force(else_val, core, store)?;
        }
        ExprKind::Phi { left, right } => {
            force(&mut left.1, core, store)?;
            force(&mut right.1, core, store)?;
        }
        _ => {}
    }
    Ok(())
}

fn verify_step(step: &mut Step, store: &TypeStore) -> Result<(), Diagnostic> {
    match step {
        Step::Expr(e) | Step::CondBranch { cond: e, .. } | Step::Yield { value: e, .. } => {
            verify_expr(e, store)
        }
        Step::Assign { left, right } => {
            verify_expr(left, store)?;
            verify_expr(right, store)
        }
        Step::Return { value, .. } => match value {
            Some(v) => verify_expr(v, store),
            None => Ok(()),
        },
        Step::LoopSetup { source, .. } => verify_expr(source, store),
        Step::Branch { .. } | Step::LoopHeader { .. } => Ok(()),
    }
}

fn verify_expr(e: &Expr, store: &TypeStore) -> Result<(), Diagnostic> {
    if let Some(ty) = e.ty {
        if store.is_unresolved(store.unwrap(ty)) {
            return Err(Diagnostic::error(
                e.span,
                codes::UNRESOLVED_NUMERIC,
                "could not infer a concrete numeric width for this literal",
            ));
        }
    }
    match &e.kind {
        ExprKind::Binary { left, right, .. } | ExprKind::Compare { left, right, .. } => {
            verify_expr(left, store)?;
            verify_expr(right, store)
        }
        ExprKind::And { left, right }
        | ExprKind::Or { left, right }
        | ExprKind::Is { left, right } => {
            verify_expr(left, store)?;
            verify_expr(right, store)
        }
        ExprKind::Not(v) | ExprKind::As { value: v, .. } => verify_expr(v, store),
        ExprKind::Attrib { obj, .. } => verify_expr(obj, store),
        ExprKind::Elem { obj, key } => {
            verify_expr(obj, store)?;
            verify_expr(key, store)
        }
        ExprKind::Tuple(values) => {
            for v in values {
                verify_expr(v, store)?;
            }
            Ok(())
        }
        ExprKind::Call { args, .. } => {
            for a in args {
                verify_expr(a, store)?;
            }
            Ok(())
        }
        ExprKind::Ternary {
            cond,
            then_val,
            else_val,
        } => {
            verify_expr(cond, store)?;
            verify_expr(then_val, store)?;
            verify_expr(else_val, store)
        }
        ExprKind::Phi { left, right } => {
            verify_expr(&left.1, store)?;
            verify_expr(&right.1, store)
        }
        _ => Ok(()),
    }
}
