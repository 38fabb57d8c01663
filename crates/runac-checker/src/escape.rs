//! Escape analysis.
//!
//! A backward dataflow over each function's CFG: blocks in reverse id
//! order, steps in reverse. A `track` set holds names whose value outlives
//! the function; anything flowing into a tracked name, an owner parameter,
//! or an owning return escapes with it. The result is the `escapes` flag
//! on `Init` expressions and `malloc` calls, which code generation turns
//! into heap rather than stack allocation.

use rustc_hash::FxHashSet;

use runac_ast::{Expr, ExprKind, FunctionKey, Module, Step};
use runac_common::Diagnostic;
use runac_types::{Type, TypeStore};

pub fn analyze(module: &mut Module, store: &TypeStore) -> Result<(), Diagnostic> {
    for (key, fun) in &mut module.code {
        let in_del = matches!(key, FunctionKey::Method(_, m) if m == "__del__");
        let mut finder = EscapeFinder {
            store,
            in_del,
            track: FxHashSet::default(),
        };
        finder.run(&mut fun.flow)?;
    }
    Ok(())
}

struct EscapeFinder<'a> {
    store: &'a TypeStore,
    in_del: bool,
    track: FxHashSet<String>,
}

impl<'a> EscapeFinder<'a> {
    fn run(&mut self, flow: &mut runac_ast::FlowGraph) -> Result<(), Diagnostic> {
        for block in flow.blocks.values_mut().rev() {
            for step in block.steps.iter_mut().rev() {
                self.step(step)?;
            }
        }
        Ok(())
    }

    fn step(&mut self, step: &mut Step) -> Result<(), Diagnostic> {
        match step {
            Step::Return { value: Some(v), .. } => {
                self.calls(v);
                if matches!(self.store.get_type(v.ty()), Type::Owner(_)) {
                    self.mark(v);
                }
                Ok(())
            }
            Step::Assign { left, right } => {
                self.calls(right);
                match &left.kind {
                    ExprKind::Name(name) => {
                        if self.track.contains(name.as_str()) {
                            self.mark(right);
                        }
                    }
                    ExprKind::Attrib { obj, .. } => {
                        // Storing into an object that escapes drags the
                        // value along with it.
                        if let Some(n) = obj.as_name() {
                            if self.track.contains(n) {
                                self.mark(right);
                            }
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
            Step::Expr(e) | Step::CondBranch { cond: e, .. } | Step::Yield { value: e, .. } => {
                self.calls(e);
                Ok(())
            }
            Step::LoopSetup { source, .. } => {
                self.calls(source);
                Ok(())
            }
            Step::Return { value: None, .. } | Step::Branch { .. } | Step::LoopHeader { .. } => {
                Ok(())
            }
        }
    }

    /// Escape-neutral walk: arguments bound to owner parameters escape
    /// into the callee regardless of what happens to the call's result.
    fn calls(&mut self, e: &mut Expr) {
        match &mut e.kind {
            ExprKind::Call { args, fun, .. } => {
                for arg in args.iter_mut() {
                    self.calls(arg);
                }
                let Some(fun) = fun else { return };
                if self.in_del && fun.decl == "runa.free" {
                    return;
                }
                let params = match self.store.get_type(fun.ty) {
                    Type::Function(f) => f.params.clone(),
                    _ => return,
                };
                for (i, &p) in params.iter().enumerate() {
                    if matches!(self.store.get_type(p), Type::Owner(_)) {
                        if let Some(arg) = args.get_mut(i) {
                            self.mark(arg);
                        }
                    }
                }
            }
            ExprKind::Binary { left, right, .. }
            | ExprKind::Compare { left, right, .. }
            | ExprKind::And { left, right }
            | ExprKind::Or { left, right } => {
                self.calls(left);
                self.calls(right);
            }
            ExprKind::Not(v) | ExprKind::As { value: v, .. } => self.calls(v),
            ExprKind::Attrib { obj, .. } => self.calls(obj),
            ExprKind::Elem { obj, key } => {
                self.calls(obj);
                self.calls(key);
            }
            ExprKind::Ternary {
                cond,
                then_val,
                else_val,
            } => {
                self.calls(cond);
                self.calls(then_val);
                self.calls(else_val);
            }
            ExprKind::Tuple(values) => {
                for v in values.iter_mut() {
                    self.calls(v);
                }
            }
            _ => {}
        }
    }

    /// Mark a value as escaping, propagating through the shapes a value
    /// can flow out of.
    fn mark(&mut self, e: &mut Expr) {
        match &mut e.kind {
            ExprKind::Name(name) => {
                self.track.insert(name.clone());
            }
            ExprKind::Init => {
                e.escapes = true;
            }
            ExprKind::Call { args, fun, .. } => {
                let decl = fun.as_ref().map(|f| f.decl.as_str()).unwrap_or("");
                if decl == "runa.malloc" {
                    e.escapes = true;
                } else if decl.ends_with(".__init__") {
                    if let Some(init) = args.first_mut() {
                        self.mark(init);
                    }
                }
            }
            ExprKind::Ternary {
                then_val, else_val, ..
            } => {
                self.mark(then_val);
                self.mark(else_val);
            }
            ExprKind::Phi { left, right } => {
                self.mark(&mut left.1);
                self.mark(&mut right.1);
            }
            _ => {}
        }
    }
}
