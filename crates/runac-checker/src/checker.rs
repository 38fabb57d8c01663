//! The per-function type checker.
//!
//! Walks blocks in ascending id order, keeping one scope per block chained
//! to its first processed predecessor. Name references resolve through the
//! CFG's `origin` metadata: every supplying block must provide a binding
//! and all bindings must agree in type; disagreements between predecessors
//! are resolved explicitly by phi nodes.

use rustc_hash::FxHashMap;

use crate::scope::{Binding, ScopeId, Scopes};
use runac_ast::{
    Block, BlockId, Callee, Expr, ExprKind, FlowGraph, FunRef, OriginEntry, OriginSource, Step,
};
use runac_common::{Diagnostic, Span, TypeId, codes};
use runac_types::{Type, TypeStore};

/// Immutable views of the current block's assignment/origin metadata,
/// split out so steps can be mutated while it is consulted.
#[derive(Clone, Copy)]
struct BlockMeta<'b> {
    assigns: &'b [(String, usize)],
    origin: &'b [OriginEntry],
}

pub(crate) struct TypeChecker<'a> {
    pub store: &'a mut TypeStore,
    pub scopes: &'a mut Scopes,
    /// Function start scope: arguments chained over the module scope.
    pub entry: ScopeId,
    pub block_scopes: FxHashMap<BlockId, ScopeId>,
    pub rtype: TypeId,
    pub yields: bool,
    pub variants: &'a mut Vec<TypeId>,
    pub cur_block: BlockId,
    pub cur_step: usize,
}

impl<'a> TypeChecker<'a> {
    pub fn check(mut self, flow: &mut FlowGraph) -> Result<FxHashMap<BlockId, ScopeId>, Diagnostic> {
        let ids: Vec<BlockId> = flow.blocks.keys().copied().collect();
        for id in ids {
            // Chain to the first already-processed predecessor; back-edge
            // bindings flow through phi nodes instead.
            let parent = flow
                .preds(id)
                .iter()
                .find_map(|p| self.block_scopes.get(p).copied())
                .unwrap_or(self.entry);
            let scope = self.scopes.create(Some(parent));
            self.block_scopes.insert(id, scope);
            self.cur_block = id;

            let mut block = flow.blocks.remove(&id).expect("block exists");
            let Block {
                steps,
                assigns,
                origin,
                ..
            } = &mut block;
            let meta = BlockMeta {
                assigns: &*assigns,
                origin: &*origin,
            };
            for (sid, step) in steps.iter_mut().enumerate() {
                self.cur_step = sid;
                self.check_step(step, scope, meta)?;
            }
            flow.blocks.insert(id, block);
        }
        Ok(self.block_scopes)
    }

    fn check_step(
        &mut self,
        step: &mut Step,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        match step {
            Step::Expr(e) => self.check_expr(e, scope, meta),
            Step::Assign { left, right } => self.check_assign(left, right, scope, meta),
            Step::Return { span, value } => self.check_return(*span, value.as_mut(), scope, meta),
            Step::Yield { span, value } => self.check_yield(*span, value, scope, meta),
            Step::Branch { .. } => Ok(()),
            Step::CondBranch { cond, .. } => self.check_expr(cond, scope, meta),
            Step::LoopSetup {
                name,
                source,
                span,
                ty,
            } => self.check_loop_setup(name, source, *span, ty, scope, meta),
            Step::LoopHeader {
                ctx,
                lvar,
                span,
                ty,
                ..
            } => self.check_loop_header(ctx, lvar, *span, ty, scope),
        }
    }

    fn check_expr(
        &mut self,
        e: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        let span = e.span;
        let pre = e.ty;
        let ty = match &mut e.kind {
            ExprKind::NoneVal => self.store.no_type(),
            ExprKind::Bool(_) => self.store.bool_(),
            ExprKind::Int(_) => self.store.any_int(),
            ExprKind::Float(_) => self.store.any_float(),
            ExprKind::Str(_) => {
                let s = self.store.str_();
                self.store.owner(s)
            }
            ExprKind::Name(name) => self.resolve_name(name, span, scope, meta, true)?,
            ExprKind::Tuple(values) => {
                for v in values.iter_mut() {
                    self.check_expr(v, scope, meta)?;
                }
                let ts: Vec<TypeId> = values.iter().map(|v| v.ty()).collect();
                self.store.tuple(ts)
            }
            ExprKind::Not(value) => {
                self.check_expr(value, scope, meta)?;
                self.store.bool_()
            }
            ExprKind::And { left, right } | ExprKind::Or { left, right } => {
                self.check_expr(left, scope, meta)?;
                self.check_expr(right, scope, meta)?;
                if left.ty() == right.ty() {
                    left.ty()
                } else {
                    self.store.bool_()
                }
            }
            ExprKind::Is { left, right } => {
                self.check_expr(left, scope, meta)?;
                self.check_expr(right, scope, meta)?;
                if !matches!(right.kind, ExprKind::NoneVal) {
                    return Err(Diagnostic::error(
                        right.span,
                        codes::TYPE_MISMATCH,
                        "right side of 'is' must be None",
                    ));
                }
                if !self.store.is_wrapped(left.ty()) {
                    return Err(Diagnostic::error(
                        left.span,
                        codes::TYPE_MISMATCH,
                        "left side of 'is' must be an optional pointer",
                    ));
                }
                self.store.bool_()
            }
            ExprKind::Compare { left, right, .. } => {
                self.check_compare(span, left, right, scope, meta)?
            }
            ExprKind::Binary { op, left, right } => {
                let op = *op;
                self.check_binary(span, op, left, right, scope, meta)?
            }
            ExprKind::As { value, target } => {
                let target = target.clone();
                self.check_as(span, value, &target, scope, meta)?
            }
            ExprKind::Attrib { obj, attrib } => {
                let attrib = attrib.clone();
                self.check_attrib(obj, &attrib, span, scope, meta, true)?
            }
            ExprKind::Elem { obj, key } => self.check_elem(obj, key, span, scope, meta)?,
            ExprKind::Ternary {
                cond,
                then_val,
                else_val,
            } => {
                self.check_expr(cond, scope, meta)?;
                self.check_expr(then_val, scope, meta)?;
                self.check_expr(else_val, scope, meta)?;
                if then_val.ty() != else_val.ty() {
                    return Err(self.unmatched(span, then_val.ty(), else_val.ty()));
                }
                then_val.ty()
            }
            ExprKind::Call {
                callee,
                args,
                fun,
                virtual_,
            } => self.check_call(span, callee, args, fun, virtual_, scope, meta)?,
            ExprKind::Init => pre.ok_or_else(|| {
                Diagnostic::error(span, codes::CODEGEN_INVARIANT, "untyped Init expression")
            })?,
            ExprKind::Phi { left, right } => {
                self.check_phi_arm(&mut left.1, scope, meta)?;
                self.check_phi_arm(&mut right.1, scope, meta)?;
                if left.1.ty() != right.1.ty() {
                    return Err(self.unmatched(span, left.1.ty(), right.1.ty()));
                }
                left.1.ty()
            }
        };
        e.ty = Some(ty);
        Ok(())
    }

    fn unmatched(&self, span: Span, a: TypeId, b: TypeId) -> Diagnostic {
        Diagnostic::error(
            span,
            codes::TYPE_MISMATCH,
            format!(
                "unmatched types '{}', '{}'",
                self.store.name(a),
                self.store.name(b)
            ),
        )
    }

    /// Resolve a name through the block's `origin` metadata. Every
    /// supplying scope must have a live binding of the same type.
    fn resolve_name(
        &self,
        name: &str,
        span: Span,
        scope: ScopeId,
        meta: BlockMeta<'_>,
        strict: bool,
    ) -> Result<TypeId, Diagnostic> {
        let sources = meta
            .origin
            .iter()
            .find(|e| e.name == name && e.step == self.cur_step)
            .map(|e| e.sources.as_slice());

        let mut providers: Vec<Option<TypeId>> = Vec::new();
        match sources {
            Some(srcs) => {
                for src in srcs {
                    let sid = match src {
                        OriginSource::Entry => self.entry,
                        OriginSource::Block(b) => {
                            if *b == self.cur_block {
                                // A same-block origin only counts once the
                                // first assignment is behind us.
                                let first = meta
                                    .assigns
                                    .iter()
                                    .find(|(n, _)| n == name)
                                    .map(|&(_, i)| i);
                                if let Some(first) = first {
                                    if self.cur_step <= first {
                                        continue;
                                    }
                                }
                            }
                            match self.block_scopes.get(b) {
                                Some(s) => *s,
                                None => continue,
                            }
                        }
                    };
                    providers.push(self.scopes.get(sid, name).and_then(Binding::value_type));
                }
            }
            None => {
                providers.push(self.scopes.get(scope, name).and_then(Binding::value_type));
            }
        }

        if !strict {
            providers.retain(Option::is_some);
        }
        if providers.is_empty() || providers.iter().any(Option::is_none) {
            return Err(Diagnostic::error(
                span,
                codes::UNDEFINED_NAME,
                format!("undefined name '{name}'"),
            ));
        }
        let first = providers[0].unwrap();
        for p in &providers {
            if p.unwrap() != first {
                return Err(Diagnostic::error(
                    span,
                    codes::TYPE_MISMATCH,
                    format!("conflicting types for '{name}' across predecessors"),
                ));
            }
        }
        Ok(first)
    }

    fn check_phi_arm(
        &mut self,
        arm: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        if let ExprKind::Name(name) = &arm.kind {
            let ty = self.resolve_name(&name.clone(), arm.span, scope, meta, false)?;
            arm.ty = Some(ty);
            Ok(())
        } else {
            self.check_expr(arm, scope, meta)
        }
    }

    fn check_compare(
        &mut self,
        span: Span,
        left: &mut Expr,
        right: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<TypeId, Diagnostic> {
        self.check_expr(left, scope, meta)?;
        self.check_expr(right, scope, meta)?;
        let lt = self.store.unwrap(left.ty());
        let rt = self.store.unwrap(right.ty());
        if left.ty() != right.ty() {
            if self.store.is_int(lt) {
                if !self.store.is_int(rt) {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_COMPARISON,
                        format!(
                            "value of type '{}' may only be compared to integer type",
                            self.store.name(left.ty())
                        ),
                    ));
                }
            } else if self.store.is_float(lt) {
                if !self.store.is_float(rt) {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_COMPARISON,
                        format!(
                            "value of type '{}' may only be compared to float type",
                            self.store.name(left.ty())
                        ),
                    ));
                }
            } else {
                return Err(Diagnostic::error(
                    span,
                    codes::BAD_COMPARISON,
                    format!(
                        "types '{}' and '{}' cannot be compared",
                        self.store.name(lt),
                        self.store.name(rt)
                    ),
                ));
            }
        }
        Ok(self.store.bool_())
    }

    fn check_binary(
        &mut self,
        span: Span,
        op: runac_ast::BinOp,
        left: &mut Expr,
        right: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<TypeId, Diagnostic> {
        self.check_expr(left, scope, meta)?;
        self.check_expr(right, scope, meta)?;
        let lt = self.store.unwrap(left.ty());
        let rt = self.store.unwrap(right.ty());

        if op.int_only() && (self.store.is_float(lt) || self.store.is_float(rt)) {
            return Err(Diagnostic::error(
                span,
                codes::TYPE_MISMATCH,
                format!(
                    "bitwise operations do not apply to '{}', '{}'",
                    self.store.name(lt),
                    self.store.name(rt)
                ),
            ));
        }

        if left.ty() == right.ty() {
            return Ok(left.ty());
        }
        if self.store.is_int(lt) && self.store.is_int(rt) {
            // An unresolved side adopts the other side's width.
            if self.store.is_unresolved(lt) && !self.store.is_unresolved(rt) {
                return Ok(right.ty());
            }
            return Ok(left.ty());
        }
        if self.store.is_float(lt) && self.store.is_float(rt) {
            if self.store.is_unresolved(lt) && !self.store.is_unresolved(rt) {
                return Ok(right.ty());
            }
            return Ok(left.ty());
        }
        Err(self.unmatched(span, left.ty(), right.ty()))
    }

    fn check_as(
        &mut self,
        span: Span,
        value: &mut Expr,
        target: &str,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<TypeId, Diagnostic> {
        self.check_expr(value, scope, meta)?;
        let dst = self.store.get(target).ok_or_else(|| {
            Diagnostic::error(span, codes::UNKNOWN_TYPE, format!("type '{target}' not found"))
        })?;
        let src = self.store.unwrap(value.ty());

        match (self.store.get_type(src), self.store.get_type(dst)) {
            (Type::AnyInt, Type::Int { signed, .. }) => {
                if !signed {
                    if let ExprKind::Int(v) = value.kind {
                        if v < 0 {
                            return Err(Diagnostic::error(
                                value.span,
                                codes::BAD_CAST,
                                "negative literal cannot take an unsigned type",
                            ));
                        }
                    }
                }
                value.ty = Some(dst);
            }
            (Type::AnyFloat, Type::Float { .. }) => {
                value.ty = Some(dst);
            }
            (
                Type::Int { width: sw, .. },
                Type::Int { width: dw, .. },
            ) => {
                if dw.bits() < sw.bits() {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_CAST,
                        format!(
                            "cannot narrow '{}' to '{}'",
                            self.store.name(src),
                            self.store.name(dst)
                        ),
                    ));
                }
            }
            (Type::Float { bits: sb }, Type::Float { bits: db }) => {
                if db < sb {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_CAST,
                        format!(
                            "cannot narrow '{}' to '{}'",
                            self.store.name(src),
                            self.store.name(dst)
                        ),
                    ));
                }
            }
            _ => {
                return Err(Diagnostic::error(
                    span,
                    codes::BAD_CAST,
                    format!(
                        "'{}' cannot be converted to '{}'",
                        self.store.name(src),
                        self.store.name(dst)
                    ),
                ));
            }
        }
        Ok(dst)
    }

    /// Attribute lookup on the unwrapped receiver. On reads (`decay`),
    /// an owner-typed attribute yields a borrow: reading does not move.
    fn check_attrib(
        &mut self,
        obj: &mut Expr,
        attrib: &str,
        span: Span,
        scope: ScopeId,
        meta: BlockMeta<'_>,
        decay: bool,
    ) -> Result<TypeId, Diagnostic> {
        self.check_expr(obj, scope, meta)?;
        let core = self.store.unwrap(obj.ty());
        let attr = match self.store.get_type(core) {
            Type::Struct(s) => s.attribs.get(attrib).copied(),
            _ => None,
        };
        let (_, ty) = attr.ok_or_else(|| {
            Diagnostic::error(
                span,
                codes::UNKNOWN_ATTRIBUTE,
                format!(
                    "type '{}' has no attribute '{attrib}'",
                    self.store.name(core)
                ),
            )
        })?;
        if decay {
            if let Type::Owner(over) = *self.store.get_type(ty) {
                return Ok(self.store.ref_(over));
            }
        }
        Ok(ty)
    }

    fn check_elem(
        &mut self,
        obj: &mut Expr,
        key: &mut Expr,
        span: Span,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<TypeId, Diagnostic> {
        self.check_expr(key, scope, meta)?;
        self.check_expr(obj, scope, meta)?;
        let core = self.store.unwrap(obj.ty());
        let elem = match self.store.get_type(core) {
            Type::Array(elem) => *elem,
            _ => {
                return Err(Diagnostic::error(
                    span,
                    codes::TYPE_MISMATCH,
                    format!("'{}' is not an array", self.store.name(obj.ty())),
                ));
            }
        };
        // Bare literal keys index as the platform's unsigned word.
        if self.store.is_unresolved(self.store.unwrap(key.ty())) {
            if let ExprKind::Int(v) = key.kind {
                if v < 0 {
                    return Err(Diagnostic::error(
                        key.span,
                        codes::BAD_CAST,
                        "array index cannot be negative",
                    ));
                }
            }
            key.ty = Some(self.store.uword());
        }
        Ok(elem)
    }

    fn check_call(
        &mut self,
        span: Span,
        callee: &mut Callee,
        args: &mut Vec<Expr>,
        fun_slot: &mut Option<FunRef>,
        virtual_: &mut bool,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<TypeId, Diagnostic> {
        let mut actual: Vec<TypeId> = Vec::with_capacity(args.len() + 1);
        for arg in args.iter_mut() {
            self.check_expr(arg, scope, meta)?;
            actual.push(arg.ty());
        }

        let result = match callee {
            Callee::Attrib { obj, attrib } => {
                if obj.ty.is_none() {
                    self.check_expr(obj, scope, meta)?;
                }
                let obj_ty = obj.ty();
                if let Type::Module(m) = self.store.get_type(obj_ty) {
                    // Calling a module attribute.
                    let (symbol, fty) = m.functions.get(attrib.as_str()).cloned().ok_or_else(
                        || {
                            Diagnostic::error(
                                span,
                                codes::UNDEFINED_NAME,
                                format!("module has no function '{attrib}'"),
                            )
                        },
                    )?;
                    let f = self
                        .store
                        .get_type(fty)
                        .as_function()
                        .expect("module entry is a function")
                        .clone();
                    if !self.store.compat_args(&actual, &f.params, f.variadic) {
                        return Err(self.args_error(span, &actual, &f.params));
                    }
                    *fun_slot = Some(FunRef { decl: symbol, ty: fty });
                    f.ret
                } else {
                    // Calling an object attribute (method). The receiver
                    // becomes the first argument; trait receivers
                    // dispatch through the vtable.
                    let core = self.store.unwrap(obj_ty);
                    if matches!(self.store.get_type(core), Type::Trait(_)) {
                        *virtual_ = true;
                    }
                    args.insert(0, (**obj).clone());
                    actual.insert(0, obj_ty);
                    let method = self.store.select(core, attrib, &actual, span)?;
                    let params = method.param_types();
                    if !self.store.compat_args(&actual, &params, false) {
                        return Err(self.args_error(span, &actual, &params));
                    }
                    let fty = self.store.method_fn_type(&method);
                    let ret = method.ret;
                    *fun_slot = Some(FunRef {
                        decl: method.irname,
                        ty: fty,
                    });
                    ret
                }
            }
            Callee::Name(name) => {
                let binding = self.scopes.get(scope, name).cloned();
                match binding {
                    Some(Binding::Func { decl, ty }) => {
                        let f = self
                            .store
                            .get_type(ty)
                            .as_function()
                            .expect("Func binding holds a function type")
                            .clone();
                        if !self.store.compat_args(&actual, &f.params, f.variadic) {
                            return Err(self.args_error(span, &actual, &f.params));
                        }
                        *fun_slot = Some(FunRef { decl, ty });
                        f.ret
                    }
                    Some(Binding::Type(t)) => {
                        // Initializing a type: rewrite to
                        // `__init__(Init(owner(T)), args...)`.
                        let owner_t = self.store.owner(t);
                        let mut ctor_actual = Vec::with_capacity(actual.len() + 1);
                        ctor_actual.push(owner_t);
                        ctor_actual.extend(actual.iter().copied());
                        let method = self.store.select(t, "__init__", &ctor_actual, span)?;
                        let params = method.param_types();
                        if !self.store.compat_args(&ctor_actual, &params, false) {
                            return Err(self.args_error(span, &ctor_actual, &params));
                        }
                        let fty = self.store.method_fn_type(&method);
                        let mut init = Expr::new(span, ExprKind::Init);
                        init.ty = Some(owner_t);
                        args.insert(0, init);
                        *fun_slot = Some(FunRef {
                            decl: method.irname,
                            ty: fty,
                        });
                        owner_t
                    }
                    Some(Binding::Moved) | None => {
                        return Err(Diagnostic::error(
                            span,
                            codes::UNDEFINED_NAME,
                            format!("undefined name '{name}'"),
                        ));
                    }
                    Some(_) => {
                        return Err(Diagnostic::error(
                            span,
                            codes::NOT_CALLABLE,
                            "object is not a function",
                        ));
                    }
                }
            }
        };

        // Ownership transfer: passing a name into an owner parameter
        // consumes the binding.
        let fty = fun_slot.as_ref().expect("call resolved").ty;
        let params = self
            .store
            .get_type(fty)
            .as_function()
            .expect("resolved call has a function type")
            .params
            .clone();
        for (i, &p) in params.iter().enumerate() {
            if matches!(self.store.get_type(p), Type::Owner(_)) {
                if let Some(n) = args.get(i).and_then(Expr::as_name) {
                    let n = n.to_string();
                    self.scopes.mark_moved(scope, &n);
                }
            }
        }
        Ok(result)
    }

    fn args_error(&self, span: Span, actual: &[TypeId], params: &[TypeId]) -> Diagnostic {
        let astr: Vec<String> = actual.iter().map(|&t| self.store.name(t)).collect();
        let fstr: Vec<String> = params.iter().map(|&t| self.store.name(t)).collect();
        Diagnostic::error(
            span,
            codes::BAD_ARGUMENTS,
            format!(
                "arguments ({}) cannot be passed as ({})",
                astr.join(", "),
                fstr.join(", ")
            ),
        )
    }

    fn check_assign(
        &mut self,
        left: &mut Expr,
        right: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        if matches!(left.kind, ExprKind::Elem { .. }) {
            self.check_expr(left, scope, meta)?;
            self.check_expr(right, scope, meta)?;
            return self.assign_compat(left.span, left.ty(), right.ty());
        }
        match &mut left.kind {
            ExprKind::Tuple(dsts) => {
                self.check_expr(right, scope, meta)?;
                let parts = match self.store.get_type(self.store.unwrap(right.ty())) {
                    Type::Tuple(ps) => ps.clone(),
                    _ => {
                        return Err(Diagnostic::error(
                            right.span,
                            codes::TYPE_MISMATCH,
                            format!("cannot destructure '{}'", self.store.name(right.ty())),
                        ));
                    }
                };
                if parts.len() != dsts.len() {
                    return Err(Diagnostic::error(
                        left.span,
                        codes::TYPE_MISMATCH,
                        format!(
                            "destructuring expects {} names, got {}",
                            parts.len(),
                            dsts.len()
                        ),
                    ));
                }
                for (dst, &t) in dsts.iter_mut().zip(parts.iter()) {
                    let name = match &dst.kind {
                        ExprKind::Name(n) => n.clone(),
                        _ => {
                            return Err(Diagnostic::error(
                                dst.span,
                                codes::TYPE_MISMATCH,
                                "destructuring target must be a name",
                            ));
                        }
                    };
                    self.bind_name(&name, t, dst.span, scope)?;
                    dst.ty = Some(t);
                }
                left.ty = Some(self.store.tuple(parts));
                Ok(())
            }
            ExprKind::Name(name) => {
                let name = name.clone();
                self.check_expr(right, scope, meta)?;
                self.bind_name(&name, right.ty(), left.span, scope)?;
                left.ty = Some(right.ty());
                Ok(())
            }
            ExprKind::Attrib { obj, attrib } => {
                let attrib = attrib.clone();
                let span = left.span;
                let lt = self.check_attrib(obj, &attrib, span, scope, meta, false)?;
                left.ty = Some(lt);
                self.check_expr(right, scope, meta)?;
                self.assign_compat(span, lt, right.ty())
            }
            _ => Err(Diagnostic::error(
                left.span,
                codes::TYPE_MISMATCH,
                "invalid assignment target",
            )),
        }
    }

    fn bind_name(
        &mut self,
        name: &str,
        ty: TypeId,
        span: Span,
        scope: ScopeId,
    ) -> Result<(), Diagnostic> {
        match self.scopes.get(scope, name) {
            Some(Binding::Var(existing)) if *existing != ty => {
                return Err(Diagnostic::error(
                    span,
                    codes::REASSIGNMENT,
                    format!(
                        "cannot reassign '{name}' from '{}' to '{}'",
                        self.store.name(*existing),
                        self.store.name(ty)
                    ),
                ));
            }
            Some(Binding::Var(_)) | Some(Binding::Moved) | None => {}
            Some(_) => {
                return Err(Diagnostic::error(
                    span,
                    codes::DUPLICATE_DEFINITION,
                    format!("cannot shadow '{name}'"),
                ));
            }
        }
        self.scopes.insert(scope, name, Binding::Var(ty));
        Ok(())
    }

    /// Assignment into an attribute or element. Wrapper mismatches over
    /// the same pointee resolve by copying; anything else must be compat.
    fn assign_compat(&self, span: Span, lt: TypeId, rt: TypeId) -> Result<(), Diagnostic> {
        if self.store.compat(rt, lt) {
            return Ok(());
        }
        let both_wrapped = self.store.is_wrapped(lt) && self.store.is_wrapped(rt);
        if both_wrapped && self.store.unwrap(lt) == self.store.unwrap(rt) {
            return Ok(());
        }
        Err(Diagnostic::error(
            span,
            codes::TYPE_MISMATCH,
            format!(
                "incorrect assignment of {} to {}",
                self.store.name(rt),
                self.store.name(lt)
            ),
        ))
    }

    fn check_return(
        &mut self,
        span: Span,
        value: Option<&mut Expr>,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        if self.yields {
            if value.is_some() {
                return Err(Diagnostic::error(
                    span,
                    codes::BAD_RETURN,
                    "generator functions may only use bare 'return'",
                ));
            }
            return Ok(());
        }
        let void = self.store.void();
        match value {
            None => {
                if self.rtype != void {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_RETURN,
                        "function may not return value of type 'void'",
                    ));
                }
                Ok(())
            }
            Some(v) => {
                self.check_expr(v, scope, meta)?;
                if self.rtype == void {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_RETURN,
                        format!(
                            "function must return type 'void' ('{}' not allowed)",
                            self.store.name(v.ty())
                        ),
                    ));
                }
                if !self.store.compat(v.ty(), self.rtype) {
                    return Err(Diagnostic::error(
                        span,
                        codes::BAD_RETURN,
                        format!(
                            "return value does not match declared return type '{}'",
                            self.store.name(self.rtype)
                        ),
                    ));
                }
                // Returning an owning name consumes it.
                if let Some(n) = v.as_name() {
                    if matches!(self.store.get_type(v.ty()), Type::Owner(_)) {
                        let n = n.to_string();
                        self.scopes.mark_moved(scope, &n);
                    }
                }
                Ok(())
            }
        }
    }

    fn check_yield(
        &mut self,
        span: Span,
        value: &mut Expr,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        if !self.yields {
            return Err(Diagnostic::error(
                span,
                codes::BAD_RETURN,
                "yield outside a generator function",
            ));
        }
        let elem = match self.store.get_type(self.rtype) {
            Type::Iter(elem) => *elem,
            _ => {
                return Err(Diagnostic::error(
                    span,
                    codes::BAD_RETURN,
                    "generator functions must return an iterator type",
                ));
            }
        };
        self.check_expr(value, scope, meta)?;
        if self.store.is_unresolved(value.ty()) {
            value.ty = Some(elem);
        }
        if !self.store.compat(value.ty(), elem) {
            return Err(Diagnostic::error(
                span,
                codes::TYPE_MISMATCH,
                format!(
                    "yielded value does not match element type '{}'",
                    self.store.name(elem)
                ),
            ));
        }
        Ok(())
    }

    fn check_loop_setup(
        &mut self,
        name: &str,
        source: &mut Expr,
        span: Span,
        ty: &mut Option<TypeId>,
        scope: ScopeId,
        meta: BlockMeta<'_>,
    ) -> Result<(), Diagnostic> {
        self.check_expr(source, scope, meta)?;
        let core = self.store.unwrap(source.ty());
        if !matches!(self.store.get_type(core), Type::Iter(_)) {
            // Not an iterator yet: desugar to `source.__iter__()`.
            let mut call = Expr::new(
                source.span,
                ExprKind::Call {
                    callee: Callee::Attrib {
                        obj: Box::new(source.clone()),
                        attrib: "__iter__".to_string(),
                    },
                    args: Vec::new(),
                    fun: None,
                    virtual_: false,
                },
            );
            self.check_expr(&mut call, scope, meta)?;
            *source = call;
        }

        let decl = match &source.kind {
            ExprKind::Call { fun: Some(f), .. } => f.decl.clone(),
            _ => {
                return Err(Diagnostic::error(
                    span,
                    codes::TYPE_MISMATCH,
                    "for-loop source must be an iterator call",
                ));
            }
        };
        let ctx_name = format!("{decl}$ctx");
        let ctx = self.store.get(&ctx_name).ok_or_else(|| {
            Diagnostic::error(
                span,
                codes::UNKNOWN_TYPE,
                format!("'{decl}' has no iterator context"),
            )
        })?;
        if !self.variants.contains(&ctx) {
            self.variants.push(ctx);
        }
        *ty = Some(ctx);
        let ctx_ref = self.store.ref_(ctx);
        self.scopes.insert(scope, name, Binding::Var(ctx_ref));
        Ok(())
    }

    fn check_loop_header(
        &mut self,
        ctx: &str,
        lvar: &str,
        span: Span,
        ty: &mut Option<TypeId>,
        scope: ScopeId,
    ) -> Result<(), Diagnostic> {
        let ctx_ty = match self.scopes.get(scope, ctx) {
            Some(Binding::Var(t)) => *t,
            _ => {
                return Err(Diagnostic::error(
                    span,
                    codes::CODEGEN_INVARIANT,
                    format!("loop context '{ctx}' is not bound"),
                ));
            }
        };
        let elem = self
            .store
            .struct_of(ctx_ty)
            .and_then(|s| s.yields)
            .ok_or_else(|| {
                Diagnostic::error(
                    span,
                    codes::CODEGEN_INVARIANT,
                    format!("'{ctx}' is not a generator context"),
                )
            })?;
        if let Some(Binding::Var(existing)) = self.scopes.get(scope, lvar) {
            if *existing != elem {
                return Err(Diagnostic::error(
                    span,
                    codes::REASSIGNMENT,
                    format!("cannot reassign '{lvar}' to loop over a different type"),
                ));
            }
        }
        self.scopes.insert(scope, lvar, Binding::Var(elem));
        *ty = Some(elem);
        Ok(())
    }
}
