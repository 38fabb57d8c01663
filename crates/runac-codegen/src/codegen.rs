//! Module-level emission and statement lowering.
//!
//! `CodeGen` drives one module: extern declarations, constant globals,
//! type and vtable declarations, then one `define` per function, lowering
//! each block's steps in order. Expression lowering lives in `exprs.rs`.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::value::{Frame, Value};
use crate::writer::Writer;
use runac_ast::{BlockId, Expr, ExprKind, Function, Module, Step};
use runac_checker::{ConstValue, ForeignDecl, TypedModule};
use runac_common::{Diagnostic, Span, TypeId, codes};
use runac_types::{Type, TypeStore};

pub(crate) struct GenMode {
    /// The generator's context struct.
    pub ctx: TypeId,
    /// State value stored once the generator is exhausted.
    pub done: u64,
}

pub struct CodeGen<'a> {
    pub(crate) store: &'a mut TypeStore,
    externs: &'a [ForeignDecl],
    variants: Vec<TypeId>,
    constants: &'a [runac_checker::ConstGlobal],
    pub(crate) w: Writer,
    pub(crate) cur_block: BlockId,
    pub(crate) cur_step: usize,
    /// Predecessors of the current block, in phi-arm order.
    pub(crate) cur_preds: Vec<BlockId>,
    yield_indices: FxHashMap<(BlockId, usize), u64>,
    pub(crate) gen_mode: Option<GenMode>,
}

impl<'a> CodeGen<'a> {
    pub fn new(typed: &'a mut TypedModule) -> Self {
        let TypedModule {
            store,
            externs,
            variants,
            constants,
        } = typed;
        CodeGen {
            store,
            externs,
            variants: variants.clone(),
            constants,
            w: Writer::new(),
            cur_block: 0,
            cur_step: 0,
            cur_preds: Vec::new(),
            yield_indices: FxHashMap::default(),
            gen_mode: None,
        }
    }

    pub(crate) fn internal(&self, span: Span, msg: impl Into<String>) -> Diagnostic {
        Diagnostic::error(span, codes::CODEGEN_INVARIANT, msg)
    }

    /// Emit the module body (everything after the prelude).
    pub fn emit_module(mut self, module: &Module) -> Result<String, Diagnostic> {
        self.collect_attrib_variants(module);

        let externs = self.externs;
        for e in externs {
            // The prelude already declares the runtime's own symbols.
            if e.symbol.starts_with("runa.") {
                continue;
            }
            let f = match self.store.get_type(e.ty) {
                Type::Function(f) => f.clone(),
                _ => continue,
            };
            let mut params: Vec<String> = f.params.iter().map(|&t| self.store.ir(t)).collect();
            if f.variadic {
                params.push("...".to_string());
            }
            self.w.writeline(&format!(
                "declare {} @{}({})",
                self.store.ir(f.ret),
                e.symbol,
                params.join(", ")
            ));
        }
        self.w.newline();

        let constants = self.constants;
        for c in constants {
            match &c.value {
                ConstValue::Str(s) => {
                    let n = s.len();
                    let esc = crate::exprs::llvm_escape(s);
                    self.w.writeline(&format!(
                        "{}.data = constant [{n} x i8] c\"{esc}\"",
                        c.global
                    ));
                    self.w.writeline(&format!(
                        "{} = constant %str {{ i64 {n}, i8* getelementptr ([{n} x i8]* {}.data, i32 0, i32 0) }}",
                        c.global, c.global
                    ));
                }
                ConstValue::Int(v) => {
                    self.w
                        .writeline(&format!("{} = constant i64 {v}", c.global));
                }
            }
        }
        if !self.constants.is_empty() {
            self.w.newline();
        }

        for name in module.types.keys() {
            let id = match self.store.get(name) {
                Some(id) => id,
                None => continue,
            };
            match self.store.get_type(id) {
                Type::Struct(_) => self.emit_struct_type(id),
                Type::Trait(_) => self.emit_trait_type(id),
                _ => {}
            }
        }

        let variants = self.variants.clone();
        for id in variants {
            self.emit_variant(id);
        }
        self.w.newline();

        let globals = self.const_globals();
        for (_, fun) in &module.code {
            debug!(name = %fun.irname, "emitting function");
            self.emit_function(fun, &globals)?;
        }

        Ok(self.w.into_string())
    }

    /// Array and tuple types reachable only through struct attributes
    /// still need emitted declarations.
    fn collect_attrib_variants(&mut self, module: &Module) {
        let mut found: Vec<TypeId> = Vec::new();
        for name in module.types.keys() {
            let Some(id) = self.store.get(name) else {
                continue;
            };
            if let Type::Struct(s) = self.store.get_type(id) {
                for &(_, ty) in s.attribs.values() {
                    let core = self.store.unwrap(ty);
                    if matches!(self.store.get_type(core), Type::Array(_) | Type::Tuple(_)) {
                        found.push(core);
                    }
                }
            }
        }
        for id in found {
            if !self.variants.contains(&id) {
                self.variants.push(id);
            }
        }
    }

    fn const_globals(&self) -> FxHashMap<String, Value> {
        self.constants
            .iter()
            .map(|c| (c.name.clone(), Value::new(c.ty, c.global.clone())))
            .collect()
    }

    fn emit_struct_type(&mut self, id: TypeId) {
        let (name, fields) = {
            let s = match self.store.get_type(id) {
                Type::Struct(s) => s,
                _ => return,
            };
            let mut slots: Vec<(u32, TypeId)> = s.attribs.values().copied().collect();
            slots.sort_by_key(|&(i, _)| i);
            (s.name.clone(), slots)
        };
        let irs: Vec<String> = fields.iter().map(|&(_, t)| self.store.ir(t)).collect();
        self.w
            .writeline(&format!("%{name} = type {{ {} }}", irs.join(", ")));
        self.w.writeline(&format!(
            "@{name}.size = constant i64 ptrtoint (%{name}* getelementptr (%{name}* null, i32 1) to i64)"
        ));
        self.w.newline();
    }

    fn emit_trait_type(&mut self, id: TypeId) {
        let (name, methods) = {
            let t = match self.store.get_type(id) {
                Type::Trait(t) => t,
                _ => return,
            };
            (t.name.clone(), t.methods.clone())
        };
        let mut slots = Vec::with_capacity(methods.len());
        for m in methods.values() {
            let args: Vec<String> = m
                .params
                .iter()
                .map(|(n, t)| {
                    if n == "self" {
                        "i8*".to_string()
                    } else {
                        self.store.ir(*t)
                    }
                })
                .collect();
            slots.push(format!("{} ({})*", self.store.ir(m.ret), args.join(", ")));
        }
        self.w
            .writeline(&format!("%{name}.vt = type {{ {} }}", slots.join(", ")));
        self.w
            .writeline(&format!("%{name}.wrap = type {{ %{name}.vt*, i8* }}"));
        self.w.newline();
    }

    fn emit_variant(&mut self, id: TypeId) {
        match self.store.get_type(id) {
            Type::Array(elem) => {
                let elem = *elem;
                let name = self.store.ir(id);
                let elem_ir = self.store.ir(elem);
                self.w
                    .writeline(&format!("{name} = type {{ i64, {elem_ir}* }}"));
            }
            Type::Struct(s) if s.yields.is_some() => {
                // Generator contexts; the prelude owns the runtime's.
                if s.name.starts_with("runa.") {
                    return;
                }
                self.emit_struct_type(id);
            }
            _ => {}
        }
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn emit_function(
        &mut self,
        fun: &Function,
        globals: &FxHashMap<String, Value>,
    ) -> Result<(), Diagnostic> {
        if fun.flow.yields {
            return self.emit_generator(fun, globals);
        }

        let mut frame = Frame::new(globals.clone());
        let ret_ir = self.store.ir(fun.rtype());
        let mut params = Vec::with_capacity(fun.args.len());
        for arg in &fun.args {
            let ty = arg.ty.expect("argument typed");
            params.push(format!("{} %{}", self.store.ir(ty), arg.name));
            let val = Value::new(ty, format!("%{}", arg.name));
            if matches!(self.store.get_type(ty), Type::Owner(_)) {
                frame.track_owner(&arg.name, val.clone());
            }
            frame.bind(arg.name.clone(), val);
        }
        self.w.writeline(&format!(
            "define {ret_ir} @{}({}) {{",
            fun.irname,
            params.join(", ")
        ));
        self.w.indent();

        for (id, block) in &fun.flow.blocks {
            self.cur_block = *id;
            self.cur_preds = fun.flow.preds(*id).to_vec();
            self.w.label(&format!("L{id}"), block.anno.as_deref());
            for (sid, step) in block.steps.iter().enumerate() {
                self.cur_step = sid;
                self.lower_step(step, &mut frame)?;
            }
        }

        self.w.dedent();
        self.w.writeline("}");
        self.w.newline();
        Ok(())
    }

    /// Generators are emitted as resumable functions over their context
    /// struct: dispatch on the stored state, run until the next yield,
    /// store the value and the resume state, return whether a value was
    /// produced.
    fn emit_generator(
        &mut self,
        fun: &Function,
        globals: &FxHashMap<String, Value>,
    ) -> Result<(), Diagnostic> {
        let ctx = self
            .store
            .get(&format!("{}$ctx", fun.irname))
            .ok_or_else(|| self.internal(fun.span, "generator context was never registered"))?;
        let ctx_ir = self.store.ir(ctx);

        self.yield_indices.clear();
        let mut k = 0u64;
        for (id, block) in &fun.flow.blocks {
            for (sid, step) in block.steps.iter().enumerate() {
                if matches!(step, Step::Yield { .. }) {
                    k += 1;
                    self.yield_indices.insert((*id, sid), k);
                }
            }
        }
        let done = k + 1;
        self.gen_mode = Some(GenMode { ctx, done });

        let mut frame = Frame::new(globals.clone());
        self.w
            .writeline(&format!("define i1 @{}({ctx_ir}* %ctx) {{", fun.irname));
        self.w.indent();
        self.w.label("entry", Some("state dispatch"));

        let ctx_val = Value::new(self.store.ref_(ctx), "%ctx");
        let state_ptr = self.gep_value(&ctx_val, &[0, 0], &mut frame);
        let state = self.load_raw("i64*", &state_ptr, &mut frame);
        let mut cases: Vec<String> = (1..=k).map(|i| format!("i64 {i}, label %Y{i}")).collect();
        cases.push(format!("i64 {done}, label %LD"));
        self.w.writeline(&format!(
            "switch i64 {state}, label %L0 [ {} ]",
            cases.join(" ")
        ));

        for (id, block) in &fun.flow.blocks {
            self.cur_block = *id;
            self.cur_preds = fun.flow.preds(*id).to_vec();
            self.w.label(&format!("L{id}"), block.anno.as_deref());
            for (sid, step) in block.steps.iter().enumerate() {
                self.cur_step = sid;
                self.lower_step(step, &mut frame)?;
            }
        }

        self.w.label("LD", Some("exhausted"));
        self.w.writeline("ret i1 false");
        self.w.dedent();
        self.w.writeline("}");
        self.w.newline();
        self.gen_mode = None;
        Ok(())
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn lower_step(&mut self, step: &Step, frame: &mut Frame) -> Result<(), Diagnostic> {
        match step {
            Step::Expr(e) => {
                self.lower_expr(e, frame)?;
                Ok(())
            }
            Step::Assign { left, right } => self.lower_assign(left, right, frame),
            Step::Return { span, value } => self.lower_return(*span, value.as_ref(), frame),
            Step::Yield { span, value } => self.lower_yield(*span, value, frame),
            Step::Branch { target } => {
                self.w.writeline(&format!("br label %L{target}"));
                Ok(())
            }
            Step::CondBranch {
                cond,
                then_target,
                else_target,
            } => {
                let val = self
                    .lower_expr(cond, frame)?
                    .ok_or_else(|| self.internal(cond.span, "void condition"))?;
                let b = self.to_bool_reg(val, cond.span, frame)?;
                self.w.writeline(&format!(
                    "br i1 {b}, label %L{then_target}, label %L{else_target}"
                ));
                Ok(())
            }
            Step::LoopSetup {
                name,
                source,
                span,
                ty,
            } => self.lower_loop_setup(name, source, *span, *ty, frame),
            Step::LoopHeader {
                ctx,
                lvar,
                span,
                body,
                exit,
                ty,
            } => self.lower_loop_header(ctx, lvar, *span, *body, *exit, *ty, frame),
        }
    }

    fn lower_assign(&mut self, left: &Expr, right: &Expr, frame: &mut Frame) -> Result<(), Diagnostic> {
        let val = self
            .lower_expr(right, frame)?
            .ok_or_else(|| self.internal(right.span, "assignment from a void expression"))?;
        match &left.kind {
            ExprKind::Name(name) => {
                // A moved-from owner name stops being this frame's cleanup
                // responsibility.
                if let Some(rn) = right.as_name() {
                    if matches!(self.store.get_type(val.ty), Type::Owner(_)) {
                        frame.consume_owner(rn);
                    }
                }
                if let Some(slot) = self.ctx_slot(name) {
                    let (idx, slot_ty) = slot;
                    let ptr = self.ctx_field_ptr(idx, frame);
                    let cv = self.coerce(val, slot_ty, left.span, frame)?;
                    let ir = self.store.ir(cv.ty);
                    self.store_raw(&ir, &cv.var, &ptr);
                    return Ok(());
                }
                if matches!(self.store.get_type(val.ty), Type::Owner(_)) {
                    frame.track_owner(name, val.clone());
                }
                frame.bind(name.clone(), val);
                Ok(())
            }
            ExprKind::Attrib { .. } | ExprKind::Elem { .. } => {
                let target = self
                    .lower_expr(left, frame)?
                    .ok_or_else(|| self.internal(left.span, "void assignment target"))?;
                self.store_into(val, target, left.span, frame)
            }
            ExprKind::Tuple(dsts) => {
                let addr = self.ensure_addr(val, frame);
                for (i, dst) in dsts.iter().enumerate() {
                    let name = dst
                        .as_name()
                        .ok_or_else(|| self.internal(dst.span, "destructuring target"))?;
                    let ptr = self.gep_value(&addr, &[0, i as u32], frame);
                    let dty = dst.ty();
                    let rty = self.store.ref_(dty);
                    frame.bind(name.to_string(), Value::new(rty, ptr));
                }
                Ok(())
            }
            _ => Err(self.internal(left.span, "invalid assignment target")),
        }
    }

    /// Store `val` through the pointer `target`, loading once when the
    /// wrapper depths differ.
    pub(crate) fn store_into(
        &mut self,
        val: Value,
        target: Value,
        span: Span,
        frame: &mut Frame,
    ) -> Result<(), Diagnostic> {
        let inner = match self.store.get_type(target.ty) {
            Type::Ref(o) | Type::Owner(o) => *o,
            _ => return Err(self.internal(span, "assignment target is not a pointer")),
        };
        let cv = self.coerce(val, inner, span, frame)?;
        let ir = self.store.ir(cv.ty);
        self.store_raw(&ir, &cv.var, &target.var);
        Ok(())
    }

    fn lower_return(
        &mut self,
        span: Span,
        value: Option<&Expr>,
        frame: &mut Frame,
    ) -> Result<(), Diagnostic> {
        if let Some(r#gen) = &self.gen_mode {
            let done = r#gen.done;
            let ptr = self.ctx_field_ptr(0, frame);
            self.store_raw("i64", &done.to_string(), &ptr);
            self.w.writeline("ret i1 false");
            return Ok(());
        }
        match value {
            None => {
                self.cleanup_owners(span, frame)?;
                self.w.writeline("ret void");
                Ok(())
            }
            Some(v) => {
                let mut val = self
                    .lower_expr(v, frame)?
                    .ok_or_else(|| self.internal(span, "void return value"))?;
                if let Some(n) = v.as_name() {
                    if matches!(self.store.get_type(val.ty), Type::Owner(_)) {
                        frame.consume_owner(n);
                    }
                }
                self.cleanup_owners(span, frame)?;
                // Small by-value results are loaded out of their slot.
                if let Type::Ref(o) | Type::Owner(o) = *self.store.get_type(val.ty) {
                    if self.store.byval(o) {
                        val = self.load_value(&val, frame);
                    }
                }
                let ir = self.store.ir(val.ty);
                self.w.writeline(&format!("ret {ir} {}", val.var));
                Ok(())
            }
        }
    }

    /// Owner bindings still live at function exit get their destructors.
    fn cleanup_owners(&mut self, span: Span, frame: &mut Frame) -> Result<(), Diagnostic> {
        for (_, val) in frame.live_owners() {
            let method = self
                .store
                .struct_of(val.ty)
                .and_then(|s| s.methods.get("__del__"))
                .and_then(|ms| ms.first())
                .cloned();
            let Some(method) = method else { continue };
            let arg = self.coerce(val, method.params[0].1, span, frame)?;
            let ir = self.store.ir(arg.ty);
            self.w
                .writeline(&format!("call void @{}({ir} {})", method.irname, arg.var));
        }
        Ok(())
    }

    fn lower_yield(&mut self, span: Span, value: &Expr, frame: &mut Frame) -> Result<(), Diagnostic> {
        let r#gen = self
            .gen_mode
            .as_ref()
            .ok_or_else(|| self.internal(span, "yield outside a generator"))?;
        let ctx = r#gen.ctx;
        let idx = *self
            .yield_indices
            .get(&(self.cur_block, self.cur_step))
            .ok_or_else(|| self.internal(span, "unindexed yield"))?;
        let elem = self
            .store
            .struct_of(ctx)
            .and_then(|s| s.yields)
            .ok_or_else(|| self.internal(span, "generator context without element type"))?;

        let val = self
            .lower_expr(value, frame)?
            .ok_or_else(|| self.internal(span, "void yield value"))?;
        let cv = self.coerce(val, elem, span, frame)?;
        let vptr = self.ctx_field_ptr(1, frame);
        let ir = self.store.ir(cv.ty);
        self.store_raw(&ir, &cv.var, &vptr);
        let sptr = self.ctx_field_ptr(0, frame);
        self.store_raw("i64", &idx.to_string(), &sptr);
        self.w.writeline("ret i1 true");
        self.w.label(&format!("Y{idx}"), Some("resume"));
        Ok(())
    }

    fn lower_loop_setup(
        &mut self,
        name: &str,
        source: &Expr,
        span: Span,
        ty: Option<TypeId>,
        frame: &mut Frame,
    ) -> Result<(), Diagnostic> {
        let ctx = ty.ok_or_else(|| self.internal(span, "untyped loop setup"))?;
        let (args, params) = match &source.kind {
            ExprKind::Call {
                args,
                fun: Some(fun),
                ..
            } => {
                let params = match self.store.get_type(fun.ty) {
                    Type::Function(f) => f.params.clone(),
                    _ => Vec::new(),
                };
                (args, params)
            }
            _ => return Err(self.internal(span, "loop source is not a resolved call")),
        };

        let ctx_ir = self.store.ir(ctx);
        let slot = self.alloca(&ctx_ir, frame);
        let ctx_ref = self.store.ref_(ctx);
        let ctx_val = Value::new(ctx_ref, slot);

        // Slot 0 is the resume state; arguments land in slots 2+.
        let sptr = self.gep_value(&ctx_val, &[0, 0], frame);
        self.store_raw("i64", "0", &sptr);
        for (i, arg) in args.iter().enumerate() {
            let val = self
                .lower_expr(arg, frame)?
                .ok_or_else(|| self.internal(arg.span, "void generator argument"))?;
            let dst = params.get(i).copied().unwrap_or(val.ty);
            let cv = self.coerce(val, dst, arg.span, frame)?;
            let ptr = self.gep_value(&ctx_val, &[0, i as u32 + 2], frame);
            let ir = self.store.ir(cv.ty);
            self.store_raw(&ir, &cv.var, &ptr);
        }
        frame.bind(name.to_string(), ctx_val);
        Ok(())
    }

    fn lower_loop_header(
        &mut self,
        ctx: &str,
        lvar: &str,
        span: Span,
        body: BlockId,
        exit: BlockId,
        ty: Option<TypeId>,
        frame: &mut Frame,
    ) -> Result<(), Diagnostic> {
        let elem = ty.ok_or_else(|| self.internal(span, "untyped loop header"))?;
        let ctx_val = frame
            .get(ctx)
            .cloned()
            .ok_or_else(|| self.internal(span, format!("unbound loop context '{ctx}'")))?;
        let ctx_struct = self.store.unwrap(ctx_val.ty);
        let gen_name = {
            let s = self
                .store
                .struct_of(ctx_struct)
                .ok_or_else(|| self.internal(span, "loop context is not a struct"))?;
            s.name
                .strip_suffix("$ctx")
                .unwrap_or(&s.name)
                .to_string()
        };

        let ctx_ir = self.store.ir(ctx_val.ty);
        let cont = frame.varname();
        self.w.writeline(&format!(
            "{cont} = call i1 @{gen_name}({ctx_ir} {})",
            ctx_val.var
        ));
        let vptr = self.gep_value(&ctx_val, &[0, 1], frame);
        if let Some((idx, slot_ty)) = self.ctx_slot(lvar) {
            // Inside another generator the loop variable lives in our own
            // context, not in a register.
            let elem_ir = self.store.ir(elem);
            let loaded = self.load_raw(&format!("{elem_ir}*"), &vptr, frame);
            let own = self.ctx_field_ptr(idx, frame);
            let slot_ir = self.store.ir(slot_ty);
            self.store_raw(&slot_ir, &loaded, &own);
        } else {
            let rty = self.store.ref_(elem);
            frame.bind(lvar.to_string(), Value::new(rty, vptr));
        }
        self.w
            .writeline(&format!("br i1 {cont}, label %L{body}, label %L{exit}"));
        Ok(())
    }

    // ========================================================================
    // Small IR helpers
    // ========================================================================

    pub(crate) fn alloca(&mut self, ir: &str, frame: &mut Frame) -> String {
        let res = frame.varname();
        self.w.writeline(&format!("{res} = alloca {ir}"));
        res
    }

    /// `load <ptr-ir> <ptr>` - the pointer spelling carries its star.
    pub(crate) fn load_raw(&mut self, ptr_ir: &str, ptr: &str, frame: &mut Frame) -> String {
        let res = frame.varname();
        self.w.writeline(&format!("{res} = load {ptr_ir} {ptr}"));
        res
    }

    /// Load one wrapper level off a value.
    pub(crate) fn load_value(&mut self, val: &Value, frame: &mut Frame) -> Value {
        let over = match self.store.get_type(val.ty) {
            Type::Ref(o) | Type::Owner(o) => *o,
            _ => return val.clone(),
        };
        let ir = self.store.ir(val.ty);
        let res = self.load_raw(&ir, &val.var, frame);
        Value::new(over, res)
    }

    pub(crate) fn store_raw(&mut self, ir: &str, val: &str, dst: &str) {
        self.w.writeline(&format!("store {ir} {val}, {ir}* {dst}"));
    }

    /// `getelementptr` with constant `i32` indices against a typed value.
    pub(crate) fn gep_value(&mut self, val: &Value, idxs: &[u32], frame: &mut Frame) -> String {
        let ir = self.store.ir(val.ty);
        self.gep_raw(&ir, &val.var, idxs, frame)
    }

    pub(crate) fn gep_raw(
        &mut self,
        base_ir: &str,
        base: &str,
        idxs: &[u32],
        frame: &mut Frame,
    ) -> String {
        let res = frame.varname();
        let idx: Vec<String> = idxs.iter().map(|i| format!("i32 {i}")).collect();
        self.w.writeline(&format!(
            "{res} = getelementptr {base_ir} {base}, {}",
            idx.join(", ")
        ));
        res
    }

    /// Give a bare value an address: alloca a slot and store it.
    pub(crate) fn ensure_addr(&mut self, val: Value, frame: &mut Frame) -> Value {
        if self.store.is_wrapped(val.ty) {
            return val;
        }
        let ir = self.store.ir(val.ty);
        let slot = self.alloca(&ir, frame);
        self.store_raw(&ir, &val.var, &slot);
        let rty = self.store.ref_(val.ty);
        Value::new(rty, slot)
    }

    /// The generator-context slot a name is kept in, if emitting a
    /// generator body and the name has one.
    pub(crate) fn ctx_slot(&self, name: &str) -> Option<(u32, TypeId)> {
        let r#gen = self.gen_mode.as_ref()?;
        let s = self.store.struct_of(r#gen.ctx)?;
        s.attribs.get(name).copied()
    }

    /// Pointer to a field of the current generator context.
    pub(crate) fn ctx_field_ptr(&mut self, idx: u32, frame: &mut Frame) -> String {
        let ctx = self.gen_mode.as_ref().expect("generator mode").ctx;
        let rty = self.store.ref_(ctx);
        let val = Value::new(rty, "%ctx");
        self.gep_value(&val, &[0, idx], frame)
    }
}
