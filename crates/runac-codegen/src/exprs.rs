//! Expression lowering: literals, field access, arithmetic, comparisons,
//! short-circuit booleans, calls (direct, virtual, variadic, constructor),
//! coercion and trait wrapping.

use crate::codegen::CodeGen;
use crate::value::{Frame, Value};
use runac_ast::{BinOp, CmpOp, Expr, ExprKind, FunRef};
use runac_common::{Diagnostic, Span, TypeId};
use runac_types::{Method, Type};

/// Escape raw bytes for an LLIR `c"..."` constant.
pub(crate) fn llvm_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'"' | b'\\' => out.push_str(&format!("\\{b:02X}")),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:02X}")),
        }
    }
    out
}

impl<'a> CodeGen<'a> {
    /// Lower one expression to a value. Void calls yield `None`.
    pub(crate) fn lower_expr(
        &mut self,
        e: &Expr,
        frame: &mut Frame,
    ) -> Result<Option<Value>, Diagnostic> {
        let span = e.span;
        match &e.kind {
            ExprKind::NoneVal => Ok(Some(Value::new(e.ty(), "null"))),
            ExprKind::Bool(b) => Ok(Some(Value::new(e.ty(), if *b { "true" } else { "false" }))),
            ExprKind::Int(v) => Ok(Some(Value::new(e.ty(), v.to_string()))),
            ExprKind::Float(v) => {
                let mut s = format!("{v}");
                if !s.contains('.') && !s.contains('e') {
                    s.push_str(".0");
                }
                Ok(Some(Value::new(e.ty(), s)))
            }
            ExprKind::Str(s) => Ok(Some(self.lower_string(s, e.ty(), frame))),
            ExprKind::Name(name) => {
                if let Some((idx, slot_ty)) = self.ctx_slot(name) {
                    let ptr = self.ctx_field_ptr(idx, frame);
                    let rty = self.store.ref_(slot_ty);
                    return Ok(Some(Value::new(rty, ptr)));
                }
                frame
                    .get(name)
                    .cloned()
                    .map(Some)
                    .ok_or_else(|| self.internal(span, format!("unbound name '{name}'")))
            }
            ExprKind::Tuple(values) => self.lower_tuple(e.ty(), values, frame).map(Some),
            ExprKind::Init => self.lower_init(e, frame).map(Some),
            ExprKind::Attrib { obj, attrib } => {
                self.lower_attrib(obj, attrib, span, frame).map(Some)
            }
            ExprKind::Elem { obj, key } => self.lower_elem(obj, key, span, frame).map(Some),
            ExprKind::Not(value) => {
                let val = self.expect_value(value, frame)?;
                let b = self.to_bool_reg(val, span, frame)?;
                let res = frame.varname();
                self.w
                    .writeline(&format!("{res} = select i1 {b}, i1 false, i1 true"));
                Ok(Some(Value::new(self.store.bool_(), res)))
            }
            ExprKind::And { left, right } => self
                .lower_short_circuit(true, left, right, e.ty(), frame)
                .map(Some),
            ExprKind::Or { left, right } => self
                .lower_short_circuit(false, left, right, e.ty(), frame)
                .map(Some),
            ExprKind::Is { left, .. } => {
                let val = self.expect_value(left, frame)?;
                let ir = self.store.ir(val.ty);
                let res = frame.varname();
                self.w
                    .writeline(&format!("{res} = icmp eq {ir} {}, null", val.var));
                Ok(Some(Value::new(self.store.bool_(), res)))
            }
            ExprKind::Compare { op, left, right } => {
                self.lower_compare(*op, left, right, span, frame).map(Some)
            }
            ExprKind::Binary { op, left, right } => {
                self.lower_binary(*op, left, right, span, frame).map(Some)
            }
            ExprKind::As { value, .. } => self.lower_as(value, e.ty(), span, frame).map(Some),
            ExprKind::Ternary {
                cond,
                then_val,
                else_val,
            } => self
                .lower_ternary(cond, then_val, else_val, span, frame)
                .map(Some),
            ExprKind::Call {
                args,
                fun,
                virtual_,
                ..
            } => {
                let fun = fun
                    .as_ref()
                    .ok_or_else(|| self.internal(span, "unresolved call"))?
                    .clone();
                self.lower_call(span, args, &fun, *virtual_, frame)
            }
            ExprKind::Phi { left, right } => self.lower_phi(left, right, frame).map(Some),
        }
    }

    fn expect_value(&mut self, e: &Expr, frame: &mut Frame) -> Result<Value, Diagnostic> {
        let span = e.span;
        self.lower_expr(e, frame)?
            .ok_or_else(|| self.internal(span, "expected a value, found void"))
    }

    /// Load through all wrappers down to the core value.
    pub(crate) fn unwrap_loads(&mut self, mut val: Value, frame: &mut Frame) -> Value {
        while self.store.is_wrapped(val.ty) {
            val = self.load_value(&val, frame);
        }
        val
    }

    /// Reduce a value to a bare `i1` register or literal.
    pub(crate) fn to_bool_reg(
        &mut self,
        val: Value,
        span: Span,
        frame: &mut Frame,
    ) -> Result<String, Diagnostic> {
        let b = self.coerce(val, self.store.bool_(), span, frame)?;
        let b = self.unwrap_loads(b, frame);
        Ok(b.var)
    }

    // ========================================================================
    // Literals and allocation
    // ========================================================================

    fn lower_string(&mut self, s: &str, ty: TypeId, frame: &mut Frame) -> Value {
        let n = s.len();
        let dtype = format!("[{n} x i8]");
        let data = self.alloca(&dtype, frame);
        self.store_raw(&dtype, &format!("c\"{}\"", llvm_escape(s)), &data);

        let full = self.alloca("%str", frame);
        let lenptr = self.gep_raw("%str*", &full, &[0, 0], frame);
        self.store_raw("i64", &n.to_string(), &lenptr);

        let cast = frame.varname();
        self.w
            .writeline(&format!("{cast} = bitcast {dtype}* {data} to i8*"));
        let dptr = self.gep_raw("%str*", &full, &[0, 1], frame);
        self.store_raw("i8*", &cast, &dptr);
        Value::new(ty, full)
    }

    /// Allocation for a constructor call: stack slot, or heap via the size
    /// global when escape analysis says the value outlives the frame.
    fn lower_init(&mut self, e: &Expr, frame: &mut Frame) -> Result<Value, Diagnostic> {
        let ty = e.ty();
        let core = self.store.unwrap(ty);
        if !e.escapes {
            let ir = self.store.ir(core);
            let slot = self.alloca(&ir, frame);
            return Ok(Value::new(ty, slot));
        }
        let size_global = self
            .store
            .size_global(core)
            .ok_or_else(|| self.internal(e.span, "escaping allocation of a non-struct"))?;
        let size = self.load_raw("i64*", &size_global, frame);
        let raw = frame.varname();
        self.w
            .writeline(&format!("{raw} = call i8* @runa.malloc(i64 {size})"));
        let res = frame.varname();
        let ptr_ir = self.store.ir(ty);
        self.w
            .writeline(&format!("{res} = bitcast i8* {raw} to {ptr_ir}"));
        Ok(Value::new(ty, res))
    }

    fn lower_tuple(
        &mut self,
        ty: TypeId,
        values: &[Expr],
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let elems = match self.store.get_type(ty) {
            Type::Tuple(elems) => elems.clone(),
            _ => return Err(self.internal(Span::dummy(), "tuple literal without tuple type")),
        };
        let ir = self.store.ir(ty);
        let slot = self.alloca(&ir, frame);
        for (i, v) in values.iter().enumerate() {
            let val = self.expect_value(v, frame)?;
            let cv = self.coerce(val, elems[i], v.span, frame)?;
            let ptr = self.gep_raw(&format!("{ir}*"), &slot, &[0, i as u32], frame);
            let cir = self.store.ir(cv.ty);
            self.store_raw(&cir, &cv.var, &ptr);
        }
        let rty = self.store.ref_(ty);
        Ok(Value::new(rty, slot))
    }

    // ========================================================================
    // Field and element access
    // ========================================================================

    fn lower_attrib(
        &mut self,
        obj: &Expr,
        attrib: &str,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let objv = self.expect_value(obj, frame)?;
        let addr = self.ensure_addr(objv, frame);
        let core = self.store.unwrap(addr.ty);
        let (idx, aty) = self
            .store
            .struct_of(core)
            .and_then(|s| s.attribs.get(attrib).copied())
            .ok_or_else(|| self.internal(span, format!("missing attribute '{attrib}'")))?;
        // Geps against the one-level pointer, however deep the source was.
        let base = self.reduce_to_single_ref(addr, frame);
        let ptr = self.gep_value(&base, &[0, idx], frame);
        let rty = self.store.ref_(aty);
        Ok(Value::new(rty, ptr))
    }

    /// Load until exactly one wrapper remains.
    fn reduce_to_single_ref(&mut self, mut val: Value, frame: &mut Frame) -> Value {
        loop {
            let (_, depth) = self.store.strip(val.ty);
            if depth <= 1 {
                return val;
            }
            val = self.load_value(&val, frame);
        }
    }

    fn lower_elem(
        &mut self,
        obj: &Expr,
        key: &Expr,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let objv = self.expect_value(obj, frame)?;
        let addr = self.ensure_addr(objv, frame);
        let base = self.reduce_to_single_ref(addr, frame);
        let elem = match self.store.get_type(self.store.unwrap(base.ty)) {
            Type::Array(elem) => *elem,
            _ => return Err(self.internal(span, "indexing a non-array")),
        };
        let elem_ir = self.store.ir(elem);
        let dptr = self.gep_value(&base, &[0, 1], frame);
        let data = self.load_raw(&format!("{elem_ir}**"), &dptr, frame);

        let keyv = self.expect_value(key, frame)?;
        let kv = self.unwrap_loads(keyv, frame);
        let kir = self.store.ir(kv.ty);
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = getelementptr {elem_ir}* {data}, {kir} {}",
            kv.var
        ));
        let rty = self.store.ref_(elem);
        Ok(Value::new(rty, res))
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn lower_compare(
        &mut self,
        op: CmpOp,
        left: &Expr,
        right: &Expr,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let lv = self.expect_value(left, frame)?;
        let rv = self.expect_value(right, frame)?;
        let core = self.store.unwrap(lv.ty);
        let boolean = self.store.bool_();

        if matches!(
            self.store.get_type(core),
            Type::Int { .. } | Type::Bool | Type::Byte
        ) {
            let l = self.unwrap_loads(lv, frame);
            let r = self.unwrap_loads(rv, frame);
            let signed = matches!(self.store.get_type(l.ty), Type::Int { signed: true, .. });
            let cond = match op {
                CmpOp::Eq => "eq".to_string(),
                CmpOp::Ne => "ne".to_string(),
                CmpOp::Lt => format!("{}lt", if signed { "s" } else { "u" }),
                CmpOp::Gt => format!("{}gt", if signed { "s" } else { "u" }),
            };
            let ir = self.store.ir(l.ty);
            let res = frame.varname();
            self.w.writeline(&format!(
                "{res} = icmp {cond} {ir} {}, {}",
                l.var, r.var
            ));
            return Ok(Value::new(boolean, res));
        }

        if matches!(self.store.get_type(core), Type::Float { .. }) {
            let l = self.unwrap_loads(lv, frame);
            let r = self.unwrap_loads(rv, frame);
            let cond = match op {
                CmpOp::Eq => "oeq",
                CmpOp::Ne => "one",
                CmpOp::Lt => "olt",
                CmpOp::Gt => "ogt",
            };
            let ir = self.store.ir(l.ty);
            let res = frame.varname();
            self.w.writeline(&format!(
                "{res} = fcmp {cond} {ir} {}, {}",
                l.var, r.var
            ));
            return Ok(Value::new(boolean, res));
        }

        // User types compare through their methods; `!=` falls back to an
        // inverted `__eq__` when no `__ne__` exists.
        let (method, invert) = match self.find_method(core, op.method_name()) {
            Some(m) => (m, false),
            None if op == CmpOp::Ne => {
                let m = self.find_method(core, "__eq__").ok_or_else(|| {
                    self.internal(span, "no __eq__ method for comparison")
                })?;
                (m, true)
            }
            None => {
                return Err(self.internal(
                    span,
                    format!("no {} method for comparison", op.method_name()),
                ));
            }
        };
        let res = self.emit_method_call(&method, &[lv, rv], span, frame)?;
        if invert {
            let inv = frame.varname();
            self.w.writeline(&format!(
                "{inv} = select i1 {}, i1 false, i1 true",
                res.var
            ));
            return Ok(Value::new(boolean, inv));
        }
        Ok(res)
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let lv = self.expect_value(left, frame)?;
        let rv = self.expect_value(right, frame)?;
        let core = self.store.unwrap(lv.ty);

        if let Type::Int { signed, .. } = *self.store.get_type(core) {
            let l = self.unwrap_loads(lv, frame);
            let r = self.unwrap_loads(rv, frame);
            let opcode = match op {
                BinOp::Add => "add",
                BinOp::Sub => "sub",
                BinOp::Mul => "mul",
                BinOp::Div => {
                    if signed {
                        "sdiv"
                    } else {
                        "udiv"
                    }
                }
                BinOp::Mod => {
                    if signed {
                        "srem"
                    } else {
                        "urem"
                    }
                }
                BinOp::BwAnd => "and",
                BinOp::BwOr => "or",
                BinOp::BwXor => "xor",
            };
            let ir = self.store.ir(l.ty);
            let res = frame.varname();
            self.w
                .writeline(&format!("{res} = {opcode} {ir} {}, {}", l.var, r.var));
            return Ok(Value::new(l.ty, res));
        }

        if matches!(self.store.get_type(core), Type::Float { .. }) {
            let l = self.unwrap_loads(lv, frame);
            let r = self.unwrap_loads(rv, frame);
            let opcode = match op {
                BinOp::Add => "fadd",
                BinOp::Sub => "fsub",
                BinOp::Mul => "fmul",
                BinOp::Div => "fdiv",
                _ => return Err(self.internal(span, "integer operator on floats")),
            };
            let ir = self.store.ir(l.ty);
            let res = frame.varname();
            self.w
                .writeline(&format!("{res} = {opcode} {ir} {}, {}", l.var, r.var));
            return Ok(Value::new(l.ty, res));
        }

        let method = self.find_method(core, op.method_name()).ok_or_else(|| {
            self.internal(span, format!("no {} method", op.method_name()))
        })?;
        self.emit_method_call(&method, &[lv, rv], span, frame)
    }

    fn lower_as(
        &mut self,
        value: &Expr,
        dst: TypeId,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let val = self.expect_value(value, frame)?;
        let v = self.unwrap_loads(val, frame);
        if v.ty == dst {
            return Ok(Value::new(dst, v.var));
        }
        match (self.store.get_type(v.ty), self.store.get_type(dst)) {
            (
                Type::Int {
                    signed, width: sw, ..
                },
                Type::Int { width: dw, .. },
            ) => {
                if sw.bits() == dw.bits() {
                    return Ok(Value::new(dst, v.var));
                }
                let op = if *signed { "sext" } else { "zext" };
                let sir = self.store.ir(v.ty);
                let dir = self.store.ir(dst);
                let res = frame.varname();
                self.w
                    .writeline(&format!("{res} = {op} {sir} {} to {dir}", v.var));
                Ok(Value::new(dst, res))
            }
            (Type::Float { bits: sb }, Type::Float { bits: db }) => {
                if sb == db {
                    return Ok(Value::new(dst, v.var));
                }
                let sir = self.store.ir(v.ty);
                let dir = self.store.ir(dst);
                let res = frame.varname();
                self.w
                    .writeline(&format!("{res} = fpext {sir} {} to {dir}", v.var));
                Ok(Value::new(dst, res))
            }
            _ => Err(self.internal(span, "unsupported conversion")),
        }
    }

    /// Short-circuit `and`/`or`: an explicit branch diamond joined by a
    /// phi, so the right side only evaluates when it must.
    fn lower_short_circuit(
        &mut self,
        is_and: bool,
        left: &Expr,
        right: &Expr,
        res_ty: TypeId,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let word = if is_and { "and" } else { "or" };
        let lval = self.expect_value(left, frame)?;
        let lb = self.to_bool_reg(lval.clone(), left.span, frame)?;
        let typed = left.ty() == right.ty();

        let short = self.w.getlabel("B");
        let eval = self.w.getlabel("B");
        let join = self.w.getlabel("B");
        if is_and {
            self.w
                .writeline(&format!("br i1 {lb}, label %{eval}, label %{short}"));
        } else {
            self.w
                .writeline(&format!("br i1 {lb}, label %{short}, label %{eval}"));
        }

        self.w.label(&short, Some(&format!("{word}-short")));
        let short_var = if typed {
            lval.var.clone()
        } else if is_and {
            "false".to_string()
        } else {
            "true".to_string()
        };
        self.w.writeline(&format!("br label %{join}"));

        self.w.label(&eval, Some(&format!("{word}-rhs")));
        let rval = self.expect_value(right, frame)?;
        let rhs_var = if typed {
            rval.var.clone()
        } else {
            self.to_bool_reg(rval, right.span, frame)?
        };
        let rhs_label = self.w.current_label.clone();
        self.w.writeline(&format!("br label %{join}"));

        self.w.label(&join, Some(&format!("{word}-join")));
        let ir = if typed {
            self.store.ir(lval.ty)
        } else {
            "i1".to_string()
        };
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = phi {ir} [ {short_var}, %{short} ], [ {rhs_var}, %{rhs_label} ]"
        ));
        Ok(Value::new(res_ty, res))
    }

    fn lower_ternary(
        &mut self,
        cond: &Expr,
        then_val: &Expr,
        else_val: &Expr,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let cv = self.expect_value(cond, frame)?;
        let b = self.to_bool_reg(cv, span, frame)?;

        let ltrue = self.w.getlabel("T");
        let lfalse = self.w.getlabel("T");
        let ljoin = self.w.getlabel("T");
        self.w
            .writeline(&format!("br i1 {b}, label %{ltrue}, label %{lfalse}"));

        self.w.label(&ltrue, Some("ternary-left"));
        let tv = self.expect_value(then_val, frame)?;
        let tlabel = self.w.current_label.clone();
        self.w.writeline(&format!("br label %{ljoin}"));

        self.w.label(&lfalse, Some("ternary-right"));
        let ev = self.expect_value(else_val, frame)?;
        let elabel = self.w.current_label.clone();
        self.w.writeline(&format!("br label %{ljoin}"));

        self.w.label(&ljoin, Some("ternary-join"));
        let ir = self.store.ir(tv.ty);
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = phi {ir} [ {}, %{tlabel} ], [ {}, %{elabel} ]",
            tv.var, ev.var
        ));
        Ok(Value::new(tv.ty, res))
    }

    /// A phi over predecessor values. Arms must already be values
    /// (names or literals) and are listed in the predecessor order the
    /// CFG records for this block.
    fn lower_phi(
        &mut self,
        left: &(u32, Box<Expr>),
        right: &(u32, Box<Expr>),
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let mut arms = [(left.0, &*left.1), (right.0, &*right.1)];
        if self.cur_preds.len() == 2 && self.cur_preds[0] == arms[1].0 {
            arms.swap(0, 1);
        }
        let a = self.phi_arm_value(arms[0].1, frame)?;
        let b = self.phi_arm_value(arms[1].1, frame)?;
        let ir = self.store.ir(a.ty);
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = phi {ir} [ {}, %L{} ], [ {}, %L{} ]",
            a.var, arms[0].0, b.var, arms[1].0
        ));
        Ok(Value::new(a.ty, res))
    }

    fn phi_arm_value(&mut self, e: &Expr, frame: &mut Frame) -> Result<Value, Diagnostic> {
        match &e.kind {
            ExprKind::Name(n) => frame
                .get(n)
                .cloned()
                .ok_or_else(|| self.internal(e.span, format!("unbound phi arm '{n}'"))),
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::NoneVal => {
                Ok(self.lower_expr(e, frame)?.expect("literal value"))
            }
            _ => Err(self.internal(e.span, "phi arm must be a name or literal")),
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    pub(crate) fn lower_call(
        &mut self,
        span: Span,
        args: &[Expr],
        fun: &FunRef,
        virtual_: bool,
        frame: &mut Frame,
    ) -> Result<Option<Value>, Diagnostic> {
        let f = match self.store.get_type(fun.ty) {
            Type::Function(f) => f.clone(),
            _ => return Err(self.internal(span, "callee is not a function")),
        };

        let mut lowered: Vec<Value> = Vec::with_capacity(args.len());
        let mut wrapped: Option<Value> = None;
        let mut init_val: Option<Value> = None;
        for (i, arg) in args.iter().enumerate() {
            if virtual_ && i == 0 {
                // The wrapped receiver: pass the erased object pointer.
                let val = self.expect_value(arg, frame)?;
                wrapped = Some(val.clone());
                let op = self.gep_value(&val, &[0, 1], frame);
                let objp = self.load_raw("i8**", &op, frame);
                let byte = self.store.byte();
                let rb = self.store.ref_(byte);
                lowered.push(Value::new(rb, objp));
                continue;
            }
            let val = self.expect_value(arg, frame)?;
            if matches!(arg.kind, ExprKind::Init) {
                init_val = Some(val.clone());
            }
            if i < f.params.len() {
                let cv = self.coerce(val, f.params[i], arg.span, frame)?;
                lowered.push(cv);
            } else {
                // Variadic tail: arguments pass with their natural types.
                let cv = self.unwrap_loads(val, frame);
                lowered.push(cv);
            }
        }

        // Names given to owner parameters leave this frame's care.
        for (i, &p) in f.params.iter().enumerate() {
            if matches!(self.store.get_type(p), Type::Owner(_)) {
                if let Some(n) = args.get(i).and_then(Expr::as_name) {
                    frame.consume_owner(n);
                }
            }
        }

        let ret = f.ret;
        let ret_ir = self.store.ir(ret);
        let callee = if f.variadic {
            let mut ps: Vec<String> = f.params.iter().map(|&t| self.store.ir(t)).collect();
            ps.push("...".to_string());
            format!("{ret_ir} ({})* @{}", ps.join(", "), fun.decl)
        } else if !virtual_ {
            format!("{ret_ir} @{}", fun.decl)
        } else {
            self.virtual_callee(span, fun, &f.params, ret, wrapped, frame)?
        };

        let arg_str: Vec<String> = lowered
            .iter()
            .map(|v| format!("{} {}", self.store.ir(v.ty), v.var))
            .collect();
        let arg_str = arg_str.join(", ");

        if ret == self.store.void() {
            self.w.writeline(&format!("call {callee}({arg_str})"));
            return Ok(init_val);
        }
        let res = frame.varname();
        self.w
            .writeline(&format!("{res} = call {callee}({arg_str})"));
        Ok(Some(Value::new(ret, res)))
    }

    /// Virtual dispatch: load the vtable from wrap slot 0, then the
    /// function pointer at the method's lexicographic slot.
    fn virtual_callee(
        &mut self,
        span: Span,
        fun: &FunRef,
        params: &[TypeId],
        ret: TypeId,
        wrapped: Option<Value>,
        frame: &mut Frame,
    ) -> Result<String, Diagnostic> {
        let wrapv =
            wrapped.ok_or_else(|| self.internal(span, "virtual call without a receiver"))?;
        let mname = fun.method_name().to_string();
        let (tname, slot) = {
            let t = self
                .store
                .trait_of(params[0])
                .ok_or_else(|| self.internal(span, "virtual call on a non-trait receiver"))?;
            let slot = t
                .slot(&mname)
                .ok_or_else(|| self.internal(span, format!("no vtable slot for '{mname}'")))?;
            (t.name.clone(), slot as u32)
        };

        let vtn = format!("%{tname}.vt");
        let vtpp = self.gep_value(&wrapv, &[0, 0], frame);
        let vt = self.load_raw(&format!("{vtn}**"), &vtpp, frame);
        let fpp = self.gep_raw(&format!("{vtn}*"), &vt, &[0, slot], frame);

        let ret_ir = self.store.ir(ret);
        let mut sig: Vec<String> = vec!["i8*".to_string()];
        sig.extend(params.iter().skip(1).map(|&t| self.store.ir(t)));
        let ft = format!("{ret_ir} ({})*", sig.join(", "));
        let freg = self.load_raw(&format!("{ft}*"), &fpp, frame);
        Ok(format!("{ft} {freg}"))
    }

    fn find_method(&self, core: TypeId, name: &str) -> Option<Method> {
        self.store
            .struct_of(core)
            .and_then(|s| s.methods.get(name))
            .and_then(|ms| ms.first())
            .cloned()
    }

    fn emit_method_call(
        &mut self,
        method: &Method,
        args: &[Value],
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let mut parts = Vec::with_capacity(args.len());
        for (val, (_, pty)) in args.iter().zip(method.params.iter()) {
            let cv = self.coerce(val.clone(), *pty, span, frame)?;
            parts.push(format!("{} {}", self.store.ir(cv.ty), cv.var));
        }
        let ret_ir = self.store.ir(method.ret);
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = call {ret_ir} @{}({})",
            method.irname,
            parts.join(", ")
        ));
        Ok(Value::new(method.ret, res))
    }

    // ========================================================================
    // Coercion and trait wrapping
    // ========================================================================

    /// Adjust a value to a destination type at a call or return site:
    /// shed wrappers through loads, widen integers, build trait wrappers,
    /// and reduce to `bool` through `__bool__` or a zero test.
    pub(crate) fn coerce(
        &mut self,
        val: Value,
        dst: TypeId,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        if val.ty == dst {
            return Ok(val);
        }
        let (vcore, _) = self.store.strip(val.ty);
        let (dcore, ddepth) = self.store.strip(dst);
        let boolean = self.store.bool_();

        if dcore == boolean && vcore != boolean && ddepth == 0 {
            return self.coerce_bool(val, span, frame);
        }

        let mut val = val;
        loop {
            let (_, vd) = self.store.strip(val.ty);
            if vd <= ddepth {
                break;
            }
            val = self.load_value(&val, frame);
        }
        let (vcore, vdepth) = self.store.strip(val.ty);

        if vcore == dcore && vdepth == ddepth {
            // Only the wrapper kinds differ (owner vs ref); same pointer.
            return Ok(Value::new(dst, val.var));
        }

        if vdepth == 0 && ddepth == 0 {
            if let (
                Type::Int {
                    signed, width: sw, ..
                },
                Type::Int { width: dw, .. },
            ) = (self.store.get_type(val.ty), self.store.get_type(dst))
            {
                if dw.bits() > sw.bits() {
                    let op = if *signed { "sext" } else { "zext" };
                    let sir = self.store.ir(val.ty);
                    let dir = self.store.ir(dst);
                    let res = frame.varname();
                    self.w
                        .writeline(&format!("{res} = {op} {sir} {} to {dir}", val.var));
                    return Ok(Value::new(dst, res));
                }
            }
        }

        if matches!(self.store.get_type(dcore), Type::Trait(_))
            && matches!(self.store.get_type(vcore), Type::Struct(_))
        {
            return self.traitwrap(val, dst, span, frame);
        }

        Err(self.internal(
            span,
            format!(
                "cannot coerce '{}' to '{}'",
                self.store.name(val.ty),
                self.store.name(dst)
            ),
        ))
    }

    fn coerce_bool(
        &mut self,
        val: Value,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let boolean = self.store.bool_();
        let core = self.store.unwrap(val.ty);
        if matches!(self.store.get_type(core), Type::Int { .. }) {
            let v = self.unwrap_loads(val, frame);
            let ir = self.store.ir(v.ty);
            let res = frame.varname();
            self.w
                .writeline(&format!("{res} = icmp ne {ir} {}, 0", v.var));
            return Ok(Value::new(boolean, res));
        }
        let method = self
            .find_method(core, "__bool__")
            .ok_or_else(|| self.internal(span, "no __bool__ method"))?;
        let addr = self.ensure_addr(val, frame);
        let arg = self.reduce_to_single_ref(addr, frame);
        let ir = self.store.ir(arg.ty);
        let res = frame.varname();
        self.w.writeline(&format!(
            "{res} = call i1 @{}({ir} {})",
            method.irname, arg.var
        ));
        Ok(Value::new(boolean, res))
    }

    /// Wrap a concrete value for a trait-typed destination: stack
    /// `%T.wrap` and `%T.vt` records, the vtable filled slot by slot in
    /// lexicographic method order with the concrete type's function
    /// pointers bitcast to the `self`-erased signatures.
    pub(crate) fn traitwrap(
        &mut self,
        val: Value,
        dst: TypeId,
        span: Span,
        frame: &mut Frame,
    ) -> Result<Value, Diagnostic> {
        let val = self.ensure_addr(val, frame);
        let val = self.reduce_to_single_ref(val, frame);

        let trait_core = self.store.unwrap(dst);
        let (tname, tmethods) = {
            let t = self
                .store
                .trait_of(trait_core)
                .ok_or_else(|| self.internal(span, "trait wrap of a non-trait"))?;
            (t.name.clone(), t.methods.clone())
        };
        let concrete = self.store.unwrap(val.ty);

        let wrap_ir = format!("%{tname}.wrap");
        let vt_ir = format!("%{tname}.vt");
        let wrap = self.alloca(&wrap_ir, frame);
        let vt = self.alloca(&vt_ir, frame);

        for (i, (mname, sig)) in tmethods.iter().enumerate() {
            let imeth = self.find_method(concrete, mname).ok_or_else(|| {
                self.internal(span, format!("'{mname}' missing on concrete type"))
            })?;
            let orig: Vec<String> = imeth
                .params
                .iter()
                .map(|&(_, t)| self.store.ir(t))
                .collect();
            let orig_sig = format!("{} ({})*", self.store.ir(imeth.ret), orig.join(", "));
            let mut erased = orig.clone();
            erased[0] = "i8*".to_string();
            let erased_sig = format!("{} ({})*", self.store.ir(sig.ret), erased.join(", "));

            let cast = frame.varname();
            self.w.writeline(&format!(
                "{cast} = bitcast {orig_sig} @{} to {erased_sig}",
                imeth.irname
            ));
            let slot = self.gep_raw(&format!("{vt_ir}*"), &vt, &[0, i as u32], frame);
            self.store_raw(&erased_sig, &cast, &slot);
        }

        let vt_slot = self.gep_raw(&format!("{wrap_ir}*"), &wrap, &[0, 0], frame);
        self.store_raw(&format!("{vt_ir}*"), &vt, &vt_slot);

        let cast = frame.varname();
        let vir = self.store.ir(val.ty);
        self.w
            .writeline(&format!("{cast} = bitcast {vir} {} to i8*", val.var));
        let obj_slot = self.gep_raw(&format!("{wrap_ir}*"), &wrap, &[0, 1], frame);
        self.store_raw("i8*", &cast, &obj_slot);

        Ok(Value::new(dst, wrap))
    }
}
