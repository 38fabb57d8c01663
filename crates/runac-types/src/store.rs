//! The type registry.
//!
//! One `TypeStore` lives per compiled module. Primitives are interned at
//! construction; user types go through `add` (placeholder) then `fill`
//! (bind members); wrapper and parametric constructors are memoized by
//! parameter identity so equal types share one id.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::types::{FunctionType, IntWidth, Method, StructType, TraitType, Type};
use runac_ast::{ClassDecl, MethodSig, TraitDecl, TypeDecl, TypeExpr};
use runac_common::{Diagnostic, Span, TypeId, codes};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum MemoKey {
    Ref(TypeId),
    Owner(TypeId),
    Array(TypeId),
    Iter(TypeId),
    Tuple(Vec<TypeId>),
    Function(TypeId, Vec<TypeId>, bool),
}

#[derive(Debug)]
pub struct TypeStore {
    types: Vec<Type>,
    by_name: FxHashMap<String, TypeId>,
    memo: FxHashMap<MemoKey, TypeId>,
}

const PRIMITIVE_INTS: &[(&str, bool, IntWidth)] = &[
    ("i8", true, IntWidth::W8),
    ("i16", true, IntWidth::W16),
    ("i32", true, IntWidth::W32),
    ("i64", true, IntWidth::W64),
    ("word", true, IntWidth::Word),
    ("u8", false, IntWidth::W8),
    ("u16", false, IntWidth::W16),
    ("u32", false, IntWidth::W32),
    ("u64", false, IntWidth::W64),
    ("uword", false, IntWidth::Word),
];

impl TypeStore {
    pub fn new() -> Self {
        let mut store = TypeStore {
            types: Vec::new(),
            by_name: FxHashMap::default(),
            memo: FxHashMap::default(),
        };
        for &(name, signed, width) in PRIMITIVE_INTS {
            store.intern_named(name, Type::Int { signed, width });
        }
        store.intern_named("f32", Type::Float { bits: 32 });
        store.intern_named("f64", Type::Float { bits: 64 });
        store.intern_named("bool", Type::Bool);
        store.intern_named("byte", Type::Byte);
        store.intern_named("void", Type::Void);
        store.intern_named("NoType", Type::NoType);
        store.intern_named("anyint", Type::AnyInt);
        store.intern_named("anyfloat", Type::AnyFloat);
        store.register_str();
        store
    }

    /// The runtime `str` type: `{ len: uword, data: &byte }` plus the
    /// methods the prelude implements for it.
    fn register_str(&mut self) {
        let id = self.intern_named("str", Type::Void);
        let uword = self.get("uword").unwrap();
        let byte = self.get("byte").unwrap();
        let boolean = self.get("bool").unwrap();
        let data = self.ref_(byte);
        let self_ty = self.ref_(id);

        let mut attribs = IndexMap::new();
        attribs.insert("len".to_string(), (0, uword));
        attribs.insert("data".to_string(), (1, data));

        let mut methods = BTreeMap::new();
        methods.insert(
            "__bool__".to_string(),
            vec![Method {
                irname: "str.__bool__".to_string(),
                ret: boolean,
                params: vec![("self".to_string(), self_ty)],
            }],
        );
        methods.insert(
            "__eq__".to_string(),
            vec![Method {
                irname: "str.__eq__".to_string(),
                ret: boolean,
                params: vec![
                    ("self".to_string(), self_ty),
                    ("other".to_string(), self_ty),
                ],
            }],
        );
        self.types[id.index()] = Type::Struct(StructType {
            name: "str".to_string(),
            attribs,
            methods,
            yields: None,
        });
    }

    fn intern_named(&mut self, name: &str, ty: Type) -> TypeId {
        let id = self.push(ty);
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Look up a primitive or previously added name.
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn get_type(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    // Frequently used primitives.

    pub fn void(&self) -> TypeId {
        self.by_name["void"]
    }

    pub fn bool_(&self) -> TypeId {
        self.by_name["bool"]
    }

    pub fn byte(&self) -> TypeId {
        self.by_name["byte"]
    }

    pub fn str_(&self) -> TypeId {
        self.by_name["str"]
    }

    pub fn no_type(&self) -> TypeId {
        self.by_name["NoType"]
    }

    pub fn any_int(&self) -> TypeId {
        self.by_name["anyint"]
    }

    pub fn any_float(&self) -> TypeId {
        self.by_name["anyfloat"]
    }

    pub fn uword(&self) -> TypeId {
        self.by_name["uword"]
    }

    // Wrapper and parametric constructors, memoized by parameter identity.

    pub fn ref_(&mut self, over: TypeId) -> TypeId {
        self.memoized(MemoKey::Ref(over), Type::Ref(over))
    }

    pub fn owner(&mut self, over: TypeId) -> TypeId {
        self.memoized(MemoKey::Owner(over), Type::Owner(over))
    }

    pub fn array(&mut self, elem: TypeId) -> TypeId {
        self.memoized(MemoKey::Array(elem), Type::Array(elem))
    }

    pub fn iter(&mut self, elem: TypeId) -> TypeId {
        self.memoized(MemoKey::Iter(elem), Type::Iter(elem))
    }

    pub fn tuple(&mut self, elems: Vec<TypeId>) -> TypeId {
        self.memoized(MemoKey::Tuple(elems.clone()), Type::Tuple(elems))
    }

    pub fn function(&mut self, ret: TypeId, params: Vec<TypeId>, variadic: bool) -> TypeId {
        self.memoized(
            MemoKey::Function(ret, params.clone(), variadic),
            Type::Function(FunctionType {
                ret,
                params,
                variadic,
            }),
        )
    }

    fn memoized(&mut self, key: MemoKey, ty: Type) -> TypeId {
        if let Some(&id) = self.memo.get(&key) {
            return id;
        }
        let id = self.push(ty);
        self.memo.insert(key, id);
        id
    }

    /// Build the function type of a method (ret + parameter types).
    pub fn method_fn_type(&mut self, method: &Method) -> TypeId {
        let params = method.param_types();
        self.function(method.ret, params, false)
    }

    /// Strip all `ref`/`owner` wrappers.
    pub fn unwrap(&self, mut id: TypeId) -> TypeId {
        loop {
            match self.get_type(id) {
                Type::Ref(over) | Type::Owner(over) => id = *over,
                _ => return id,
            }
        }
    }

    /// Strip wrappers, counting the depth removed.
    pub fn strip(&self, mut id: TypeId) -> (TypeId, u32) {
        let mut depth = 0;
        loop {
            match self.get_type(id) {
                Type::Ref(over) | Type::Owner(over) => {
                    id = *over;
                    depth += 1;
                }
                _ => return (id, depth),
            }
        }
    }

    pub fn is_wrapped(&self, id: TypeId) -> bool {
        self.get_type(id).is_wrapper()
    }

    pub fn is_int(&self, id: TypeId) -> bool {
        matches!(self.get_type(id), Type::Int { .. } | Type::AnyInt)
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        matches!(self.get_type(id), Type::Float { .. } | Type::AnyFloat)
    }

    pub fn is_unresolved(&self, id: TypeId) -> bool {
        matches!(self.get_type(id), Type::AnyInt | Type::AnyFloat)
    }

    /// Small types passed and returned by value in emitted code.
    pub fn byval(&self, id: TypeId) -> bool {
        matches!(
            self.get_type(id),
            Type::Int { .. } | Type::Float { .. } | Type::Bool | Type::Byte
        )
    }

    pub fn struct_of(&self, id: TypeId) -> Option<&StructType> {
        match self.get_type(self.unwrap(id)) {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn trait_of(&self, id: TypeId) -> Option<&TraitType> {
        match self.get_type(self.unwrap(id)) {
            Type::Trait(t) => Some(t),
            _ => None,
        }
    }

    // Two-phase user type materialization.

    /// Register a named struct/trait placeholder so recursive references
    /// resolve by name before members are bound.
    pub fn add(&mut self, decl: &TypeDecl) -> Result<TypeId, Diagnostic> {
        let name = decl.name();
        if self.by_name.contains_key(name) {
            return Err(Diagnostic::error(
                decl.span(),
                codes::DUPLICATE_DEFINITION,
                format!("duplicate definition of type '{name}'"),
            ));
        }
        trace!(name, "registering type placeholder");
        let placeholder = match decl {
            TypeDecl::Class(c) => Type::Struct(StructType {
                name: c.name.clone(),
                attribs: IndexMap::new(),
                methods: BTreeMap::new(),
                yields: None,
            }),
            TypeDecl::Trait(t) => Type::Trait(TraitType {
                name: t.name.clone(),
                methods: BTreeMap::new(),
            }),
        };
        Ok(self.intern_named(name, placeholder))
    }

    /// Populate a placeholder's attributes and methods using
    /// already-registered types. Attribute slot indices are fixed here.
    pub fn fill(&mut self, decl: &TypeDecl) -> Result<TypeId, Diagnostic> {
        match decl {
            TypeDecl::Class(c) => self.fill_class(c),
            TypeDecl::Trait(t) => self.fill_trait(t),
        }
    }

    fn fill_class(&mut self, decl: &ClassDecl) -> Result<TypeId, Diagnostic> {
        let id = self.get(&decl.name).ok_or_else(|| {
            Diagnostic::error(
                decl.span,
                codes::UNKNOWN_TYPE,
                format!("type '{}' was never registered", decl.name),
            )
        })?;

        let mut attribs = IndexMap::new();
        for (slot, attr) in decl.attribs.iter().enumerate() {
            let ty = self.resolve_type_expr(&attr.ty_expr, attr.span)?;
            attribs.insert(attr.name.clone(), (slot as u32, ty));
        }

        let mut methods: BTreeMap<String, Vec<Method>> = BTreeMap::new();
        for sig in &decl.methods {
            let method = self.realize_method(&decl.name, id, sig)?;
            methods.entry(sig.name.clone()).or_default().push(method);
        }

        match &mut self.types[id.index()] {
            Type::Struct(s) => {
                s.attribs = attribs;
                s.methods = methods;
            }
            _ => {
                return Err(Diagnostic::error(
                    decl.span,
                    codes::DUPLICATE_DEFINITION,
                    format!("'{}' is not a struct", decl.name),
                ));
            }
        }
        Ok(id)
    }

    fn fill_trait(&mut self, decl: &TraitDecl) -> Result<TypeId, Diagnostic> {
        let id = self.get(&decl.name).ok_or_else(|| {
            Diagnostic::error(
                decl.span,
                codes::UNKNOWN_TYPE,
                format!("type '{}' was never registered", decl.name),
            )
        })?;

        let mut methods = BTreeMap::new();
        for sig in &decl.methods {
            let method = self.realize_method(&decl.name, id, sig)?;
            methods.insert(sig.name.clone(), method);
        }

        match &mut self.types[id.index()] {
            Type::Trait(t) => t.methods = methods,
            _ => {
                return Err(Diagnostic::error(
                    decl.span,
                    codes::DUPLICATE_DEFINITION,
                    format!("'{}' is not a trait", decl.name),
                ));
            }
        }
        Ok(id)
    }

    /// Resolve one method signature. A bare first argument named `self`
    /// defaults to `ref(Self)`, or `owner(Self)` for `__del__`.
    fn realize_method(
        &mut self,
        owner_name: &str,
        owner_id: TypeId,
        sig: &MethodSig,
    ) -> Result<Method, Diagnostic> {
        let mut params = Vec::with_capacity(sig.args.len());
        for arg in &sig.args {
            let ty = match &arg.ty_expr {
                Some(expr) => self.resolve_type_expr(expr, arg.span)?,
                None if arg.name == "self" => {
                    if sig.name == "__del__" {
                        self.owner(owner_id)
                    } else {
                        self.ref_(owner_id)
                    }
                }
                None => {
                    return Err(Diagnostic::error(
                        arg.span,
                        codes::MISSING_ARG_TYPE,
                        format!("missing type for argument '{}'", arg.name),
                    ));
                }
            };
            params.push((arg.name.clone(), ty));
        }
        let ret = match &sig.rtype_expr {
            Some(expr) => self.resolve_type_expr(expr, sig.span)?,
            None => self.void(),
        };
        Ok(Method {
            irname: format!("{owner_name}.{}", sig.name),
            ret,
            params,
        })
    }

    /// Resolve a source-level type expression against the registry.
    pub fn resolve_type_expr(&mut self, expr: &TypeExpr, span: Span) -> Result<TypeId, Diagnostic> {
        match expr {
            TypeExpr::Name(name) => self.get(name).ok_or_else(|| {
                Diagnostic::error(span, codes::UNKNOWN_TYPE, format!("type '{name}' not found"))
            }),
            TypeExpr::Ref(inner) => {
                let t = self.resolve_type_expr(inner, span)?;
                Ok(self.ref_(t))
            }
            TypeExpr::Owner(inner) => {
                let t = self.resolve_type_expr(inner, span)?;
                Ok(self.owner(t))
            }
            TypeExpr::Elem { name, param } => {
                let t = self.resolve_type_expr(param, span)?;
                match name.as_str() {
                    "array" => Ok(self.array(t)),
                    "iter" => Ok(self.iter(t)),
                    _ => Err(Diagnostic::error(
                        span,
                        codes::UNKNOWN_TYPE,
                        format!("'{name}' is not a parametric type"),
                    )),
                }
            }
            TypeExpr::Tuple(elems) => {
                let ts = elems
                    .iter()
                    .map(|e| self.resolve_type_expr(e, span))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.tuple(ts))
            }
        }
    }

    /// Register a generator context struct: `{ state, value, args... }`.
    /// Locals are appended after the owning function is checked.
    pub fn register_ctx(&mut self, name: &str, elem: TypeId, args: &[(String, TypeId)]) -> TypeId {
        if let Some(id) = self.get(name) {
            return id;
        }
        let uword = self.uword();
        let mut attribs = IndexMap::new();
        attribs.insert("state".to_string(), (0, uword));
        attribs.insert("value".to_string(), (1, elem));
        for (i, (arg_name, arg_ty)) in args.iter().enumerate() {
            attribs.insert(arg_name.clone(), (i as u32 + 2, *arg_ty));
        }
        self.intern_named(
            name,
            Type::Struct(StructType {
                name: name.to_string(),
                attribs,
                methods: BTreeMap::new(),
                yields: Some(elem),
            }),
        )
    }

    /// Append local-variable slots to a generator context struct.
    pub fn extend_ctx(&mut self, ctx: TypeId, locals: &[(String, TypeId)]) {
        if let Type::Struct(s) = &mut self.types[ctx.index()] {
            for (name, ty) in locals {
                if !s.attribs.contains_key(name) {
                    let slot = s.attribs.len() as u32;
                    s.attribs.insert(name.clone(), (slot, *ty));
                }
            }
        }
    }

    /// Select a method overload on `recv` whose parameters accept `actual`.
    pub fn select(
        &self,
        recv: TypeId,
        method: &str,
        actual: &[TypeId],
        span: Span,
    ) -> Result<Method, Diagnostic> {
        let core = self.unwrap(recv);
        match self.get_type(core) {
            Type::Struct(s) => {
                let overloads = s.methods.get(method).cloned().ok_or_else(|| {
                    Diagnostic::error(
                        span,
                        codes::UNKNOWN_ATTRIBUTE,
                        format!("'{}' has no method '{method}'", s.name),
                    )
                })?;
                for m in &overloads {
                    if self.compat_args(actual, &m.param_types(), false) {
                        return Ok(m.clone());
                    }
                }
                Err(Diagnostic::error(
                    span,
                    codes::NO_OVERLOAD,
                    format!("no overload of '{method}' accepts these arguments"),
                ))
            }
            Type::Trait(t) => t.methods.get(method).cloned().ok_or_else(|| {
                Diagnostic::error(
                    span,
                    codes::UNKNOWN_ATTRIBUTE,
                    format!("trait '{}' has no method '{method}'", t.name),
                )
            }),
            _ => Err(Diagnostic::error(
                span,
                codes::NOT_CALLABLE,
                format!("type '{}' has no methods", self.name(core)),
            )),
        }
    }

    /// A source-level rendering of the type, for diagnostics.
    pub fn name(&self, id: TypeId) -> String {
        match self.get_type(id) {
            Type::Int { signed, width } => {
                let prefix = if *signed { "i" } else { "u" };
                match width {
                    IntWidth::Word => format!("{}word", if *signed { "" } else { "u" }),
                    w => format!("{prefix}{}", w.bits()),
                }
            }
            Type::Float { bits } => format!("f{bits}"),
            Type::Bool => "bool".to_string(),
            Type::Byte => "byte".to_string(),
            Type::Void => "void".to_string(),
            Type::NoType => "NoType".to_string(),
            Type::AnyInt => "anyint".to_string(),
            Type::AnyFloat => "anyfloat".to_string(),
            Type::Ref(over) => format!("&{}", self.name(*over)),
            Type::Owner(over) => format!("${}", self.name(*over)),
            Type::Tuple(elems) => {
                let inner: Vec<_> = elems.iter().map(|&t| self.name(t)).collect();
                format!("({})", inner.join(", "))
            }
            Type::Array(elem) => format!("array[{}]", self.name(*elem)),
            Type::Iter(elem) => format!("iter[{}]", self.name(*elem)),
            Type::Function(f) => {
                let params: Vec<_> = f.params.iter().map(|&t| self.name(t)).collect();
                format!("fn({}) -> {}", params.join(", "), self.name(f.ret))
            }
            Type::Struct(s) => s.name.clone(),
            Type::Trait(t) => t.name.clone(),
            Type::Module(m) => format!("module {}", m.name),
        }
    }

    /// Register a module-typed entry (for qualified call resolution).
    pub fn module(&mut self, name: &str, functions: BTreeMap<String, (String, TypeId)>) -> TypeId {
        self.push(Type::Module(crate::types::ModuleType {
            name: name.to_string(),
            functions,
        }))
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/store.rs"]
mod tests;
