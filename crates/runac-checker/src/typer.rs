//! Module-level typing.
//!
//! Type construction is three-phase so cyclic references resolve through
//! names: register placeholders, fill members, then realize function
//! types. After the module scope is populated, every function body is
//! checked block by block.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::builtins::{Realized, Root};
use crate::checker::TypeChecker;
use crate::scope::{Binding, ScopeId, Scopes};
use runac_ast::{Arg, ExprKind, Function, FunctionKey, Module};
use runac_common::{Diagnostic, Span, TypeId, codes};
use runac_types::{Type, TypeStore};

/// A foreign prototype the code generator must `declare`.
#[derive(Clone, Debug)]
pub struct ForeignDecl {
    pub symbol: String,
    pub ty: TypeId,
}

#[derive(Clone, Debug)]
pub enum ConstValue {
    Int(i64),
    Str(String),
}

/// A top-level constant lowered to a global.
#[derive(Clone, Debug)]
pub struct ConstGlobal {
    pub name: String,
    pub global: String,
    pub ty: TypeId,
    pub value: ConstValue,
}

/// Everything the later passes need besides the annotated module itself.
#[derive(Debug)]
pub struct TypedModule {
    pub store: TypeStore,
    pub externs: Vec<ForeignDecl>,
    /// Instantiated parametric and generator-context types that need type
    /// declarations emitted.
    pub variants: Vec<TypeId>,
    pub constants: Vec<ConstGlobal>,
}

/// Methods that must not declare a return type.
const VOID_METHODS: &[&str] = &["__init__", "__del__"];

/// Run module-level typing and per-function checking.
pub fn type_module(module: &mut Module) -> Result<TypedModule, Diagnostic> {
    let mut store = TypeStore::new();
    let root = Root::new();
    let mut scopes = Scopes::new();
    let base = scopes.create(None);
    let mut externs: Vec<ForeignDecl> = Vec::new();
    let mut variants: Vec<TypeId> = Vec::new();
    let mut constants: Vec<ConstGlobal> = Vec::new();

    // Phase 1: placeholders, so recursive references resolve.
    for decl in module.types.values() {
        store.add(decl)?;
    }

    // External references.
    for (name, path) in &module.refs {
        let realized = root.realize(path, &mut store).ok_or_else(|| {
            Diagnostic::error(
                Span::dummy(),
                codes::UNDEFINED_NAME,
                format!("cannot resolve external reference '{path}'"),
            )
        })?;
        match realized {
            Realized::Func(symbol, ty) => {
                record_extern(&mut externs, &symbol, ty);
                scopes.insert(base, name.clone(), Binding::Func { decl: symbol, ty });
            }
            Realized::Module(id, protos) => {
                for (symbol, ty) in protos {
                    record_extern(&mut externs, &symbol, ty);
                }
                scopes.insert(base, name.clone(), Binding::Module(id));
            }
        }
    }

    // Top-level constants: literal strings and integers become globals
    // typed as borrowed boxes.
    for (name, constant) in &mut module.constants {
        let ty = match &constant.value.kind {
            ExprKind::Str(_) => {
                let s = store.str_();
                store.ref_(s)
            }
            ExprKind::Int(_) => {
                let w = store.get("word").unwrap();
                store.ref_(w)
            }
            _ => {
                return Err(Diagnostic::error(
                    constant.span,
                    codes::TYPE_MISMATCH,
                    format!("constant '{name}' must be a string or integer literal"),
                ));
            }
        };
        constant.value.ty = Some(ty);
        let global = format!("@{}.{name}", module.name);
        let value = match &constant.value.kind {
            ExprKind::Str(s) => ConstValue::Str(s.clone()),
            ExprKind::Int(v) => ConstValue::Int(*v),
            _ => unreachable!(),
        };
        constants.push(ConstGlobal {
            name: name.clone(),
            global: global.clone(),
            ty,
            value,
        });
        scopes.insert(base, name.clone(), Binding::Const { ty, global });
    }

    // Phase 2: bind members.
    for (name, decl) in &module.types {
        let id = store.fill(decl)?;
        scopes.insert(base, name.clone(), Binding::Type(id));
    }

    // Phase 3: realize function types and check signatures.
    for (key, fun) in &mut module.code {
        match key {
            FunctionKey::Free(name) => {
                fun.irname = name.clone();
                let fname = fun.name.clone();
                let rtype = resolve_rtype(&mut store, fun)?;
                let mut atypes = Vec::with_capacity(fun.args.len());
                for arg in &mut fun.args {
                    let ty = resolve_arg(&mut store, arg, None, &fname)?;
                    atypes.push(ty);
                }
                if name.as_str() == "main" {
                    check_main(&mut store, fun, rtype, &atypes)?;
                }
                // Register generator contexts up front so a `for` over a
                // later-defined generator still resolves its context type.
                if fun.flow.yields {
                    if let Type::Iter(elem) = *store.get_type(rtype) {
                        let args: Vec<(String, TypeId)> = fun
                            .args
                            .iter()
                            .zip(atypes.iter())
                            .map(|(a, &t)| (a.name.clone(), t))
                            .collect();
                        store.register_ctx(&format!("{}$ctx", fun.irname), elem, &args);
                    }
                }
                let fty = store.function(rtype, atypes, false);
                scopes.insert(
                    base,
                    name.clone(),
                    Binding::Func {
                        decl: name.clone(),
                        ty: fty,
                    },
                );
            }
            FunctionKey::Method(tname, mname) => {
                fun.irname = format!("{tname}.{mname}");
                check_method_shape(&store, tname, mname, fun)?;
            }
        }
    }

    // Check each body.
    for (key, fun) in &mut module.code {
        debug!(name = %fun.irname, "checking function");
        process_function(
            &mut store,
            &mut scopes,
            base,
            key,
            fun,
            &mut variants,
        )?;
    }

    Ok(TypedModule {
        store,
        externs,
        variants,
        constants,
    })
}

fn record_extern(externs: &mut Vec<ForeignDecl>, symbol: &str, ty: TypeId) {
    if externs.iter().any(|e| e.symbol == symbol) {
        return;
    }
    externs.push(ForeignDecl {
        symbol: symbol.to_string(),
        ty,
    });
}

fn resolve_rtype(store: &mut TypeStore, fun: &mut Function) -> Result<TypeId, Diagnostic> {
    if let Some(ty) = fun.rtype {
        return Ok(ty);
    }
    let ty = match &fun.rtype_expr {
        Some(expr) => store.resolve_type_expr(expr, fun.span)?,
        None => store.void(),
    };
    fun.rtype = Some(ty);
    Ok(ty)
}

/// Resolve one argument's type. `self_default` supplies the receiver type
/// for a bare `self` on methods.
fn resolve_arg(
    store: &mut TypeStore,
    arg: &mut Arg,
    self_default: Option<TypeId>,
    fname: &str,
) -> Result<TypeId, Diagnostic> {
    if let Some(ty) = arg.ty {
        return Ok(ty);
    }
    let ty = match &arg.ty_expr {
        Some(expr) => store.resolve_type_expr(expr, arg.span)?,
        None if arg.name == "self" => match self_default {
            Some(recv) => {
                if fname == "__del__" {
                    store.owner(recv)
                } else {
                    store.ref_(recv)
                }
            }
            None => {
                return Err(Diagnostic::error(
                    arg.span,
                    codes::BAD_SELF,
                    "'self' outside a method",
                ));
            }
        },
        None => {
            return Err(Diagnostic::error(
                arg.span,
                codes::MISSING_ARG_TYPE,
                format!("missing type for argument '{}'", arg.name),
            ));
        }
    };
    arg.ty = Some(ty);
    Ok(ty)
}

fn check_main(
    store: &mut TypeStore,
    fun: &Function,
    rtype: TypeId,
    atypes: &[TypeId],
) -> Result<(), Diagnostic> {
    let s = store.str_();
    let str_ref = store.ref_(s);
    let arr = store.array(s);
    let arr_ref = store.ref_(arr);
    if !atypes.is_empty() && atypes[0] != str_ref {
        return Err(Diagnostic::error(
            fun.args[0].span,
            codes::BAD_MAIN,
            "1st argument to main() must be of type &str",
        ));
    }
    if atypes.len() > 1 && atypes[1] != arr_ref {
        return Err(Diagnostic::error(
            fun.args[1].span,
            codes::BAD_MAIN,
            "2nd argument to main() must be of type &array[str]",
        ));
    }
    let i32_ = store.get("i32").unwrap();
    if rtype != store.void() && rtype != i32_ {
        return Err(Diagnostic::error(
            fun.span,
            codes::BAD_MAIN,
            "main() return type must be void or i32",
        ));
    }
    Ok(())
}

fn check_method_shape(
    store: &TypeStore,
    tname: &str,
    mname: &str,
    fun: &Function,
) -> Result<(), Diagnostic> {
    if VOID_METHODS.contains(&mname) && fun.rtype_expr.is_some() {
        return Err(Diagnostic::error(
            fun.span,
            codes::BAD_RETURN,
            format!("method '{mname}' must return type 'void'"),
        ));
    }
    if mname == "__new__" {
        return Ok(());
    }
    if fun.args.is_empty() {
        return Err(Diagnostic::error(
            fun.span,
            codes::BAD_SELF,
            "missing 'self' argument",
        ));
    }
    if fun.args[0].name != "self" {
        return Err(Diagnostic::error(
            fun.args[0].span,
            codes::BAD_SELF,
            "first method argument must be called 'self'",
        ));
    }
    if let Some(expr) = &fun.args[0].ty_expr {
        let names_receiver = match expr {
            runac_ast::TypeExpr::Name(n) => n == tname,
            runac_ast::TypeExpr::Ref(inner) | runac_ast::TypeExpr::Owner(inner) => {
                matches!(&**inner, runac_ast::TypeExpr::Name(n) if n == tname)
            }
            _ => false,
        };
        if !names_receiver {
            return Err(Diagnostic::error(
                fun.args[0].span,
                codes::BAD_SELF,
                format!("first method argument must be of type '{tname}'"),
            ));
        }
    }
    let _ = store;
    Ok(())
}

fn process_function(
    store: &mut TypeStore,
    scopes: &mut Scopes,
    base: ScopeId,
    key: &FunctionKey,
    fun: &mut Function,
    variants: &mut Vec<TypeId>,
) -> Result<(), Diagnostic> {
    let start = scopes.create(Some(base));

    let recv = key.type_name().and_then(|t| store.get(t));
    let fname = fun.name.clone();
    let rtype = resolve_rtype(store, fun)?;
    record_variant(store, variants, rtype);

    for arg in &mut fun.args {
        let ty = resolve_arg(store, arg, recv, &fname)?;
        scopes.insert(start, arg.name.clone(), Binding::Var(ty));
        record_variant(store, variants, ty);
    }

    let ctx = if fun.flow.yields {
        let elem = match store.get_type(rtype) {
            Type::Iter(elem) => *elem,
            _ => {
                return Err(Diagnostic::error(
                    fun.span,
                    codes::BAD_RETURN,
                    "generator functions must return an iterator type",
                ));
            }
        };
        let args: Vec<(String, TypeId)> = fun
            .args
            .iter()
            .map(|a| (a.name.clone(), a.ty.unwrap()))
            .collect();
        let ctx = store.register_ctx(&format!("{}$ctx", fun.irname), elem, &args);
        variants.push(ctx);
        Some(ctx)
    } else {
        None
    };

    let checker = TypeChecker {
        store,
        scopes,
        entry: start,
        block_scopes: FxHashMap::default(),
        rtype,
        yields: fun.flow.yields,
        variants,
        cur_block: 0,
        cur_step: 0,
    };
    let block_scopes = checker.check(&mut fun.flow)?;

    // Generators keep their locals in context slots; now that every local
    // has a type, extend the context struct.
    if let Some(ctx) = ctx {
        let mut locals: Vec<(String, TypeId)> = Vec::new();
        for scope in block_scopes.values() {
            for (name, binding) in scopes.locals(*scope) {
                if let Binding::Var(ty) = binding {
                    if !locals.iter().any(|(n, _)| n == name) {
                        locals.push((name.to_string(), *ty));
                    }
                }
            }
        }
        locals.sort();
        store.extend_ctx(ctx, &locals);
    }
    Ok(())
}

/// Track parametric instantiations that need emitted type declarations.
pub(crate) fn record_variant(store: &TypeStore, variants: &mut Vec<TypeId>, ty: TypeId) {
    let core = store.unwrap(ty);
    if matches!(store.get_type(core), Type::Array(_) | Type::Tuple(_)) && !variants.contains(&core)
    {
        variants.push(core);
    }
}
