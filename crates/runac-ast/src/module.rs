//! Module input: the unit of compilation.
//!
//! A module carries external references (name -> qualified target), type
//! declarations, top-level constants, and function bodies. The front end
//! builds it; the middle-end passes annotate it in place.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expr::{Expr, TypeExpr};
use crate::flow::FlowGraph;
use runac_common::{Span, TypeId};

/// A function argument: name plus declared type.
///
/// `ty_expr` is what the source wrote (absent for a method's bare `self`);
/// `ty` is the registry resolution filled in by module typing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    pub span: Span,
    #[serde(default)]
    pub ty_expr: Option<TypeExpr>,
    #[serde(default)]
    pub ty: Option<TypeId>,
}

/// A function or method body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub span: Span,
    pub args: Vec<Arg>,
    #[serde(default)]
    pub rtype_expr: Option<TypeExpr>,
    /// Resolved return type; `void` when the source declared none.
    #[serde(default)]
    pub rtype: Option<TypeId>,
    pub flow: FlowGraph,
    /// External symbol this function is emitted as. Module typing sets it
    /// (`name` for free functions, `Type.name` for methods).
    #[serde(default)]
    pub irname: String,
}

impl Function {
    pub fn rtype(&self) -> TypeId {
        self.rtype.expect("function not typed")
    }
}

/// Identifies a compiled body: a free function or a method of a named type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKey {
    Free(String),
    Method(String, String),
}

impl FunctionKey {
    pub fn type_name(&self) -> Option<&str> {
        match self {
            FunctionKey::Free(_) => None,
            FunctionKey::Method(t, _) => Some(t),
        }
    }
}

/// A struct attribute declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttribDecl {
    pub name: String,
    pub span: Span,
    pub ty_expr: TypeExpr,
}

/// A method signature as declared on a class or trait. Class methods also
/// have bodies in `Module::code`; trait methods are signatures only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub span: Span,
    pub args: Vec<Arg>,
    #[serde(default)]
    pub rtype_expr: Option<TypeExpr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub span: Span,
    pub attribs: Vec<AttribDecl>,
    pub methods: Vec<MethodSig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraitDecl {
    pub name: String,
    pub span: Span,
    pub methods: Vec<MethodSig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeDecl {
    Class(ClassDecl),
    Trait(TraitDecl),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Class(c) => &c.name,
            TypeDecl::Trait(t) => &t.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Trait(t) => t.span,
        }
    }
}

/// A top-level constant. Only literal initializers are accepted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub span: Span,
    pub value: Expr,
}

/// The unit of compilation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// Source text, carried for line/column diagnostics in the driver.
    #[serde(default)]
    pub source: String,
    /// Externally declared names: local name -> fully qualified target
    /// (e.g. `malloc` -> `__internal__.__malloc__`).
    #[serde(default)]
    pub refs: IndexMap<String, String>,
    /// Struct and trait declarations by name.
    #[serde(default)]
    pub types: IndexMap<String, TypeDecl>,
    #[serde(default)]
    pub constants: IndexMap<String, Constant>,
    /// Function bodies in definition order.
    pub code: Vec<(FunctionKey, Function)>,
}

#[cfg(test)]
#[path = "tests/module.rs"]
mod tests;
