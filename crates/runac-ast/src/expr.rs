//! Expression nodes.
//!
//! Expressions form a closed vocabulary; every pass dispatches with an
//! exhaustive match on [`ExprKind`]. Checker annotations (`ty`, `escapes`,
//! call resolution) default to empty so front-end output deserializes
//! without them.

use serde::{Deserialize, Serialize};

use crate::flow::BlockId;
use runac_common::{Span, Spanned, TypeId};

/// Arithmetic and bitwise binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BwAnd,
    BwOr,
    BwXor,
}

impl BinOp {
    /// Operators that only apply to integer operands.
    pub fn int_only(self) -> bool {
        matches!(self, BinOp::Mod | BinOp::BwAnd | BinOp::BwOr | BinOp::BwXor)
    }

    /// The `__add__`-style method name used for non-primitive operands.
    pub fn method_name(self) -> &'static str {
        match self {
            BinOp::Add => "__add__",
            BinOp::Sub => "__sub__",
            BinOp::Mul => "__mul__",
            BinOp::Div => "__div__",
            BinOp::Mod => "__mod__",
            BinOp::BwAnd => "__and__",
            BinOp::BwOr => "__or__",
            BinOp::BwXor => "__xor__",
        }
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
}

impl CmpOp {
    pub fn method_name(self) -> &'static str {
        match self {
            CmpOp::Eq => "__eq__",
            CmpOp::Ne => "__ne__",
            CmpOp::Lt => "__lt__",
            CmpOp::Gt => "__gt__",
        }
    }
}

/// A resolved callee: the external symbol plus its interned function type.
///
/// Written by the type checker; code generation reads the symbol for direct
/// calls and splits off the method name for vtable slot lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunRef {
    /// Mangled external name (`f`, `Point.sum`, `libc.string.strlen`).
    pub decl: String,
    /// Interned function type (return + parameters).
    pub ty: TypeId,
}

impl FunRef {
    /// The unqualified method name, for vtable slot lookup on virtual calls.
    pub fn method_name(&self) -> &str {
        match self.decl.split_once('.') {
            Some((_, rest)) => rest,
            None => &self.decl,
        }
    }
}

/// What a call is invoked on: a bare name or an attribute of an object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Callee {
    Name(String),
    Attrib { obj: Box<Expr>, attrib: String },
}

/// A type expression as written in source signatures, resolved by the
/// registry during module typing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A named type: `i32`, `str`, `Point`.
    Name(String),
    /// A borrowed reference: `&T`.
    Ref(Box<TypeExpr>),
    /// A uniquely owned value: `$T`.
    Owner(Box<TypeExpr>),
    /// A parametric application: `array[str]`, `iter[i32]`.
    Elem {
        name: String,
        param: Box<TypeExpr>,
    },
    Tuple(Vec<TypeExpr>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ExprKind {
    /// The `None` literal (optional-pointer sentinel).
    NoneVal,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Name(String),
    Tuple(Vec<Expr>),
    Attrib {
        obj: Box<Expr>,
        attrib: String,
    },
    Elem {
        obj: Box<Expr>,
        key: Box<Expr>,
    },
    Not(Box<Expr>),
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `x is None` - optional-pointer null test.
    Is {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `v as T` - sanctioned numeric conversion.
    As {
        value: Box<Expr>,
        target: String,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_val: Box<Expr>,
        else_val: Box<Expr>,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
        /// Resolved function/method reference; written by the checker.
        #[serde(default)]
        fun: Option<FunRef>,
        /// Trait-typed receiver: dispatch through the vtable.
        #[serde(default)]
        virtual_: bool,
    },
    /// Synthetic allocation-plus-initialization inserted for constructor
    /// calls; `ty` carries `owner(T)` and `escapes` picks stack vs heap.
    Init,
    /// Value selection on control-flow join. Arms are listed in the same
    /// order as the owning block's predecessor list.
    Phi {
        left: (BlockId, Box<Expr>),
        right: (BlockId, Box<Expr>),
    },
}

/// An expression node: kind, source span, and pass annotations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
    /// Assigned type; every expression has one once type checking is done.
    #[serde(default)]
    pub ty: Option<TypeId>,
    /// Set by escape analysis on `Init` nodes and `malloc` calls.
    #[serde(default)]
    pub escapes: bool,
}

impl Expr {
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Expr {
            span,
            kind,
            ty: None,
            escapes: false,
        }
    }

    /// The annotated type. Panics if type checking has not run; use only
    /// downstream of a successful check.
    #[track_caller]
    pub fn ty(&self) -> TypeId {
        self.ty.expect("expression not typed")
    }

    pub fn is_name(&self) -> bool {
        matches!(self.kind, ExprKind::Name(_))
    }

    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(n) => Some(n),
            _ => None,
        }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}
