//! AST node vocabulary and control-flow graph types for the runac compiler.
//!
//! The front end (lexer/parser/CFG builder, out of scope here) produces a
//! [`Module`]: external references, type declarations, constants, and
//! function bodies already lowered to a control-flow graph of basic blocks.
//! The middle end annotates these nodes in place:
//!
//! - the type checker writes `ty` on every expression and `fun` on calls,
//! - the specializer narrows `anyint`/`anyfloat` annotations,
//! - the escape analyzer flips `escapes` on owning allocations.
//!
//! All node types are serde-derived so a front end can hand the driver a
//! serialized module.

pub mod expr;
pub use expr::{BinOp, Callee, CmpOp, Expr, ExprKind, FunRef, TypeExpr};

pub mod flow;
pub use flow::{Block, BlockId, FlowGraph, OriginEntry, OriginSource, Step};

pub mod module;
pub use module::{
    Arg, AttribDecl, ClassDecl, Constant, Function, FunctionKey, MethodSig, Module, TraitDecl,
    TypeDecl,
};
