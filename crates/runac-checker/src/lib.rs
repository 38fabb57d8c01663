//! Type checker, specializer and escape analysis for the runac compiler.
//!
//! The passes run in order on one module:
//!
//! 1. [`type_module`] - registers and fills user types, realizes external
//!    references, then walks every function's CFG assigning a type to each
//!    expression, resolving calls, and enforcing ownership.
//! 2. [`specialize`] - resolves `anyint`/`anyfloat` literal types from
//!    context.
//! 3. [`escape::analyze`] - marks owning allocations that outlive their
//!    scope so code generation can pick heap over stack.

pub mod builtins;
pub mod scope;
pub use scope::{Binding, ScopeId, Scopes};

pub mod typer;
pub use typer::{ConstGlobal, ConstValue, ForeignDecl, TypedModule, type_module};

mod checker;

pub mod specialize;
pub use specialize::specialize;

pub mod escape;
