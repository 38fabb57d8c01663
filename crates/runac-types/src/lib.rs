//! Type registry and type system for the runac compiler.
//!
//! Types are a closed discriminated union ([`Type`]) interned once per
//! module into a [`TypeStore`]. Struct and trait materialization is split
//! into two phases so recursive type references resolve through names:
//! `add` registers a placeholder, `fill` binds attributes and methods
//! against already-registered names.
//!
//! Method tables are `BTreeMap`s: lexicographic iteration order is the
//! vtable slot assignment, shared by the checker and the code generator.

pub mod types;
pub use types::{FunctionType, IntWidth, Method, ModuleType, StructType, TraitType, Type};

pub mod store;
pub use store::TypeStore;

mod compat;
mod ir;

pub use runac_common::TypeId;
