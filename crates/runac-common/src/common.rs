//! Shared identifiers used across crate boundaries.
//!
//! `TypeId` lives here rather than in `runac-types` so the AST can carry
//! type annotations without depending on the registry crate.

use serde::{Deserialize, Serialize};

/// Handle to an interned type in the registry.
///
/// Ids are only meaningful relative to the registry that produced them;
/// types are interned once per compiled module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}
