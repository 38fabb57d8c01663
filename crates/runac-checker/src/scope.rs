//! Scopes: per-block name bindings, chained by predecessor.
//!
//! Scopes live in one arena per checked function so block scopes can chain
//! without lifetimes. Consuming an owning binding inserts a tombstone in
//! the consuming scope; later lookups see the name as undefined, which is
//! how use-after-move surfaces.

use rustc_hash::FxHashMap;

use runac_common::TypeId;

/// What a name resolves to in a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// A local variable or argument.
    Var(TypeId),
    /// A callable: external symbol plus interned function type.
    Func { decl: String, ty: TypeId },
    /// A user type name (constructor calls, `as` targets).
    Type(TypeId),
    /// A module reference (qualified calls).
    Module(TypeId),
    /// A top-level constant and the global it is emitted as.
    Const { ty: TypeId, global: String },
    /// Tombstone left behind by an ownership transfer.
    Moved,
}

impl Binding {
    /// The value type of this binding, if it can appear in expressions.
    pub fn value_type(&self) -> Option<TypeId> {
        match self {
            Binding::Var(ty) | Binding::Const { ty, .. } => Some(*ty),
            Binding::Func { ty, .. } | Binding::Module(ty) => Some(*ty),
            Binding::Type(_) | Binding::Moved => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    vars: FxHashMap<String, Binding>,
}

/// Arena of chained scopes.
#[derive(Debug, Default)]
pub struct Scopes {
    data: Vec<ScopeData>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes::default()
    }

    pub fn create(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.data.len());
        self.data.push(ScopeData {
            parent,
            vars: FxHashMap::default(),
        });
        id
    }

    pub fn insert(&mut self, scope: ScopeId, name: impl Into<String>, binding: Binding) {
        self.data[scope.0].vars.insert(name.into(), binding);
    }

    /// Chained lookup. A `Moved` tombstone stops the walk: the name was
    /// consumed on this path.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            if let Some(b) = self.data[id.0].vars.get(name) {
                return Some(b);
            }
            cur = self.data[id.0].parent;
        }
        None
    }

    /// Lookup restricted to one scope, no chaining.
    pub fn get_local(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        self.data[scope.0].vars.get(name)
    }

    /// Record an ownership transfer: the name is gone from this point on.
    pub fn mark_moved(&mut self, scope: ScopeId, name: &str) {
        self.data[scope.0]
            .vars
            .insert(name.to_string(), Binding::Moved);
    }

    /// Names bound directly in `scope` (no chaining), with their types.
    pub fn locals(&self, scope: ScopeId) -> impl Iterator<Item = (&str, &Binding)> {
        self.data[scope.0].vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}
