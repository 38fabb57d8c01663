//! LLIR renderings of interned types.

use crate::store::TypeStore;
use crate::types::Type;
use runac_common::TypeId;

impl TypeStore {
    /// The LLIR spelling of a type. Wrappers add one pointer level;
    /// structs are named types; traits are their wrap records.
    pub fn ir(&self, id: TypeId) -> String {
        match self.get_type(id) {
            Type::Int { width, .. } => format!("i{}", width.bits()),
            Type::Float { bits: 32 } => "float".to_string(),
            Type::Float { .. } => "double".to_string(),
            Type::Bool => "i1".to_string(),
            Type::Byte => "i8".to_string(),
            Type::Void => "void".to_string(),
            // Unresolved sentinels never reach emission on a checked tree.
            Type::NoType | Type::AnyInt => "i64".to_string(),
            Type::AnyFloat => "double".to_string(),
            Type::Ref(over) | Type::Owner(over) => format!("{}*", self.ir(*over)),
            Type::Tuple(elems) => {
                let inner: Vec<_> = elems.iter().map(|&t| self.ir(t)).collect();
                format!("{{ {} }}", inner.join(", "))
            }
            Type::Array(elem) => format!("%array.{}", self.mangle(*elem)),
            Type::Iter(_) => "i8*".to_string(),
            Type::Function(f) => {
                let params: Vec<_> = f.params.iter().map(|&t| self.ir(t)).collect();
                format!("{} ({})*", self.ir(f.ret), params.join(", "))
            }
            Type::Struct(s) => format!("%{}", s.name),
            Type::Trait(t) => format!("%{}.wrap", t.name),
            Type::Module(_) => "void".to_string(),
        }
    }

    /// A flat name component for derived type names (`%array.str`).
    pub fn mangle(&self, id: TypeId) -> String {
        self.name(id)
            .replace('&', "r.")
            .replace('$', "o.")
            .replace('[', ".")
            .replace([']', '(', ')', ' ', ','], "")
    }

    /// The name of the size global emitted for a struct (`@T.size`).
    pub fn size_global(&self, id: TypeId) -> Option<String> {
        match self.get_type(self.unwrap(id)) {
            Type::Struct(s) => Some(format!("@{}.size", s.name)),
            _ => None,
        }
    }
}
