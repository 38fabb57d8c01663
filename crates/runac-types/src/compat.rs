//! Assignability (`compat`) between interned types.

use crate::store::TypeStore;
use crate::types::{StructType, TraitType, Type};
use runac_common::TypeId;

impl TypeStore {
    /// Whether a value of type `a` may be used where `b` is expected.
    ///
    /// Holds when the types are equal; when `a` is a width-unresolved
    /// numeric and `b` is any concrete type of the same family; when `a`
    /// is a struct satisfying trait `b`; when `a` is `owner(T)` and `b` is
    /// `ref(T)` (owning relaxes to borrowing, never the reverse); and
    /// element-wise for tuples. Matching wrapper layers recurse so a
    /// wrapped struct still satisfies an equally wrapped trait; wrapper
    /// depths themselves must line up.
    pub fn compat(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.get_type(a), self.get_type(b)) {
            (Type::AnyInt, Type::Int { .. }) => true,
            (Type::AnyFloat, Type::Float { .. }) => true,
            (Type::Struct(s), Type::Trait(t)) => self.implements(s, t),
            (Type::Owner(x), Type::Ref(y))
            | (Type::Owner(x), Type::Owner(y))
            | (Type::Ref(x), Type::Ref(y)) => self.compat(*x, *y),
            (Type::Tuple(xs), Type::Tuple(ys)) => {
                xs.len() == ys.len()
                    && xs.iter().zip(ys.iter()).all(|(&x, &y)| self.compat(x, y))
            }
            _ => false,
        }
    }

    /// Argument-list compatibility, honoring a trailing variadic marker:
    /// actual arguments must cover the non-variadic prefix.
    pub fn compat_args(&self, actual: &[TypeId], params: &[TypeId], variadic: bool) -> bool {
        if variadic {
            actual.len() >= params.len()
                && params
                    .iter()
                    .zip(actual.iter())
                    .all(|(&p, &a)| self.compat(a, p))
        } else {
            actual.len() == params.len()
                && params
                    .iter()
                    .zip(actual.iter())
                    .all(|(&p, &a)| self.compat(a, p))
        }
    }

    /// A struct implements a trait implicitly when every trait method is
    /// present with a matching signature (receiver excluded).
    pub fn implements(&self, s: &StructType, t: &TraitType) -> bool {
        t.methods.iter().all(|(name, want)| {
            s.methods.get(name).is_some_and(|overloads| {
                overloads.iter().any(|have| {
                    have.ret == want.ret
                        && have.params.len() == want.params.len()
                        && have
                            .params
                            .iter()
                            .zip(want.params.iter())
                            .skip(1)
                            .all(|((_, ha), (_, wa))| ha == wa)
                })
            })
        })
    }
}
