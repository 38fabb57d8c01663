//! Emission-time values and per-function frames.

use rustc_hash::FxHashMap;

use runac_common::TypeId;

/// A typed LLIR operand: an SSA register, literal, or global.
#[derive(Clone, Debug)]
pub struct Value {
    pub ty: TypeId,
    pub var: String,
}

impl Value {
    pub fn new(ty: TypeId, var: impl Into<String>) -> Self {
        Value {
            ty,
            var: var.into(),
        }
    }
}

/// Per-function emission state: the register counter and name bindings.
///
/// Binding a name to a `Value` is all an assignment needs; later reads
/// reuse the register. Owner-typed bindings are also tracked so the ones
/// still live at a return can be destructed.
pub struct Frame {
    vars: u32,
    defined: FxHashMap<String, Value>,
    owners: FxHashMap<String, Value>,
    /// Module-level bindings (constant globals) visible in every function.
    globals: FxHashMap<String, Value>,
}

impl Frame {
    pub fn new(globals: FxHashMap<String, Value>) -> Self {
        Frame {
            vars: 0,
            defined: FxHashMap::default(),
            owners: FxHashMap::default(),
            globals,
        }
    }

    /// A fresh SSA register name.
    pub fn varname(&mut self) -> String {
        let n = self.vars;
        self.vars += 1;
        format!("%{n}")
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.defined.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.defined.get(name).or_else(|| self.globals.get(name))
    }

    pub fn track_owner(&mut self, name: &str, value: Value) {
        self.owners.insert(name.to_string(), value);
    }

    pub fn consume_owner(&mut self, name: &str) {
        self.owners.remove(name);
    }

    /// Live owner bindings, sorted by name for stable output.
    pub fn live_owners(&self) -> Vec<(String, Value)> {
        let mut out: Vec<_> = self
            .owners
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
