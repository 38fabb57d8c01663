//! The root namespace of externally provided declarations.
//!
//! Modules reference foreign functionality by qualified path
//! (`__internal__.__malloc__`, `libc.string.strlen`, ...). This is the
//! fixed tree those paths resolve against: the runtime intrinsics the
//! prelude implements, plus the libc surface the language exposes.

use std::collections::BTreeMap;

use runac_types::TypeStore;
use runac_common::TypeId;

/// A foreign function prototype. Type spellings use the source sigils:
/// `&T` borrows, `$T` owns, a trailing `...` marks a variadic tail.
#[derive(Clone, Copy, Debug)]
pub struct ExternSig {
    pub symbol: &'static str,
    pub ret: &'static str,
    pub params: &'static [&'static str],
}

/// A runtime-provided generator: called only through `for` desugaring.
/// `symbol` is the resumable function; its context struct is
/// `<symbol>$ctx` and the prelude defines both.
#[derive(Clone, Copy, Debug)]
pub struct GenSig {
    pub symbol: &'static str,
    pub elem: &'static str,
    pub params: &'static [&'static str],
}

#[derive(Clone, Debug)]
pub enum RootNode {
    Module(BTreeMap<&'static str, RootNode>),
    Decl(ExternSig),
    Generator(GenSig),
}

/// The realized form of a root entry, ready to bind into the module scope.
#[derive(Clone, Debug)]
pub enum Realized {
    /// (external symbol, interned function type)
    Func(String, TypeId),
    /// Module type id for qualified call resolution, plus the prototypes
    /// it exposes (symbol, function type).
    Module(TypeId, Vec<(String, TypeId)>),
}

pub struct Root {
    tree: BTreeMap<&'static str, RootNode>,
}

macro_rules! decl {
    ($symbol:literal, $ret:literal, [$($p:literal),*]) => {
        RootNode::Decl(ExternSig {
            symbol: $symbol,
            ret: $ret,
            params: &[$($p),*],
        })
    };
}

impl Root {
    pub fn new() -> Self {
        let mut internal = BTreeMap::new();
        internal.insert("__malloc__", decl!("runa.malloc", "$byte", ["uword"]));
        internal.insert("__free__", decl!("runa.free", "void", ["$byte"]));
        internal.insert(
            "__memcpy__",
            decl!("runa.memcpy", "void", ["&byte", "&byte", "u32"]),
        );
        internal.insert("__print__", decl!("runa.print", "void", ["&str"]));
        internal.insert(
            "__range__",
            RootNode::Generator(GenSig {
                symbol: "runa.range",
                elem: "i32",
                params: &["i32", "i32"],
            }),
        );

        let mut string = BTreeMap::new();
        string.insert(
            "strncmp",
            decl!("strncmp", "i32", ["&byte", "&byte", "uword"]),
        );
        string.insert("strlen", decl!("strlen", "uword", ["&byte"]));

        let mut unistd = BTreeMap::new();
        unistd.insert("write", decl!("write", "word", ["i32", "&byte", "uword"]));

        let mut stdlib = BTreeMap::new();
        stdlib.insert("getenv", decl!("getenv", "&byte", ["&byte"]));

        let mut stdio = BTreeMap::new();
        stdio.insert(
            "snprintf",
            decl!("snprintf", "i32", ["&byte", "i32", "&byte", "..."]),
        );

        let mut libc = BTreeMap::new();
        libc.insert("string", RootNode::Module(string));
        libc.insert("unistd", RootNode::Module(unistd));
        libc.insert("stdlib", RootNode::Module(stdlib));
        libc.insert("stdio", RootNode::Module(stdio));

        let mut tree = BTreeMap::new();
        tree.insert("__internal__", RootNode::Module(internal));
        tree.insert("libc", RootNode::Module(libc));
        Root { tree }
    }

    /// Walk a dotted path to the node it names.
    pub fn resolve(&self, path: &str) -> Option<&RootNode> {
        let mut parts = path.split('.');
        let mut node = self.tree.get(parts.next()?)?;
        for part in parts {
            match node {
                RootNode::Module(children) => node = children.get(part)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Intern the types of a resolved node. Generator realization also
    /// registers the context struct the prelude defines for it.
    pub fn realize(&self, path: &str, store: &mut TypeStore) -> Option<Realized> {
        let node = self.resolve(path)?;
        Some(realize_node(path, node, store))
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

fn realize_node(path: &str, node: &RootNode, store: &mut TypeStore) -> Realized {
    match node {
        RootNode::Decl(sig) => {
            let ty = extern_fn_type(sig, store);
            Realized::Func(sig.symbol.to_string(), ty)
        }
        RootNode::Generator(sig) => {
            let elem = parse_type(sig.elem, store);
            let params: Vec<TypeId> = sig.params.iter().map(|p| parse_type(p, store)).collect();
            let ret = store.iter(elem);
            let ty = store.function(ret, params.clone(), false);
            let named: Vec<_> = params
                .iter()
                .enumerate()
                .map(|(i, &t)| (format!("a{i}"), t))
                .collect();
            store.register_ctx(&format!("{}$ctx", sig.symbol), elem, &named);
            Realized::Func(sig.symbol.to_string(), ty)
        }
        RootNode::Module(children) => {
            let mut functions = BTreeMap::new();
            let mut protos = Vec::new();
            for (name, child) in children {
                if let RootNode::Decl(sig) = child {
                    let ty = extern_fn_type(sig, store);
                    functions.insert(name.to_string(), (sig.symbol.to_string(), ty));
                    protos.push((sig.symbol.to_string(), ty));
                }
            }
            let id = store.module(path, functions);
            Realized::Module(id, protos)
        }
    }
}

fn extern_fn_type(sig: &ExternSig, store: &mut TypeStore) -> TypeId {
    let ret = parse_type(sig.ret, store);
    let mut variadic = false;
    let mut params = Vec::with_capacity(sig.params.len());
    for p in sig.params {
        if *p == "..." {
            variadic = true;
            break;
        }
        params.push(parse_type(p, store));
    }
    store.function(ret, params, variadic)
}

/// Parse a sigil-form type spelling (`&byte`, `$byte`, `uword`).
fn parse_type(spelling: &str, store: &mut TypeStore) -> TypeId {
    if let Some(rest) = spelling.strip_prefix('&') {
        let inner = parse_type(rest, store);
        store.ref_(inner)
    } else if let Some(rest) = spelling.strip_prefix('$') {
        let inner = parse_type(rest, store);
        store.owner(inner)
    } else {
        store
            .get(spelling)
            .unwrap_or_else(|| panic!("unknown builtin type spelling '{spelling}'"))
    }
}
