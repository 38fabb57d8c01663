use super::*;
use runac_ast::{Arg, AttribDecl, ClassDecl, MethodSig, TraitDecl, TypeDecl, TypeExpr};
use runac_common::Span;

fn sp() -> Span {
    Span::new(0, 0)
}

fn point_decl() -> TypeDecl {
    TypeDecl::Class(ClassDecl {
        name: "Point".into(),
        span: sp(),
        attribs: vec![
            AttribDecl {
                name: "x".into(),
                span: sp(),
                ty_expr: TypeExpr::Name("i32".into()),
            },
            AttribDecl {
                name: "y".into(),
                span: sp(),
                ty_expr: TypeExpr::Name("i32".into()),
            },
        ],
        methods: vec![MethodSig {
            name: "sum".into(),
            span: sp(),
            args: vec![Arg {
                name: "self".into(),
                span: sp(),
                ty_expr: None,
                ty: None,
            }],
            rtype_expr: Some(TypeExpr::Name("i32".into())),
        }],
    })
}

#[test]
fn primitives_are_interned() {
    let store = TypeStore::new();
    for name in ["i8", "i16", "i32", "i64", "word", "u8", "uword", "f32", "f64", "bool", "byte"] {
        assert!(store.get(name).is_some(), "missing primitive {name}");
    }
}

#[test]
fn wrappers_are_memoized() {
    let mut store = TypeStore::new();
    let i32_ = store.get("i32").unwrap();
    let a = store.ref_(i32_);
    let b = store.ref_(i32_);
    assert_eq!(a, b);
    let o = store.owner(i32_);
    assert_ne!(a, o);
    assert_eq!(store.unwrap(o), i32_);
}

#[test]
fn nested_wrappers_unwrap_fully() {
    let mut store = TypeStore::new();
    let i32_ = store.get("i32").unwrap();
    let o = store.owner(i32_);
    let ro = store.ref_(o);
    assert_eq!(store.unwrap(ro), i32_);
    assert_eq!(store.strip(ro), (i32_, 2));
}

#[test]
fn fill_assigns_attribute_slots_in_order() {
    let mut store = TypeStore::new();
    let decl = point_decl();
    store.add(&decl).unwrap();
    let id = store.fill(&decl).unwrap();
    let s = store.struct_of(id).unwrap();
    assert_eq!(s.attribs["x"].0, 0);
    assert_eq!(s.attribs["y"].0, 1);
    let i32_ = store.get("i32").unwrap();
    assert_eq!(s.attribs["x"].1, i32_);
}

#[test]
fn duplicate_add_is_rejected() {
    let mut store = TypeStore::new();
    let decl = point_decl();
    store.add(&decl).unwrap();
    let err = store.add(&decl).unwrap_err();
    assert_eq!(err.code, runac_common::codes::DUPLICATE_DEFINITION);
}

#[test]
fn method_self_defaults_to_ref() {
    let mut store = TypeStore::new();
    let decl = point_decl();
    store.add(&decl).unwrap();
    let id = store.fill(&decl).unwrap();
    let point_ref = store.ref_(id);
    let s = store.struct_of(id).unwrap();
    let m = &s.methods["sum"][0];
    assert_eq!(m.irname, "Point.sum");
    assert_eq!(m.params[0].1, point_ref);
}

#[test]
fn compat_accepts_anyint_against_any_width() {
    let store = TypeStore::new();
    let any = store.any_int();
    for name in ["i8", "i32", "u64", "uword"] {
        assert!(store.compat(any, store.get(name).unwrap()));
    }
    assert!(!store.compat(any, store.get("f64").unwrap()));
    assert!(!store.compat(store.get("i32").unwrap(), store.get("i64").unwrap()));
}

#[test]
fn compat_owner_to_ref_is_one_way() {
    let mut store = TypeStore::new();
    let decl = point_decl();
    store.add(&decl).unwrap();
    let id = store.fill(&decl).unwrap();
    let r = store.ref_(id);
    let o = store.owner(id);
    assert!(store.compat(o, r));
    assert!(!store.compat(r, o));
}

#[test]
fn compat_never_changes_indirection_depth() {
    let mut store = TypeStore::new();
    let i32_ = store.get("i32").unwrap();
    let r = store.ref_(i32_);
    assert!(!store.compat(r, i32_));
    assert!(!store.compat(i32_, r));
}

#[test]
fn struct_satisfies_trait_by_signature() {
    let mut store = TypeStore::new();
    let point = point_decl();
    store.add(&point).unwrap();
    let trait_decl = TypeDecl::Trait(TraitDecl {
        name: "Summable".into(),
        span: sp(),
        methods: vec![MethodSig {
            name: "sum".into(),
            span: sp(),
            args: vec![Arg {
                name: "self".into(),
                span: sp(),
                ty_expr: None,
                ty: None,
            }],
            rtype_expr: Some(TypeExpr::Name("i32".into())),
        }],
    });
    store.add(&trait_decl).unwrap();
    let point_id = store.fill(&point).unwrap();
    let trait_id = store.fill(&trait_decl).unwrap();
    let point_ref = store.ref_(point_id);
    let trait_ref = store.ref_(trait_id);
    assert!(store.compat(point_ref, trait_ref));
}

#[test]
fn trait_slots_follow_lexicographic_order() {
    let mut store = TypeStore::new();
    let decl = TypeDecl::Trait(TraitDecl {
        name: "Shape".into(),
        span: sp(),
        methods: ["perimeter", "area", "name"]
            .into_iter()
            .map(|n| MethodSig {
                name: n.into(),
                span: sp(),
                args: vec![Arg {
                    name: "self".into(),
                    span: sp(),
                    ty_expr: None,
                    ty: None,
                }],
                rtype_expr: Some(TypeExpr::Name("i32".into())),
            })
            .collect(),
    });
    store.add(&decl).unwrap();
    let id = store.fill(&decl).unwrap();
    let t = store.trait_of(id).unwrap();
    assert_eq!(t.slot("area"), Some(0));
    assert_eq!(t.slot("name"), Some(1));
    assert_eq!(t.slot("perimeter"), Some(2));
}

#[test]
fn variadic_args_match_prefix() {
    let mut store = TypeStore::new();
    let i32_ = store.get("i32").unwrap();
    let byte = store.get("byte").unwrap();
    let bp = store.ref_(byte);
    assert!(store.compat_args(&[bp, i32_, i32_], &[bp], true));
    assert!(!store.compat_args(&[], &[bp], true));
    assert!(!store.compat_args(&[bp, i32_], &[bp], false));
}

#[test]
fn ir_spellings() {
    let mut store = TypeStore::new();
    let i32_ = store.get("i32").unwrap();
    assert_eq!(store.ir(i32_), "i32");
    assert_eq!(store.ir(store.bool_()), "i1");
    let r = store.ref_(i32_);
    assert_eq!(store.ir(r), "i32*");
    let s = store.str_();
    assert_eq!(store.ir(s), "%str");
    let arr = store.array(s);
    assert_eq!(store.ir(arr), "%array.str");
}
