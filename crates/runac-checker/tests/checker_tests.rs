//! Type checker behavior: literals, resolution, calls, rewrites, errors.

mod common;

use common::*;
use runac_ast::{BinOp, ExprKind, Step};
use runac_checker::type_module;
use runac_common::codes;

#[test]
fn literals_take_canonical_types() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![
            assign(name("s"), str_lit("hi")),
            ret(Some(as_i32(3))),
        ]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    let store = &typed.store;

    let steps = &m.code[0].1.flow.blocks[&0].steps;
    let Step::Assign { left, right } = &steps[0] else {
        panic!("assign step");
    };
    // String literals are owning strings.
    assert_eq!(store.name(right.ty()), "$str");
    assert_eq!(left.ty(), right.ty());
    let Step::Return { value: Some(v), .. } = &steps[1] else {
        panic!("return step");
    };
    assert_eq!(store.name(v.ty()), "i32");
}

#[test]
fn every_expression_is_typed() {
    let mut m = module(vec![free(func(
        "f",
        vec![arg("a", tn("i32"))],
        Some(tn("i32")),
        flow1(vec![ret(Some(binary(BinOp::Add, name("a"), int(1))))]),
    ))]);
    type_module(&mut m).expect("checks");
    let Step::Return { value: Some(v), .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("return step");
    };
    assert!(v.ty.is_some());
    let ExprKind::Binary { left, right, .. } = &v.kind else {
        panic!("binary return");
    };
    assert!(left.ty.is_some());
    assert!(right.ty.is_some());
}

#[test]
fn undefined_name_is_reported() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![ret(Some(name("missing")))]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::UNDEFINED_NAME);
    assert!(err.message.contains("undefined name 'missing'"));
}

#[test]
fn reassignment_with_new_type_is_an_error() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        None,
        flow1(vec![
            assign(name("x"), as_i32(1)),
            assign(name("x"), str_lit("no")),
            ret(None),
        ]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::REASSIGNMENT);
}

#[test]
fn same_type_rebinding_is_allowed() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        None,
        flow1(vec![
            assign(name("x"), as_i32(1)),
            assign(name("x"), as_i32(2)),
            ret(None),
        ]),
    ))]);
    type_module(&mut m).expect("checks");
}

#[test]
fn constructor_call_is_rewritten() {
    let mut m = module_with(
        vec![("Point".to_string(), point_class())],
        vec![free(func(
            "f",
            vec![],
            None,
            flow1(vec![
                assign(name("p"), call_name("Point", vec![as_i32(3), as_i32(4)])),
                ret(None),
            ]),
        ))],
    );
    let typed = type_module(&mut m).expect("checks");
    let Step::Assign { right, .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("assign step");
    };
    let ExprKind::Call { args, fun, .. } = &right.kind else {
        panic!("call");
    };
    let fun = fun.as_ref().expect("resolved");
    assert_eq!(fun.decl, "Point.__init__");
    // The Init pseudo-argument was inserted and the call owns the result.
    assert!(matches!(args[0].kind, ExprKind::Init));
    assert_eq!(typed.store.name(right.ty()), "$Point");
}

#[test]
fn method_call_gains_self_argument() {
    let mut m = module_with(
        vec![("Point".to_string(), point_class())],
        vec![free(func(
            "f",
            vec![arg("p", tref(tn("Point")))],
            Some(tn("i32")),
            flow1(vec![ret(Some(method_call(name("p"), "sum", vec![])))]),
        ))],
    );
    type_module(&mut m).expect("checks");
    let Step::Return { value: Some(v), .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("return step");
    };
    let ExprKind::Call {
        args,
        fun,
        virtual_,
        ..
    } = &v.kind
    else {
        panic!("call");
    };
    assert_eq!(fun.as_ref().unwrap().decl, "Point.sum");
    assert_eq!(args.len(), 1, "receiver inserted as first argument");
    assert!(!virtual_);
}

#[test]
fn trait_receiver_sets_virtual() {
    let mut m = module_with(
        greeter_types(),
        vec![free(func(
            "hello",
            vec![arg("g", tref(tn("Greeter")))],
            None,
            flow1(vec![
                Step::Expr(method_call(name("g"), "greet", vec![])),
                ret(None),
            ]),
        ))],
    );
    type_module(&mut m).expect("checks");
    let Step::Expr(e) = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("expr step");
    };
    let ExprKind::Call { virtual_, fun, .. } = &e.kind else {
        panic!("call");
    };
    assert!(virtual_);
    assert_eq!(fun.as_ref().unwrap().decl, "Greeter.greet");
}

#[test]
fn struct_argument_satisfies_trait_parameter() {
    let mut m = module_with(
        greeter_types(),
        vec![
            free(func(
                "hello",
                vec![arg("g", tref(tn("Greeter")))],
                None,
                flow1(vec![ret(None)]),
            )),
            free(func(
                "f",
                vec![arg("e", tref(tn("En")))],
                None,
                flow1(vec![
                    Step::Expr(call_name("hello", vec![name("e")])),
                    ret(None),
                ]),
            )),
        ],
    );
    type_module(&mut m).expect("checks");
}

#[test]
fn wrong_argument_types_are_reported() {
    let mut m = module(vec![
        free(func(
            "takes_int",
            vec![arg("a", tn("i32"))],
            None,
            flow1(vec![ret(None)]),
        )),
        free(func(
            "f",
            vec![],
            None,
            flow1(vec![
                Step::Expr(call_name("takes_int", vec![str_lit("no")])),
                ret(None),
            ]),
        )),
    ]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_ARGUMENTS);
    assert!(err.message.contains("cannot be passed as"));
}

#[test]
fn return_type_mismatch_is_reported() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![ret(Some(str_lit("no")))]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_RETURN);
}

#[test]
fn void_function_rejects_return_value() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        None,
        flow1(vec![ret(Some(as_i32(1)))]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_RETURN);
    assert!(err.message.contains("'void'"));
}

#[test]
fn main_signature_is_validated() {
    let mut m = module(vec![free(func(
        "main",
        vec![
            arg("name", tref(tn("str"))),
            arg("args", tn("i32")),
        ],
        None,
        flow1(vec![ret(None)]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_MAIN);
    assert!(err.message.contains("&array[str]"));
}

#[test]
fn good_main_signature_passes() {
    use runac_ast::TypeExpr;
    let array_str = TypeExpr::Elem {
        name: "array".to_string(),
        param: Box::new(tn("str")),
    };
    let mut m = module(vec![free(func(
        "main",
        vec![
            arg("name", tref(tn("str"))),
            arg("args", tref(array_str)),
        ],
        Some(tn("i32")),
        flow1(vec![ret(Some(as_i32(0)))]),
    ))]);
    type_module(&mut m).expect("checks");
}

#[test]
fn owner_attribute_reads_as_borrow() {
    use runac_ast::{AttribDecl, ClassDecl, TypeDecl};
    let holder = TypeDecl::Class(ClassDecl {
        name: "Holder".to_string(),
        span: sp(),
        attribs: vec![AttribDecl {
            name: "value".to_string(),
            span: sp(),
            ty_expr: towner(tn("str")),
        }],
        methods: vec![],
    });
    let mut m = module_with(
        vec![("Holder".to_string(), holder)],
        vec![free(func(
            "f",
            vec![arg("h", tref(tn("Holder")))],
            None,
            flow1(vec![
                assign(name("s"), attrib(name("h"), "value")),
                ret(None),
            ]),
        ))],
    );
    let typed = type_module(&mut m).expect("checks");
    let Step::Assign { right, .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("assign step");
    };
    // Reading an owner attribute yields &str, not $str: no move on read.
    assert_eq!(typed.store.name(right.ty()), "&str");
}

#[test]
fn cross_family_comparison_is_rejected() {
    let mut m = module(vec![free(func(
        "f",
        vec![arg("a", tn("i32")), arg("b", tn("f64"))],
        None,
        flow1(vec![
            Step::Expr(compare(runac_ast::CmpOp::Lt, name("a"), name("b"))),
            ret(None),
        ]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_COMPARISON);
}

#[test]
fn narrowing_cast_is_rejected() {
    let mut m = module(vec![free(func(
        "f",
        vec![arg("a", tn("i64"))],
        None,
        flow1(vec![
            assign(name("x"), as_ty(name("a"), "i8")),
            ret(None),
        ]),
    ))]);
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::BAD_CAST);
}
