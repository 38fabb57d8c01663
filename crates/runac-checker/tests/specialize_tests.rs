//! Specializer behavior: width propagation from context, unsigned
//! negativity checks, idempotence, and leftover-sentinel errors.

mod common;

use common::*;
use runac_ast::{CmpOp, ExprKind, Step};
use runac_checker::{specialize, type_module};
use runac_common::codes;

#[test]
fn returned_literal_adopts_return_type() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![ret(Some(int(5)))]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    specialize(&mut m, &typed.store).expect("specializes");
    let Step::Return { value: Some(v), .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("return step");
    };
    assert_eq!(typed.store.name(v.ty()), "i32");
}

#[test]
fn compared_literal_adopts_other_side() {
    let mut m = module(vec![free(func(
        "f",
        vec![arg("a", tn("u64"))],
        None,
        flow1(vec![
            Step::Expr(compare(CmpOp::Lt, name("a"), int(10))),
            ret(None),
        ]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    specialize(&mut m, &typed.store).expect("specializes");
    let Step::Expr(e) = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("expr step");
    };
    let ExprKind::Compare { right, .. } = &e.kind else {
        panic!("compare");
    };
    assert_eq!(typed.store.name(right.ty()), "u64");
}

#[test]
fn call_argument_adopts_parameter_type() {
    let mut m = module(vec![
        free(func(
            "takes",
            vec![arg("a", tn("i64"))],
            None,
            flow1(vec![ret(None)]),
        )),
        free(func(
            "f",
            vec![],
            None,
            flow1(vec![
                Step::Expr(call_name("takes", vec![int(7)])),
                ret(None),
            ]),
        )),
    ]);
    let typed = type_module(&mut m).expect("checks");
    specialize(&mut m, &typed.store).expect("specializes");
    let Step::Expr(e) = &m.code[1].1.flow.blocks[&0].steps[0] else {
        panic!("expr step");
    };
    let ExprKind::Call { args, .. } = &e.kind else {
        panic!("call");
    };
    assert_eq!(typed.store.name(args[0].ty()), "i64");
}

#[test]
fn negative_literal_rejects_unsigned_context() {
    let mut m = module(vec![
        free(func(
            "takes",
            vec![arg("a", tn("u32"))],
            None,
            flow1(vec![ret(None)]),
        )),
        free(func(
            "f",
            vec![],
            None,
            flow1(vec![
                Step::Expr(call_name("takes", vec![int(-1)])),
                ret(None),
            ]),
        )),
    ]);
    let typed = type_module(&mut m).expect("checks");
    let err = specialize(&mut m, &typed.store).unwrap_err();
    assert_eq!(err.code, codes::UNRESOLVED_NUMERIC);
}

#[test]
fn contextless_literal_is_an_error() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        None,
        flow1(vec![assign(name("x"), int(2)), ret(None)]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    let err = specialize(&mut m, &typed.store).unwrap_err();
    assert_eq!(err.code, codes::UNRESOLVED_NUMERIC);
}

#[test]
fn specializer_is_idempotent() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![ret(Some(int(5)))]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    specialize(&mut m, &typed.store).expect("first run");
    let snapshot = format!("{:?}", m.code[0].1.flow);
    specialize(&mut m, &typed.store).expect("second run");
    assert_eq!(snapshot, format!("{:?}", m.code[0].1.flow));
}

#[test]
fn binary_literals_adopt_sibling_width() {
    use runac_ast::BinOp;
    let mut m = module(vec![free(func(
        "f",
        vec![arg("a", tn("i64"))],
        Some(tn("i64")),
        flow1(vec![ret(Some(binary(BinOp::Add, name("a"), int(3))))]),
    ))]);
    let typed = type_module(&mut m).expect("checks");
    specialize(&mut m, &typed.store).expect("specializes");
    let Step::Return { value: Some(v), .. } = &m.code[0].1.flow.blocks[&0].steps[0] else {
        panic!("return step");
    };
    let ExprKind::Binary { right, .. } = &v.kind else {
        panic!("binary");
    };
    assert_eq!(typed.store.name(right.ty()), "i64");
}
