//! Escape analysis: returned owners escape, locals stay on the stack,
//! stores into escaping objects and owner arguments propagate.

mod common;

use common::*;
use runac_ast::{ExprKind, Step};
use runac_checker::{escape, type_module};

fn init_escapes(step: &Step) -> bool {
    let e = match step {
        Step::Assign { right, .. } => right,
        Step::Return { value: Some(v), .. } => v,
        Step::Expr(e) => e,
        _ => panic!("unexpected step shape"),
    };
    match &e.kind {
        ExprKind::Call { args, .. } => args[0].escapes,
        _ => panic!("expected a rewritten constructor call"),
    }
}

#[test]
fn returned_constructor_escapes() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![free(func(
            "make",
            vec![],
            Some(towner(tn("Buf"))),
            flow1(vec![ret(Some(call_name("Buf", vec![])))]),
        ))],
    );
    let typed = type_module(&mut m).expect("checks");
    escape::analyze(&mut m, &typed.store).expect("analyzes");
    assert!(init_escapes(&m.code[0].1.flow.blocks[&0].steps[0]));
}

#[test]
fn returned_binding_escapes_through_the_name() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![free(func(
            "make",
            vec![],
            Some(towner(tn("Buf"))),
            flow1(vec![
                assign(name("b"), call_name("Buf", vec![])),
                ret(Some(name("b"))),
            ]),
        ))],
    );
    let typed = type_module(&mut m).expect("checks");
    escape::analyze(&mut m, &typed.store).expect("analyzes");
    // Backward pass: the return tracks `b`, the assignment marks its
    // constructor.
    assert!(init_escapes(&m.code[0].1.flow.blocks[&0].steps[0]));
}

#[test]
fn local_allocation_stays_on_the_stack() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![free(func(
            "f",
            vec![],
            None,
            flow1(vec![
                assign(name("b"), call_name("Buf", vec![])),
                ret(None),
            ]),
        ))],
    );
    let typed = type_module(&mut m).expect("checks");
    escape::analyze(&mut m, &typed.store).expect("analyzes");
    assert!(!init_escapes(&m.code[0].1.flow.blocks[&0].steps[0]));
}

#[test]
fn owner_argument_escapes_into_the_callee() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![
            free(func(
                "consume",
                vec![arg("b", towner(tn("Buf")))],
                None,
                flow1(vec![ret(None)]),
            )),
            free(func(
                "f",
                vec![],
                None,
                flow1(vec![
                    assign(name("b"), call_name("Buf", vec![])),
                    Step::Expr(call_name("consume", vec![name("b")])),
                    ret(None),
                ]),
            )),
        ],
    );
    let typed = type_module(&mut m).expect("checks");
    escape::analyze(&mut m, &typed.store).expect("analyzes");
    assert!(init_escapes(&m.code[1].1.flow.blocks[&0].steps[0]));
}
