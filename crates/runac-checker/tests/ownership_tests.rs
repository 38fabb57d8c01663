//! Ownership transfer: moves consume bindings, use-after-move is an
//! undefined name, borrows leave bindings alive.

mod common;

use common::*;
use runac_checker::type_module;
use runac_common::codes;
use runac_ast::Step;

fn consume_fn() -> (runac_ast::FunctionKey, runac_ast::Function) {
    free(func(
        "consume",
        vec![arg("b", towner(tn("Buf")))],
        None,
        flow1(vec![ret(None)]),
    ))
}

fn borrow_fn() -> (runac_ast::FunctionKey, runac_ast::Function) {
    free(func(
        "peek",
        vec![arg("b", tref(tn("Buf")))],
        None,
        flow1(vec![ret(None)]),
    ))
}

#[test]
fn passing_owner_consumes_the_name() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![
            consume_fn(),
            free(func(
                "f",
                vec![],
                None,
                flow1(vec![
                    assign(name("b"), call_name("Buf", vec![])),
                    Step::Expr(call_name("consume", vec![name("b")])),
                    Step::Expr(call_name("consume", vec![name("b")])),
                    ret(None),
                ]),
            )),
        ],
    );
    let err = type_module(&mut m).unwrap_err();
    assert_eq!(err.code, codes::UNDEFINED_NAME);
    assert!(err.message.contains("undefined name 'b'"));
}

#[test]
fn borrowing_does_not_consume() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![
            borrow_fn(),
            free(func(
                "f",
                vec![],
                None,
                flow1(vec![
                    assign(name("b"), call_name("Buf", vec![])),
                    Step::Expr(call_name("peek", vec![name("b")])),
                    Step::Expr(call_name("peek", vec![name("b")])),
                    ret(None),
                ]),
            )),
        ],
    );
    type_module(&mut m).expect("borrowed twice");
}

#[test]
fn returning_owner_consumes_the_name() {
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
    type_module(&mut m).expect("checks");
}

#[test]
fn owner_flows_into_ref_parameter() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![
            borrow_fn(),
            free(func(
                "f",
                vec![arg("b", towner(tn("Buf")))],
                None,
                flow1(vec![
                    Step::Expr(call_name("peek", vec![name("b")])),
                    ret(None),
                ]),
            )),
        ],
    );
    type_module(&mut m).expect("owner passed where ref expected");
}

#[test]
fn moved_name_can_be_rebound() {
    let mut m = module_with(
        vec![("Buf".to_string(), buf_class())],
        vec![
            consume_fn(),
            free(func(
                "f",
                vec![],
                None,
                flow1(vec![
                    assign(name("b"), call_name("Buf", vec![])),
                    Step::Expr(call_name("consume", vec![name("b")])),
                    assign(name("b"), call_name("Buf", vec![])),
                    Step::Expr(call_name("consume", vec![name("b")])),
                    ret(None),
                ]),
            )),
        ],
    );
    type_module(&mut m).expect("rebinding after move");
}
