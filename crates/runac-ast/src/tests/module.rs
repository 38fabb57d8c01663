use super::*;
use crate::expr::ExprKind;
use crate::flow::{Block, Step};
use std::collections::BTreeMap;

fn int_lit(v: i64) -> Expr {
    Expr::new(Span::new(0, 1), ExprKind::Int(v))
}

#[test]
fn module_round_trips_through_json() {
    let mut blocks = BTreeMap::new();
    blocks.insert(
        0,
        Block {
            id: 0,
            anno: None,
            steps: vec![Step::Return {
                span: Span::new(0, 6),
                value: Some(int_lit(5)),
            }],
            assigns: vec![],
            origin: vec![],
        },
    );
    let module = Module {
        name: "m".into(),
        source: String::new(),
        refs: IndexMap::new(),
        types: IndexMap::new(),
        constants: IndexMap::new(),
        code: vec![(
            FunctionKey::Free("f".into()),
            Function {
                name: "f".into(),
                span: Span::new(0, 10),
                args: vec![],
                rtype_expr: Some(TypeExpr::Name("i32".into())),
                rtype: None,
                flow: FlowGraph {
                    blocks,
                    redges: BTreeMap::new(),
                    yields: false,
                },
                irname: String::new(),
            },
        )],
    };

    let json = serde_json::to_string(&module).expect("serialize");
    let back: Module = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.code.len(), 1);
    assert_eq!(back.code[0].1.name, "f");
    assert!(back.code[0].1.rtype.is_none());
}

#[test]
fn annotations_default_when_absent() {
    let json = r#"{"span":{"start":0,"end":1},"kind":{"Int":3}}"#;
    let expr: Expr = serde_json::from_str(json).expect("deserialize expr");
    assert!(expr.ty.is_none());
    assert!(!expr.escapes);
}
