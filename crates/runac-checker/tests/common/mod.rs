//! Shared builders for pass tests: hand-assembled modules and CFGs in the
//! shape the front end produces.
#![allow(dead_code)]

use std::collections::BTreeMap;

use indexmap::IndexMap;
use runac_ast::{
    Arg, Block, BlockId, Callee, ClassDecl, Expr, ExprKind, FlowGraph, Function, FunctionKey,
    MethodSig, Module, Step, TraitDecl, TypeDecl, TypeExpr,
};
use runac_common::Span;

pub fn sp() -> Span {
    Span::new(0, 1)
}

pub fn ex(kind: ExprKind) -> Expr {
    Expr::new(sp(), kind)
}

pub fn int(v: i64) -> Expr {
    ex(ExprKind::Int(v))
}

pub fn str_lit(s: &str) -> Expr {
    ex(ExprKind::Str(s.to_string()))
}

pub fn name(n: &str) -> Expr {
    ex(ExprKind::Name(n.to_string()))
}

pub fn as_ty(value: Expr, target: &str) -> Expr {
    ex(ExprKind::As {
        value: Box::new(value),
        target: target.to_string(),
    })
}

pub fn as_i32(v: i64) -> Expr {
    as_ty(int(v), "i32")
}

pub fn binary(op: runac_ast::BinOp, left: Expr, right: Expr) -> Expr {
    ex(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn compare(op: runac_ast::CmpOp, left: Expr, right: Expr) -> Expr {
    ex(ExprKind::Compare {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn attrib(obj: Expr, field: &str) -> Expr {
    ex(ExprKind::Attrib {
        obj: Box::new(obj),
        attrib: field.to_string(),
    })
}

pub fn call_name(f: &str, args: Vec<Expr>) -> Expr {
    ex(ExprKind::Call {
        callee: Callee::Name(f.to_string()),
        args,
        fun: None,
        virtual_: false,
    })
}

pub fn method_call(obj: Expr, m: &str, args: Vec<Expr>) -> Expr {
    ex(ExprKind::Call {
        callee: Callee::Attrib {
            obj: Box::new(obj),
            attrib: m.to_string(),
        },
        args,
        fun: None,
        virtual_: false,
    })
}

pub fn assign(left: Expr, right: Expr) -> Step {
    Step::Assign { left, right }
}

pub fn ret(value: Option<Expr>) -> Step {
    Step::Return { span: sp(), value }
}

pub fn block(id: BlockId, steps: Vec<Step>) -> Block {
    Block {
        id,
        anno: None,
        steps,
        assigns: vec![],
        origin: vec![],
    }
}

pub fn flow1(steps: Vec<Step>) -> FlowGraph {
    flow(vec![block(0, steps)], vec![], false)
}

pub fn flow(blocks: Vec<Block>, redges: Vec<(BlockId, Vec<BlockId>)>, yields: bool) -> FlowGraph {
    FlowGraph {
        blocks: blocks.into_iter().map(|b| (b.id, b)).collect(),
        redges: redges
            .into_iter()
            .map(|(k, v)| (k, v.into_iter().collect()))
            .collect::<BTreeMap<_, _>>(),
        yields,
    }
}

pub fn tn(n: &str) -> TypeExpr {
    TypeExpr::Name(n.to_string())
}

pub fn tref(inner: TypeExpr) -> TypeExpr {
    TypeExpr::Ref(Box::new(inner))
}

pub fn towner(inner: TypeExpr) -> TypeExpr {
    TypeExpr::Owner(Box::new(inner))
}

pub fn arg(n: &str, ty: TypeExpr) -> Arg {
    Arg {
        name: n.to_string(),
        span: sp(),
        ty_expr: Some(ty),
        ty: None,
    }
}

pub fn self_arg() -> Arg {
    Arg {
        name: "self".to_string(),
        span: sp(),
        ty_expr: None,
        ty: None,
    }
}

pub fn func(name: &str, args: Vec<Arg>, rtype: Option<TypeExpr>, flow: FlowGraph) -> Function {
    Function {
        name: name.to_string(),
        span: sp(),
        args,
        rtype_expr: rtype,
        rtype: None,
        flow,
        irname: String::new(),
    }
}

pub fn free(f: Function) -> (FunctionKey, Function) {
    (FunctionKey::Free(f.name.clone()), f)
}

pub fn method(tname: &str, f: Function) -> (FunctionKey, Function) {
    (FunctionKey::Method(tname.to_string(), f.name.clone()), f)
}

pub fn msig(name: &str, args: Vec<Arg>, rtype: Option<TypeExpr>) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        span: sp(),
        args,
        rtype_expr: rtype,
    }
}

/// `class Point: x i32, y i32; __init__(self, x, y); sum(self) -> i32`
pub fn point_class() -> TypeDecl {
    TypeDecl::Class(ClassDecl {
        name: "Point".to_string(),
        span: sp(),
        attribs: vec![
            runac_ast::AttribDecl {
                name: "x".to_string(),
                span: sp(),
                ty_expr: tn("i32"),
            },
            runac_ast::AttribDecl {
                name: "y".to_string(),
                span: sp(),
                ty_expr: tn("i32"),
            },
        ],
        methods: vec![
            msig(
                "__init__",
                vec![self_arg(), arg("x", tn("i32")), arg("y", tn("i32"))],
                None,
            ),
            msig("sum", vec![self_arg()], Some(tn("i32"))),
        ],
    })
}

/// `class Buf` with an `__init__` and a `__del__`.
pub fn buf_class() -> TypeDecl {
    TypeDecl::Class(ClassDecl {
        name: "Buf".to_string(),
        span: sp(),
        attribs: vec![runac_ast::AttribDecl {
            name: "len".to_string(),
            span: sp(),
            ty_expr: tn("uword"),
        }],
        methods: vec![
            msig("__init__", vec![self_arg()], None),
            msig("__del__", vec![self_arg()], None),
        ],
    })
}

/// `trait Greeter: greet(self) -> void` plus a conforming struct `En`.
pub fn greeter_types() -> Vec<(String, TypeDecl)> {
    let greeter = TypeDecl::Trait(TraitDecl {
        name: "Greeter".to_string(),
        span: sp(),
        methods: vec![msig("greet", vec![self_arg()], None)],
    });
    let en = TypeDecl::Class(ClassDecl {
        name: "En".to_string(),
        span: sp(),
        attribs: vec![runac_ast::AttribDecl {
            name: "tag".to_string(),
            span: sp(),
            ty_expr: tn("i32"),
        }],
        methods: vec![
            msig("__init__", vec![self_arg()], None),
            msig("greet", vec![self_arg()], None),
        ],
    });
    vec![
        ("Greeter".to_string(), greeter),
        ("En".to_string(), en),
    ]
}

pub fn module_with(types: Vec<(String, TypeDecl)>, code: Vec<(FunctionKey, Function)>) -> Module {
    Module {
        name: "m".to_string(),
        source: String::new(),
        refs: IndexMap::new(),
        types: types.into_iter().collect(),
        constants: IndexMap::new(),
        code,
    }
}

pub fn module(code: Vec<(FunctionKey, Function)>) -> Module {
    module_with(vec![], code)
}
