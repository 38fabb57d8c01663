//! Driver behavior: compile a serialized module end to end, write the
//! artifact, and report diagnostics with exit codes.

mod common;

use common::*;
use runac_ast::TypeExpr;
use runac_cli::args::{CliArgs, Command};
use runac_cli::driver;

fn main_args() -> Vec<runac_ast::Arg> {
    let array_str = TypeExpr::Elem {
        name: "array".to_string(),
        param: Box::new(tn("str")),
    };
    vec![
        arg("name", tref(tn("str"))),
        arg("args", tref(array_str)),
    ]
}

#[test]
fn compile_writes_the_artifact_and_exits_zero() {
    let mut m = module(vec![free(func(
        "main",
        main_args(),
        Some(tn("i32")),
        flow1(vec![ret(Some(as_i32(0)))]),
    ))]);
    m.refs
        .insert("print".to_string(), "__internal__.__print__".to_string());

    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("m.json");
    let out = dir.path().join("m.ll");
    std::fs::write(&src, serde_json::to_string(&m).expect("serialize")).expect("write module");

    let code = driver::run(CliArgs {
        command: Command::Compile {
            source: src,
            output: Some(out.clone()),
        },
    })
    .expect("driver runs");
    assert_eq!(code, 0);

    let artifact = std::fs::read_to_string(out).expect("artifact written");
    assert!(artifact.starts_with("target triple = \""));
    assert!(artifact.contains("define i32 @main"));
}

#[test]
fn diagnostics_exit_nonzero() {
    let mut m = module(vec![free(func(
        "f",
        vec![],
        Some(tn("i32")),
        flow1(vec![ret(Some(name("nope")))]),
    ))]);
    m.source = "def f() -> i32:\n    return nope\n".to_string();

    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("bad.json");
    std::fs::write(&src, serde_json::to_string(&m).expect("serialize")).expect("write module");

    let code = driver::run(CliArgs {
        command: Command::Compile {
            source: src,
            output: Some(dir.path().join("bad.ll")),
        },
    })
    .expect("driver runs");
    assert_eq!(code, 1);
}

#[test]
fn pipeline_is_usable_as_a_library() {
    let mut m = module(vec![free(func(
        "main",
        main_args(),
        None,
        flow1(vec![ret(None)]),
    ))]);
    let llir = driver::pipeline(&mut m).expect("pipeline");
    assert!(llir.contains("define void @main"));
}
