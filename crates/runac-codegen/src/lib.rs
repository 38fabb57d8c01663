//! Textual LLIR emission for the runac compiler.
//!
//! Consumes a module annotated by the checker, specializer and escape
//! analyzer and emits one LLIR artifact: the target triple, the runtime
//! prelude verbatim, extern declarations, struct/trait/vtable type
//! declarations with size globals, constant globals, and one `define` per
//! function with labeled blocks.

mod writer;
pub use writer::Writer;

mod value;
pub use value::{Frame, Value};

mod codegen;
mod exprs;
pub use codegen::CodeGen;

pub mod runtime;

use runac_ast::Module;
use runac_checker::TypedModule;
use runac_common::Diagnostic;

/// Emit the complete LLIR artifact for a checked module.
pub fn generate(module: &Module, typed: &mut TypedModule) -> Result<String, Diagnostic> {
    let body = CodeGen::new(typed).emit_module(module)?;
    let mut out = String::new();
    out.push_str(&format!(
        "target triple = \"{}\"\n\n",
        runtime::target_triple()
    ));
    out.push_str(runtime::PRELUDE);
    out.push('\n');
    out.push_str(&body);
    Ok(out)
}
