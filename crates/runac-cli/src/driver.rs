//! The compile driver: load, check, specialize, analyze, emit.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use crate::args::{CliArgs, Command};
use runac_ast::Module;
use runac_checker::{escape, specialize, type_module};
use runac_common::{Diagnostic, LineMap};

pub fn run(args: CliArgs) -> Result<i32> {
    match args.command {
        Command::Compile { source, output } => compile(&source, output.as_deref()),
    }
}

/// The middle-end pipeline on one module. Each pass halts compilation at
/// its first error.
pub fn pipeline(module: &mut Module) -> Result<String, Diagnostic> {
    let mut typed = type_module(module)?;
    specialize(module, &typed.store)?;
    escape::analyze(module, &typed.store)?;
    runac_codegen::generate(module, &mut typed)
}

fn compile(source: &Path, output: Option<&Path>) -> Result<i32> {
    let started = Instant::now();
    let text = fs::read_to_string(source)
        .with_context(|| format!("cannot read '{}'", source.display()))?;
    let mut module: Module = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a front-end module", source.display()))?;

    match pipeline(&mut module) {
        Ok(llir) => {
            match output {
                Some(path) => fs::write(path, llir)
                    .with_context(|| format!("cannot write '{}'", path.display()))?,
                None => std::io::stdout().write_all(llir.as_bytes())?,
            }
            debug!(elapsed = ?started.elapsed(), "compiled {}", source.display());
            Ok(0)
        }
        Err(diag) => {
            report(source, &module.source, &diag);
            Ok(1)
        }
    }
}

/// One line on stderr: `file:line:col: error[Ennnn]: message`.
fn report(source: &Path, module_source: &str, diag: &Diagnostic) {
    let mut err = std::io::stderr().lock();
    if diag.span.is_dummy() || module_source.is_empty() {
        let _ = writeln!(err, "{}: {diag}", source.display());
    } else {
        let loc = LineMap::new(module_source).location(diag.span.start);
        let _ = writeln!(err, "{}:{loc}: {diag}", source.display());
    }
}
