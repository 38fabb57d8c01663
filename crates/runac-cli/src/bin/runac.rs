use clap::Parser;
use tracing_subscriber::EnvFilter;

use runac_cli::args::CliArgs;
use runac_cli::driver;

#[cfg(not(target_arch = "wasm32"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("RUNAC_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let code = match driver::run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("runac: {err:#}");
            1
        }
    };
    std::process::exit(code);
}
