use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the runac binary.
#[derive(Parser, Debug)]
#[command(name = "runac", version, about = "Compiler middle end for the Runa language")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a front-end module into an LLIR artifact.
    Compile {
        /// Serialized module produced by the front end.
        source: PathBuf,
        /// Output path; standard output when omitted.
        output: Option<PathBuf>,
    },
}
