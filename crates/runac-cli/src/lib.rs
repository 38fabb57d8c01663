//! CLI driver for the runac compiler.
//!
//! `runac compile <module.json> [output.ll]` reads a serialized module
//! (the front end's output), runs the middle-end pipeline, and writes the
//! LLIR artifact to the output file or standard output. Failures print a
//! one-line diagnostic with source line/column and exit non-zero.

pub mod args;
pub mod driver;
