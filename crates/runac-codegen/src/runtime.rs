//! The runtime prelude and target selection.
//!
//! The prelude is prepended verbatim to every emitted artifact. It pins
//! the concrete representations of `str`, the value boxes, and the
//! generator contexts the runtime implements, and declares the intrinsics
//! the native runtime library provides. The process entry point lives in
//! the runtime library; it builds the argument array and calls the
//! module's `main`.

pub const PRELUDE: &str = include_str!("rt.ll");

const TRIPLES: &[(&str, &str)] = &[
    ("macos", "x86_64-apple-darwin11.0.0"),
    ("linux", "x86_64-pc-linux-gnu"),
];

/// The target triple for the host platform.
pub fn target_triple() -> &'static str {
    let os = std::env::consts::OS;
    TRIPLES
        .iter()
        .find(|(k, _)| *k == os)
        .map(|(_, v)| *v)
        .unwrap_or("x86_64-pc-linux-gnu")
}
