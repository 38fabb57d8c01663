//! Common types and utilities for the runac compiler.
//!
//! This crate provides foundational types used across all runac crates:
//! - Source spans (`Span`, `Spanned`)
//! - Line/column mapping for diagnostics (`LineMap`, `Location`)
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, error codes)
//! - Shared identifiers (`TypeId`) to break circular dependencies

// Shared identifiers - break circular dependencies between ast and types
pub mod common;
pub use common::TypeId;

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{Span, Spanned};

// Position - line/column source locations
pub mod position;
pub use position::{LineMap, Location};

// Diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, codes};
