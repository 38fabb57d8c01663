//! Diagnostics for the compiler passes.
//!
//! Every pass failure is a `Diagnostic`: a stable numeric code, a category,
//! the source span of the offending node, and a human-readable message.
//! Passes surface diagnostics to the driver instead of recovering; the
//! driver decides whether to continue with the next function.

use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// Stable error codes, grouped by error kind.
pub mod codes {
    // Name resolution
    pub const UNDEFINED_NAME: u32 = 1001;
    pub const DUPLICATE_DEFINITION: u32 = 1002;
    pub const REASSIGNMENT: u32 = 1003;
    pub const UNKNOWN_TYPE: u32 = 1004;
    pub const UNKNOWN_ATTRIBUTE: u32 = 1005;

    // Type mismatch
    pub const TYPE_MISMATCH: u32 = 2001;
    pub const NOT_CALLABLE: u32 = 2002;
    pub const BAD_COMPARISON: u32 = 2003;
    pub const BAD_RETURN: u32 = 2004;
    pub const TRAIT_UNMET: u32 = 2005;
    pub const BAD_CAST: u32 = 2006;

    // Ownership
    pub const USE_AFTER_MOVE: u32 = 3001;

    // Signature
    pub const BAD_ARGUMENTS: u32 = 4001;
    pub const BAD_MAIN: u32 = 4002;
    pub const BAD_SELF: u32 = 4003;
    pub const MISSING_ARG_TYPE: u32 = 4004;
    pub const NO_OVERLOAD: u32 = 4005;

    // Internal
    pub const UNRESOLVED_NUMERIC: u32 = 5001;
    pub const CODEGEN_INVARIANT: u32 = 5002;
}

/// A single compiler diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, code: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            category: DiagnosticCategory::Error,
            code,
            span,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.category {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        };
        write!(f, "{}[E{:04}]: {}", kind, self.code, self.message)
    }
}

impl std::error::Error for Diagnostic {}
