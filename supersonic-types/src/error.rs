//! The failure-or-value discipline threaded across binding and evaluation.
//!
//! Rust's `Result<T, E>` already moves its success value out exactly once,
//! so `FailureOr<T>` is a plain alias rather than a bespoke sum type: there
//! is no separate "owned" variant beyond `FailureOr<T>` itself (see
//! DESIGN.md).

use std::backtrace::Backtrace;
use std::fmt;

/// Stable error codes surfaced across the bind/evaluate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A `NamedAttribute` (or named lookup) did not resolve in the source schema.
    AttributeMissing,
    /// A result schema would contain two attributes with the same name.
    AttributeExists,
    /// A positional reference or alias list had the wrong length.
    AttributeCountMismatch,
    /// Expression operand types are incompatible.
    TypeMismatch,
    /// An allocator refused to grow a buffer past its ceiling.
    MemoryExceeded,
    /// A runtime evaluation error under an explicit strict policy.
    EvaluationError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::AttributeMissing => "ATTRIBUTE_MISSING",
            ErrorCode::AttributeExists => "ATTRIBUTE_EXISTS",
            ErrorCode::AttributeCountMismatch => "ATTRIBUTE_COUNT_MISMATCH",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::MemoryExceeded => "MEMORY_EXCEEDED",
            ErrorCode::EvaluationError => "EVALUATION_ERROR",
        };
        f.write_str(s)
    }
}

/// A failure carrying a code, a human-readable message and a stack trace
/// captured at the throw site.
#[derive(thiserror::Error)]
#[error("{code}: {message}")]
pub struct Exception {
    pub code: ErrorCode,
    pub message: String,
    pub backtrace: Backtrace,
}

impl Exception {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    pub fn attribute_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttributeMissing, message)
    }

    pub fn attribute_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttributeExists, message)
    }

    pub fn attribute_count_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AttributeCountMismatch, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TypeMismatch, message)
    }

    pub fn memory_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MemoryExceeded, message)
    }

    pub fn evaluation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EvaluationError, message)
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}

/// Every binding operation, and every fallible evaluation step, returns this.
pub type FailureOr<T> = Result<T, Exception>;

/// `SucceedOrDie(expr)`: used only where the caller knows the
/// operation cannot fail (tests, and internal invariants already checked).
pub trait ResultExt<T> {
    fn succeed_or_die(self) -> T;
}

impl<T> ResultExt<T> for FailureOr<T> {
    fn succeed_or_die(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("SucceedOrDie on a failure: {e}"),
        }
    }
}
