//! Error-rewriting combinators on top of `std::result::Result`.
//!
//! The sum types themselves are the standard `Result` and `Option`; `map`,
//! `and_then`, `unwrap_or` and friends come from std unchanged. This module
//! adds the operations that need to know about [`StructuredError`]: wrapping
//! with context, renaming codes, and turning a raised [`HostException`] into a
//! failure value.

use crate::bridge::{exception_to_error, HostException};
use crate::error::{codes, ErrorKind, StepResult, StructuredError};

pub trait ResultExt<T>: Sized {
    /// Wrap a failure in a `"context"` error carrying the original as `cause`.
    fn context(self, message: impl Into<String>) -> StepResult<T> {
        self.context_with(codes::CONTEXT, message)
    }

    /// Like [`context`](ResultExt::context) with a caller-chosen code.
    fn context_with(self, code: impl Into<String>, message: impl Into<String>) -> StepResult<T>;

    /// Replace the code of a failure, leaving everything else intact.
    fn with_code(self, code: impl Into<String>) -> StepResult<T>;

    /// Namespace a failure code as `prefix.code`; already-prefixed codes are kept.
    fn map_err_code(self, prefix: &str) -> StepResult<T>;

    /// Terminal extraction that hands back exactly `exc` on failure.
    fn unwrap_or_raise<X>(self, exc: X) -> Result<T, X>;

    /// `map` with a callback that may raise. A raised exception becomes a
    /// failure with `code`/`message`, the bridged exception as its cause.
    fn map_try<U, F>(self, f: F, code: &str, message: &str) -> StepResult<U>
    where
        F: FnOnce(T) -> Result<U, HostException>;

    /// `and_then` with a callback that may raise.
    fn and_then_try<U, F>(self, f: F, code: &str, message: &str) -> StepResult<U>
    where
        F: FnOnce(T) -> Result<StepResult<U>, HostException>;
}

impl<T> ResultExt<T> for StepResult<T> {
    fn context_with(self, code: impl Into<String>, message: impl Into<String>) -> StepResult<T> {
        self.map_err(|prev| {
            let mut next = StructuredError::new(prev.kind, code, message);
            next.metadata = prev.metadata.clone();
            next.op = prev.op.clone();
            next.with_cause(prev)
        })
    }

    fn with_code(self, code: impl Into<String>) -> StepResult<T> {
        self.map_err(|mut e| {
            e.code = code.into();
            e
        })
    }

    fn map_err_code(self, prefix: &str) -> StepResult<T> {
        self.map_err(|mut e| {
            let dotted = format!("{prefix}.");
            if !e.code.starts_with(&dotted) {
                e.code = format!("{dotted}{}", e.code);
            }
            e
        })
    }

    fn unwrap_or_raise<X>(self, exc: X) -> Result<T, X> {
        self.map_err(|_| exc)
    }

    fn map_try<U, F>(self, f: F, code: &str, message: &str) -> StepResult<U>
    where
        F: FnOnce(T) -> Result<U, HostException>,
    {
        let value = self?;
        f(value).map_err(|exc| raised(exc, code, message))
    }

    fn and_then_try<U, F>(self, f: F, code: &str, message: &str) -> StepResult<U>
    where
        F: FnOnce(T) -> Result<StepResult<U>, HostException>,
    {
        let value = self?;
        f(value).map_err(|exc| raised(exc, code, message))?
    }
}

fn raised(exc: HostException, code: &str, message: &str) -> StructuredError {
    StructuredError::new(ErrorKind::Internal, code, message)
        .with_meta("cause_exception", exc.kind())
        .with_meta("cause_py_traceback", exc.traceback())
        .with_cause(exception_to_error(&exc))
}

/// Shorthand for an `InvalidInput` failure.
pub fn err<T>(code: impl Into<String>, message: impl Into<String>) -> StepResult<T> {
    Err(StructuredError::new(ErrorKind::InvalidInput, code, message))
}

/// Fail with `code` unless `condition` holds.
pub fn ensure(condition: bool, code: impl Into<String>, message: impl Into<String>) -> StepResult<()> {
    if condition {
        Ok(())
    } else {
        err(code, message)
    }
}
