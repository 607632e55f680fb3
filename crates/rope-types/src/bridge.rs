//! Exception bridge between host callbacks and structured errors.
//!
//! Host callbacks signal failure by returning a [`HostException`]. The bridge
//! turns a recognized exception into a `py_exception` [`StructuredError`] and
//! lets everything else propagate untouched, so unrelated bugs are never
//! swallowed.

use std::backtrace::Backtrace;
use std::fmt;

use crate::error::{codes, ErrorKind, StepResult, StructuredError};

/// Root of the ordinary exception hierarchy. An empty category list catches
/// exactly these.
pub const EXCEPTION: &str = "Exception";
/// Root of every exception, including interrupts and exit requests.
pub const BASE_EXCEPTION: &str = "BaseException";

/// An exception raised by host code.
///
/// `kind` is the exception category (e.g. `"ValueError"`); `lineage` lists
/// the categories it inherits from, so catching a base category also catches
/// its descendants. An exception with no declared base descends from
/// [`EXCEPTION`]; one that declares its bases (e.g. `KeyboardInterrupt` with
/// base [`BASE_EXCEPTION`]) descends only from those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostException {
    kind: String,
    lineage: Vec<String>,
    message: String,
    traceback: String,
}

impl HostException {
    /// Raise a new exception, capturing the current stack as its traceback.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            lineage: Vec::new(),
            message: message.into(),
            traceback: Backtrace::force_capture().to_string(),
        }
    }

    /// Declare an ancestor category.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.lineage.push(base.into());
        self
    }

    /// Replace the captured trace with one supplied by the host.
    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = traceback.into();
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn traceback(&self) -> &str {
        &self.traceback
    }

    /// `true` if this exception is `category` or descends from it.
    pub fn is_instance(&self, category: &str) -> bool {
        self.kind == category
            || category == BASE_EXCEPTION
            || self.lineage.iter().any(|base| base == category)
            || (self.lineage.is_empty() && category == EXCEPTION)
    }
}

impl fmt::Display for HostException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HostException {}

/// Normalize a host exception into the `py_exception` error.
pub fn exception_to_error(exc: &HostException) -> StructuredError {
    StructuredError::new(ErrorKind::Internal, codes::PY_EXCEPTION, exc.to_string())
        .with_meta("exception", exc.kind())
        .with_meta("py_traceback", exc.traceback())
}

impl From<HostException> for StructuredError {
    fn from(exc: HostException) -> Self {
        exception_to_error(&exc)
    }
}

/// Run `f`, catching exceptions of the given categories.
///
/// An empty category list catches every [`EXCEPTION`]; interrupt-class
/// exceptions still propagate. The outer `Err` carries an exception outside
/// the recognized set, unchanged.
pub fn attempt<T, F>(f: F, categories: &[&str]) -> Result<StepResult<T>, HostException>
where
    F: FnOnce() -> Result<T, HostException>,
{
    Boundary::new(categories).call(f)
}

/// A reusable catch boundary for a fixed set of exception categories.
#[derive(Debug, Clone, Default)]
pub struct Boundary {
    categories: Vec<String>,
}

impl Boundary {
    pub fn new(categories: &[&str]) -> Self {
        Self {
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn recognizes(&self, exc: &HostException) -> bool {
        if self.categories.is_empty() {
            return exc.is_instance(EXCEPTION);
        }
        self.categories.iter().any(|c| exc.is_instance(c))
    }

    pub fn call<T, F>(&self, f: F) -> Result<StepResult<T>, HostException>
    where
        F: FnOnce() -> Result<T, HostException>,
    {
        match f() {
            Ok(value) => Ok(Ok(value)),
            Err(exc) if self.recognizes(&exc) => {
                tracing::debug!(exception = %exc.kind(), "Caught host exception at boundary");
                Ok(Err(exception_to_error(&exc)))
            }
            Err(exc) => Err(exc),
        }
    }

    /// Wrap a raising function so that recognized exceptions come back as
    /// `Err(StructuredError)`.
    pub fn wrap<A, T, F>(self, f: F) -> impl Fn(A) -> Result<StepResult<T>, HostException>
    where
        F: Fn(A) -> Result<T, HostException>,
    {
        move |arg| self.call(|| f(arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn parse(text: &str) -> Result<i64, HostException> {
        text.parse::<i64>()
            .map_err(|e| HostException::new("ValueError", e.to_string()).with_base("Exception"))
    }

    #[test]
    fn exception_to_error_preserves_trace() {
        let exc = HostException::new("KeyError", "'missing'").with_traceback("line 1\nline 2");
        let err = exception_to_error(&exc);
        assert_eq!(err.code, "py_exception");
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.message, "KeyError: 'missing'");
        assert_eq!(err.meta("py_traceback"), Some(&Value::from("line 1\nline 2")));
        assert_eq!(err.meta("exception"), Some(&Value::from("KeyError")));
    }

    #[test]
    fn captured_traceback_is_not_empty() {
        let exc = HostException::new("RuntimeError", "boom");
        assert!(!exc.traceback().is_empty());
    }

    #[test]
    fn attempt_wraps_success() {
        let out = attempt(|| parse("42"), &["ValueError"]).unwrap();
        assert_eq!(out, Ok(42));
    }

    #[test]
    fn attempt_catches_recognized_category() {
        let out = attempt(|| parse("nope"), &["ValueError"]).unwrap();
        assert_eq!(out.unwrap_err().code, "py_exception");
    }

    #[test]
    fn attempt_catches_by_base_category() {
        let out = attempt(|| parse("nope"), &["Exception"]).unwrap();
        assert!(out.is_err());
    }

    #[test]
    fn attempt_with_no_categories_catches_exceptions() {
        let out = attempt(|| parse("nope"), &[]).unwrap();
        assert!(out.is_err());
        let bare = attempt(|| Err::<(), _>(HostException::new("RuntimeError", "boom")), &[]);
        assert_eq!(bare.unwrap().unwrap_err().code, "py_exception");
    }

    #[test]
    fn attempt_with_no_categories_lets_interrupts_escape() {
        let interrupt = || {
            let exc = HostException::new("KeyboardInterrupt", "ctrl-c").with_base(BASE_EXCEPTION);
            Err::<(), _>(exc)
        };
        let raised = attempt(interrupt, &[]).unwrap_err();
        assert_eq!(raised.kind(), "KeyboardInterrupt");

        let caught = attempt(interrupt, &[BASE_EXCEPTION]).unwrap();
        assert_eq!(caught.unwrap_err().code, "py_exception");
    }

    #[test]
    fn declared_lineage_replaces_default_base() {
        let exit = HostException::new("SystemExit", "bye").with_base(BASE_EXCEPTION);
        assert!(!exit.is_instance(EXCEPTION));
        assert!(exit.is_instance("SystemExit"));
        let plain = HostException::new("ValueError", "bad");
        assert!(plain.is_instance(EXCEPTION));
        assert!(plain.is_instance(BASE_EXCEPTION));
    }

    #[test]
    fn attempt_lets_unrecognized_exceptions_escape() {
        let raised = attempt(|| parse("nope"), &["KeyError"]).unwrap_err();
        assert_eq!(raised.kind(), "ValueError");
    }

    #[test]
    fn boundary_wrap_builds_reusable_callable() {
        let safe = Boundary::new(&["ValueError"]).wrap(|s: &str| parse(s));
        assert_eq!(safe("7").unwrap(), Ok(7));
        assert_eq!(safe("x").unwrap().unwrap_err().code, "py_exception");
    }
}
