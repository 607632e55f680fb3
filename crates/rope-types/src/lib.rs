//! Values, step errors and the error algebra shared by every rope crate.
//!
//! Runtime data is a [`Value`]. Every pipeline step returns a
//! [`StepResult`], whose failure side is a [`StructuredError`] with a stable
//! `code`. [`ResultExt`] layers context and code rewriting over std
//! `Result`, [`HostException`] bridges callback failures, and [`RopeError`]
//! covers build-time failures such as bad registry metadata or artifact
//! drift.
//!
//! # Example
//! ```
//! use rope_types::{ResultExt, StructuredError, ErrorKind, StepResult};
//!
//! let parsed: StepResult<i64> = "123"
//!     .parse::<i64>()
//!     .map_err(|e| StructuredError::new(ErrorKind::InvalidInput, "parse_error", e.to_string()));
//! let doubled = parsed.map(|x| x * 2).and_then(|x| Ok(format!("Value is {x}")));
//! assert_eq!(doubled.context("reading value").unwrap(), "Value is 246");
//! ```

pub mod bridge;
pub mod error;
pub mod ext;
pub mod value;

pub use bridge::{attempt, exception_to_error, Boundary, HostException, BASE_EXCEPTION, EXCEPTION};
pub use error::{codes, ErrorKind, PathItem, StepResult, StructuredError};
pub use ext::{ensure, err, ResultExt};
pub use value::{ConversionError, Value};

/// Build-time failures of the registry generator and verifier.
///
/// These never flow through a pipeline: a registry that fails to parse or an
/// artifact that has drifted means the system itself is inconsistent.
#[derive(Debug, thiserror::Error)]
pub enum RopeError {
    // === Registry Errors ===
    #[error("Registry metadata error at line {line}: {message}")]
    Metadata {
        line: usize,
        message: String,
        snippet: Option<String>,
    },

    #[error("Generated artifact {artifact} drifted from the registry at line {line}")]
    Drift {
        artifact: String,
        line: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    // === Pipeline Errors ===
    #[error("Blueprint validation failed: {0}")]
    Validation(String),

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl RopeError {
    /// Returns `true` for errors that must abort a build or CI gate.
    pub fn is_build_breaking(&self) -> bool {
        matches!(self, RopeError::Metadata { .. } | RopeError::Drift { .. })
    }
}

/// A convenience alias for `Result<T, RopeError>`.
pub type Result<T> = std::result::Result<T, RopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_metadata() {
        let err = RopeError::Metadata {
            line: 12,
            message: "duplicate internal name 'Split'".into(),
            snippet: Some("Split { delim: String },".into()),
        };
        assert_eq!(
            err.to_string(),
            "Registry metadata error at line 12: duplicate internal name 'Split'"
        );
    }

    #[test]
    fn error_display_drift() {
        let err = RopeError::Drift {
            artifact: "stubs/ops.pyi".into(),
            line: 40,
            expected: Some("def split(delim: str)".into()),
            found: None,
        };
        assert_eq!(
            err.to_string(),
            "Generated artifact stubs/ops.pyi drifted from the registry at line 40"
        );
    }

    #[test]
    fn error_display_validation() {
        let err = RopeError::Validation("empty delimiter".into());
        assert_eq!(err.to_string(), "Blueprint validation failed: empty delimiter");
    }

    #[test]
    fn error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RopeError = io.into();
        assert!(matches!(err, RopeError::Io(_)));
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn build_breaking_classification() {
        assert!(RopeError::Metadata {
            line: 1,
            message: "x".into(),
            snippet: None
        }
        .is_build_breaking());
        assert!(RopeError::Drift {
            artifact: "a".into(),
            line: 1,
            expected: None,
            found: None
        }
        .is_build_breaking());
        assert!(!RopeError::Other("x".into()).is_build_breaking());
    }
}
